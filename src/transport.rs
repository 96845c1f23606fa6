//! Network seam between the broker and the provider APIs

use async_trait::async_trait;
use log::{debug, error, trace};

use crate::request::{ProviderRequest, ProviderResponse};

/// Delivers one provider request and returns the raw answer.
///
/// Implementations report connection-level failures as
/// `Error::ProviderUnavailable`; status codes are returned untouched.
#[async_trait]
pub trait Transport: Send + Sync
{   async fn send(&self, request: ProviderRequest)
      -> Result<ProviderResponse, crate::error::Error>;
}

/// reqwest-backed transport with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
}

impl HttpTransport
{   pub fn new() -> Result<Self, crate::error::Error>
    {   let http_client = reqwest::Client::builder()
          .user_agent(concat!("airoute/", env!("CARGO_PKG_VERSION")))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HttpTransport { http_client })
    }

    /// Transport over a caller-built client, e.g. one with proxy settings.
    pub fn with_client(http_client: reqwest::Client) -> Self
    {   HttpTransport { http_client }
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn send(&self, request: ProviderRequest)
      -> Result<ProviderResponse, crate::error::Error>
    {   let provider = request.provider;
        debug!("POST {} ({})", request.url, provider);
        trace!("{} request body: {}", provider, request.body);

        let response = self.http_client
          .post(&request.url)
          .header("Authorization", format!("Bearer {}", request.api_key))
          .header("Content-Type", "application/json")
          .header("Accept", "application/json")
          .timeout(request.timeout)
          .json(&request.body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error from {}: {}", provider, e);
            let reason = if e.is_timeout()
            {   format!(
                  "request timed out after {}s",
                  request.timeout.as_secs()
                )
            } else
            {   e.to_string()
            };
            crate::error::Error::unavailable(provider, reason)
          })?;

        let status = response.status().as_u16();
        trace!("{} response status: {}", provider, status);

        let body = response.text().await.map_err(|e| {
          error!("Failed to read {} response body: {}", provider, e);
          crate::error::Error::unavailable(provider, e.to_string())
        })?;

        Ok(ProviderResponse { status, body })
    }
}
