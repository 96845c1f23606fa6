//! Request broker: provider selection, dispatch and fallback
//!
//! The broker owns nothing but its configuration and a transport, so a
//! clone can be handed to every task that needs one. Each call walks
//! select → call → (one substitute call) → normalize, and ends in either
//! a `BrokerResult` or a typed error.

use std::sync::Arc;
use log::{debug, info, trace, warn};
use tokio_util::sync::CancellationToken;

use crate::classify::classify;
use crate::config::{BrokerConfig, RequestConfig};
use crate::failover::{substitute, translate_config};
use crate::request::BrokerResult;
use crate::transport::{HttpTransport, Transport};
use crate::{EntryPoint, Provider, ProviderChoice};

#[derive(Clone)]
pub struct Broker
{   config: Arc<BrokerConfig>
  , transport: Arc<dyn Transport>
}

impl std::fmt::Debug for Broker
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("Broker")
          .field("failover", &self.config.failover.enabled)
          .finish_non_exhaustive()
    }
}

impl Broker
{   pub fn new(
      config: BrokerConfig
    , transport: Arc<dyn Transport>
    ) -> Self
    {   debug!(
          "Creating Broker (failover {})",
          if config.failover.enabled { "on" } else { "off" }
        );
        Broker
        {   config: Arc::new(config)
          , transport
        }
    }

    /// Broker over the real HTTP APIs.
    pub fn with_http(config: BrokerConfig)
      -> Result<Self, crate::error::Error>
    {   Ok(Broker::new(config, Arc::new(HttpTransport::new()?)))
    }

    /// HTTP broker configured from the process environment.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Broker::with_http(BrokerConfig::from_env())
    }

    pub fn config(&self) -> &BrokerConfig
    {   &self.config
    }

    // ===== Entry points =====

    /// Auto-detect the provider and fall back once on failure.
    pub async fn route(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    ) -> Result<BrokerResult, crate::error::Error>
    {   self.route_with_cancel(prompt, config, &CancellationToken::new())
          .await
    }

    pub async fn route_with_cancel(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   let config = config.cloned().unwrap_or_default();
        validate(prompt, &config)?;

        let primary = select_provider(prompt, &config);
        info!("Routing prompt to {}", primary);

        let first_error = match self
          .call(primary, prompt, &config, cancel)
          .await
        {   Ok(result) => return Ok(result)
          , Err(e) => e
        };

        if !first_error.is_substitutable()
        {   debug!("{} failure is not substitutable", primary);
            return Err(first_error);
        }
        let fallback = match substitute(
          primary,
          self.config.failover.enabled
        )
        {   Some(provider) => provider
          , None => return Err(first_error)
        };
        if cancel.is_cancelled()
        {   return Err(crate::error::Error::Cancelled);
        }

        warn!(
          "{} failed ({}), falling back to {}",
          primary, first_error, fallback
        );
        let translated = translate_config(&config, fallback);

        match self.call(fallback, prompt, &translated, cancel).await
        {   Ok(result) => {
              info!("Fallback to {} succeeded", fallback);
              Ok(result)
            }
          , Err(crate::error::Error::Cancelled) => {
              Err(crate::error::Error::Cancelled)
            }
          , Err(second_error) => {
              warn!("Fallback to {} failed: {}", fallback, second_error);
              Err(crate::error::Error::BothProvidersFailed
              {   primary: Box::new(first_error)
                , fallback: Box::new(second_error)
              })
            }
        }
    }

    /// Codestral only, chat or FIM per `config.endpoint`; no fallback.
    pub async fn call_codestral(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    ) -> Result<BrokerResult, crate::error::Error>
    {   self.call_codestral_with_cancel(
          prompt,
          config,
          &CancellationToken::new()
        ).await
    }

    pub async fn call_codestral_with_cancel(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   self.call_explicit(Provider::Codestral, prompt, config, cancel)
          .await
    }

    /// Mistral only, always chat framing; no fallback.
    pub async fn call_mistral(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    ) -> Result<BrokerResult, crate::error::Error>
    {   self.call_mistral_with_cancel(
          prompt,
          config,
          &CancellationToken::new()
        ).await
    }

    pub async fn call_mistral_with_cancel(
      &self
    , prompt: &str
    , config: Option<&RequestConfig>
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   self.call_explicit(Provider::Mistral, prompt, config, cancel)
          .await
    }

    /// Run `prompt` through the given entry point.
    pub async fn run(
      &self
    , entry: EntryPoint
    , prompt: &str
    , config: Option<&RequestConfig>
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   match entry
        {   EntryPoint::Route =>
              self.route_with_cancel(prompt, config, cancel).await
          , EntryPoint::Codestral =>
              self.call_codestral_with_cancel(prompt, config, cancel).await
          , EntryPoint::Mistral =>
              self.call_mistral_with_cancel(prompt, config, cancel).await
        }
    }

    // ===== Internals =====

    async fn call_explicit(
      &self
    , provider: Provider
    , prompt: &str
    , config: Option<&RequestConfig>
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   let config = config.cloned().unwrap_or_default();
        validate(prompt, &config)?;
        info!("Explicit {} call", provider);
        self.call(provider, prompt, &config, cancel).await
    }

    /// One outbound call, bounded by its timeout and the cancel token.
    async fn call(
      &self
    , provider: Provider
    , prompt: &str
    , config: &RequestConfig
    , cancel: &CancellationToken
    ) -> Result<BrokerResult, crate::error::Error>
    {   let settings = self.config.provider(provider);
        let request = provider.build_request(settings, prompt, config)?;
        let model = request.body
          .get("model")
          .and_then(serde_json::Value::as_str)
          .unwrap_or_default()
          .to_string();
        let timeout = request.timeout;
        trace!("{} prompt: {}", provider, prompt);

        let response = tokio::select!
        {   biased;
            _ = cancel.cancelled() => {
              info!("{} call cancelled", provider);
              return Err(crate::error::Error::Cancelled);
            }
            outcome = tokio::time::timeout(
              timeout,
              self.transport.send(request)
            ) => match outcome
            {   Ok(response) => response?
              , Err(_) => {
                  return Err(crate::error::Error::unavailable(
                    provider,
                    format!(
                      "request timed out after {}s",
                      timeout.as_secs()
                    )
                  ));
                }
            }
        };

        provider.parse_response(response, &model)
    }
}

/// Provider `route` starts with: explicit provider, then a recognised
/// model family, then the prompt's intent.
pub fn select_provider(prompt: &str, config: &RequestConfig) -> Provider
{   if let Some(provider) = config.provider
      .and_then(ProviderChoice::pinned)
    {   return provider;
    }
    if let Some(provider) = config.model
      .as_deref()
      .and_then(Provider::for_model)
    {   return provider;
    }
    classify(prompt).provider()
}

fn validate(
  prompt: &str
, config: &RequestConfig
) -> Result<(), crate::error::Error>
{   if prompt.trim().is_empty()
    {   return Err(crate::error::Error::InvalidInput(
          "prompt must not be empty".to_string()
        ));
    }
    config.validate()
}
