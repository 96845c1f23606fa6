use serde::{Deserialize, Serialize};
use log::trace;

use super::mistral::{ChatMessage, ChatRequest};
use crate::config::{ProviderConfig, RequestConfig};
use crate::request::ProviderRequest;

/// Fill-in-the-middle request: raw code plus an optional suffix, no
/// conversational framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimRequest
{   pub model: String
  , pub prompt: String
  , pub suffix: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

pub(crate) fn build_request(
  settings: &ProviderConfig
, prompt: &str
, config: &RequestConfig
) -> Result<ProviderRequest, crate::error::Error>
{   let provider = crate::Provider::Codestral;
    let resolved = super::resolve(provider, settings, config)?;

    match config.endpoint()
    {   crate::Endpoint::Chat => {
          let request = ChatRequest
          {   model: resolved.model.clone()
            , messages: vec![ChatMessage::user(prompt)]
            , max_tokens: Some(resolved.max_tokens)
            , temperature: Some(resolved.temperature)
            , stream: Some(false)
          };
          trace!("Codestral chat request: {:?}", request);
          resolved.into_request(
            settings.url("chat/completions"),
            &request
          )
        }
      , crate::Endpoint::Fim => {
          let request = FimRequest
          {   model: resolved.model.clone()
            , prompt: prompt.to_string()
            , suffix: config.suffix.clone().unwrap_or_default()
            , max_tokens: Some(resolved.max_tokens)
            , temperature: Some(resolved.temperature)
            , stream: Some(false)
          };
          trace!("Codestral FIM request: {:?}", request);
          resolved.into_request(
            settings.url("fim/completions"),
            &request
          )
        }
    }
}
