//! Provider wire formats and the per-variant dispatch over them

pub mod mistral;
pub mod codestral;

use std::time::Duration;
use log::{debug, error};
use serde::Serialize;

use crate::config::{ProviderConfig, RequestConfig};
use crate::request::{BrokerResult, ProviderRequest, ProviderResponse};
use crate::Provider;

/// Model families that identify their provider.
const CODESTRAL_MODEL_PREFIXES: &[&str] = &["codestral"];
const MISTRAL_MODEL_PREFIXES: &[&str] = &[
  "mistral",
  "open-mistral",
  "open-mixtral",
  "ministral",
  "magistral",
  "pixtral",
];

impl Provider
{   /// Provider a model name belongs to, if the family is known.
    pub fn for_model(model: &str) -> Option<Provider>
    {   let model = model.trim().to_ascii_lowercase();
        let has_prefix = |prefixes: &[&str]| prefixes
          .iter()
          .any(|p| model.starts_with(p));

        if has_prefix(CODESTRAL_MODEL_PREFIXES)
        {   Some(Provider::Codestral)
        } else if has_prefix(MISTRAL_MODEL_PREFIXES)
        {   Some(Provider::Mistral)
        } else
        {   None
        }
    }

    /// Shape the outbound call for this provider.
    pub fn build_request(
      self
    , settings: &ProviderConfig
    , prompt: &str
    , config: &RequestConfig
    ) -> Result<ProviderRequest, crate::error::Error>
    {   match self
        {   Provider::Mistral =>
              mistral::build_request(settings, prompt, config)
          , Provider::Codestral =>
              codestral::build_request(settings, prompt, config)
        }
    }

    /// Turn a raw answer into a result attributed to this provider.
    ///
    /// Both providers share the completion response shape, so the
    /// parsing is common; only the attribution differs.
    pub fn parse_response(
      self
    , response: ProviderResponse
    , requested_model: &str
    ) -> Result<BrokerResult, crate::error::Error>
    {   if !response.is_success()
        {   error!(
              "{} API error {}: {}",
              self, response.status, response.body
            );
            return Err(crate::error::Error::ProviderUnavailable
            {   provider: self
              , status: Some(response.status)
              , reason: error_message(&response.body)
            });
        }

        let parsed: mistral::CompletionResponse
          = serde_json::from_str(&response.body).map_err(|e| {
            error!("{} parse error: {}", self, e);
            crate::error::Error::malformed(self, e.to_string())
          })?;

        let content = parsed.choices
          .into_iter()
          .next()
          .ok_or_else(|| {
            error!("No choices in {} response", self);
            crate::error::Error::malformed(self, "no choices in response")
          })?
          .message
          .content
          .map(mistral::MessageContent::into_text)
          .filter(|text| !text.is_empty())
          .ok_or_else(|| {
            error!("Empty content in {} response", self);
            crate::error::Error::malformed(self, "empty message content")
          })?;

        debug!("{} returned {} chars", self, content.len());
        Ok(BrokerResult
        {   content
          , provider: self
          , model: parsed.model
              .filter(|m| !m.is_empty())
              .unwrap_or_else(|| requested_model.to_string())
          , usage: parsed.usage.map(Into::into)
        })
    }
}

/// Request parameters after defaults are applied
pub(crate) struct Resolved
{   pub provider: Provider
  , pub api_key: String
  , pub model: String
  , pub temperature: f32
  , pub max_tokens: u32
  , pub timeout: Duration
}

impl Resolved
{   pub fn into_request<T: Serialize>(
      self
    , url: String
    , body: &T
    ) -> Result<ProviderRequest, crate::error::Error>
    {   let body = serde_json::to_value(body).map_err(|e| {
          crate::error::Error::Other(
            format!("cannot encode {} request: {}", self.provider, e)
          )
        })?;
        Ok(ProviderRequest
        {   provider: self.provider
          , url
          , api_key: self.api_key
          , body
          , timeout: self.timeout
        })
    }
}

pub(crate) fn resolve(
  provider: Provider
, settings: &ProviderConfig
, config: &RequestConfig
) -> Result<Resolved, crate::error::Error>
{   let api_key = settings.api_key
      .clone()
      .filter(|k| !k.is_empty())
      .ok_or_else(|| {
        error!("No API key for {}", provider);
        crate::error::Error::MissingApiKey(provider)
      })?;

    Ok(Resolved
    {   provider
      , api_key
      , model: config.model
          .clone()
          .unwrap_or_else(|| settings.default_model.clone())
      , temperature: config.temperature
          .unwrap_or(settings.default_temperature)
      , max_tokens: config.max_tokens
          .unwrap_or(settings.default_max_tokens)
      , timeout: Duration::from_secs(
          config.timeout_secs.unwrap_or(settings.timeout_secs)
        )
    })
}

/// Best-effort extraction of an API error message.
fn error_message(body: &str) -> String
{   let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
      v.get("message")
        .or_else(|| v.get("error").and_then(|e| e.get("message")))
        .or_else(|| v.get("detail"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
    });
    match message
    {   Some(m) => m
      , None if body.trim().is_empty() => "empty response body".to_string()
      , None => body.chars().take(500).collect()
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::Endpoint;

    fn keyed(mut settings: ProviderConfig) -> ProviderConfig
    {   settings.api_key = Some("secret".to_string());
        settings
    }

    fn ok(body: &str) -> ProviderResponse
    {   ProviderResponse
        {   status: 200
          , body: body.to_string()
        }
    }

    #[test]
    fn model_families_pin_providers()
    {   assert_eq!(Provider::for_model("codestral-latest"),
          Some(Provider::Codestral));
        assert_eq!(Provider::for_model("mistral-large-latest"),
          Some(Provider::Mistral));
        assert_eq!(Provider::for_model("open-mixtral-8x7b"),
          Some(Provider::Mistral));
        assert_eq!(Provider::for_model("gpt-4o"), None);
    }

    #[test]
    fn mistral_request_is_chat_even_for_fim()
    {   let config = RequestConfig
        {   endpoint: Some(Endpoint::Fim)
          , suffix: Some("}".to_string())
          , ..Default::default()
        };
        let request = Provider::Mistral
          .build_request(&keyed(ProviderConfig::mistral()), "hi", &config)
          .unwrap();

        assert!(request.url.ends_with("/chat/completions"));
        assert_eq!(request.body["messages"][0]["role"], "user");
        assert_eq!(request.body["messages"][0]["content"], "hi");
        assert!(request.body.get("suffix").is_none());
        assert_eq!(request.body["model"], "mistral-small-latest");
        assert_eq!(request.body["max_tokens"], 1024);
    }

    #[test]
    fn codestral_fim_has_no_messages()
    {   let config = RequestConfig
        {   endpoint: Some(Endpoint::Fim)
          , temperature: Some(0.25)
          , max_tokens: Some(64)
          , ..Default::default()
        };
        let request = Provider::Codestral
          .build_request(&keyed(ProviderConfig::codestral()), "fn f(", &config)
          .unwrap();

        assert!(request.url.ends_with("/fim/completions"));
        assert!(request.body.get("messages").is_none());
        assert_eq!(request.body["prompt"], "fn f(");
        assert_eq!(request.body["suffix"], "");
        assert_eq!(request.body["temperature"], 0.25);
        assert_eq!(request.body["max_tokens"], 64);
    }

    #[test]
    fn missing_key_is_reported_before_sending()
    {   let result = Provider::Codestral.build_request(
          &ProviderConfig::codestral(),
          "fn main() {}",
          &RequestConfig::default()
        );
        assert_eq!(
          result.unwrap_err(),
          crate::error::Error::MissingApiKey(Provider::Codestral)
        );
    }

    #[test]
    fn parse_normalizes_usage_and_model()
    {   let result = Provider::Codestral.parse_response(
          ok(r#"{"model":"codestral-2501","choices":[{"message":{"role":"assistant","content":"n-2)"}}],"usage":{"prompt_tokens":12,"completion_tokens":3}}"#),
          "codestral-latest"
        ).unwrap();

        assert_eq!(result.content, "n-2)");
        assert_eq!(result.provider, Provider::Codestral);
        assert_eq!(result.model, "codestral-2501");
        let usage = result.usage.unwrap();
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn parse_accepts_chunked_content()
    {   let result = Provider::Mistral.parse_response(
          ok(r#"{"choices":[{"message":{"content":[{"type":"thinking","text":"hmm"},{"type":"text","text":"Hello"},{"type":"text","text":" there"}]}}]}"#),
          "magistral-medium-latest"
        ).unwrap();
        assert_eq!(result.content, "Hello there");
        assert_eq!(result.model, "magistral-medium-latest");
        assert!(result.usage.is_none());
    }

    #[test]
    fn parse_failures_are_typed()
    {   let status = Provider::Mistral.parse_response(
          ProviderResponse
          {   status: 429
            , body: r#"{"message":"Requests rate limit exceeded"}"#.into()
          },
          "m"
        ).unwrap_err();
        assert_eq!(status, crate::error::Error::ProviderUnavailable
        {   provider: Provider::Mistral
          , status: Some(429)
          , reason: "Requests rate limit exceeded".to_string()
        });

        for body in ["not json", r#"{"choices":[]}"#,
                     r#"{"choices":[{"message":{"content":""}}]}"#]
        {   let err = Provider::Codestral
              .parse_response(ok(body), "c")
              .unwrap_err();
            assert!(
              matches!(err, crate::error::Error::MalformedResponse { .. }),
              "{} gave {:?}", body, err
            );
        }
    }
}
