//! JSON envelopes for smoke-testing the broker from a web layer
//!
//! These are the bodies the application's test routes return. No HTTP
//! framework is involved: each check yields the status code and the
//! serializable body, and the hosting route just writes them out.

use chrono::{SecondsFormat, Utc};
use log::{error, info};
use serde::Serialize;

use crate::{Broker, Endpoint, Provider, RequestConfig, Usage};

pub const ROUTE_CHECK_PROMPT: &str
  = "Write a simple JavaScript function to add two numbers";
pub const CODESTRAL_CHECK_PROMPT: &str
  = "Write a Python function to calculate factorial";
pub const PREVIEW_CHARS: usize = 200;

/// Body of a check route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckEnvelope
{   Success
    {   status: &'static str
      , message: &'static str
      , test: &'static str
      , provider: Provider
      , response: String
      , #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>
      , timestamp: String
    }
  , Failure
    {   status: &'static str
      , message: &'static str
      , error: String
      , timestamp: String
    }
}

/// HTTP status plus body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome
{   pub http_status: u16
  , pub body: CheckEnvelope
}

/// Body of the interactive form route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOutcome
{   pub success: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>
}

fn timestamp() -> String
{   Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// First `PREVIEW_CHARS` characters followed by an ellipsis.
pub fn preview(content: &str) -> String
{   let mut head: String = content.chars().take(PREVIEW_CHARS).collect();
    head.push_str("...");
    head
}

fn codestral_fim_config(temperature: f32, max_tokens: u32) -> RequestConfig
{   RequestConfig
    {   endpoint: Some(Endpoint::Fim)
      , temperature: Some(temperature)
      , max_tokens: Some(max_tokens)
      , ..Default::default()
    }
}

/// Auto-detection check with a fixed code prompt.
pub async fn route_check(broker: &Broker) -> CheckOutcome
{   info!("Route check");
    let config = RequestConfig
    {   max_tokens: Some(200)
      , temperature: Some(0.2)
      , ..Default::default()
    };

    match broker.route(ROUTE_CHECK_PROMPT, Some(&config)).await
    {   Ok(result) => CheckOutcome
        {   http_status: 200
          , body: CheckEnvelope::Success
            {   status: "success"
              , message: "AI Router Test Complete"
              , test: "Auto-detection routing"
              , provider: result.provider
              , response: preview(&result.content)
              , usage: result.usage
              , timestamp: timestamp()
            }
        }
      , Err(e) => {
          error!("Route check failed: {}", e);
          CheckOutcome
          {   http_status: 500
            , body: CheckEnvelope::Failure
              {   status: "error"
                , message: "AI Router Test Failed"
                , error: e.to_string()
                , timestamp: timestamp()
              }
          }
        }
    }
}

/// Direct Codestral FIM check; a missing or blank prompt uses the
/// built-in one.
pub async fn codestral_check(
  broker: &Broker
, prompt: Option<&str>
) -> CheckOutcome
{   let prompt = prompt
      .filter(|p| !p.is_empty())
      .unwrap_or(CODESTRAL_CHECK_PROMPT);
    info!("Codestral check");
    let config = codestral_fim_config(0.3, 500);

    match broker.call_codestral(prompt, Some(&config)).await
    {   Ok(result) => CheckOutcome
        {   http_status: 200
          , body: CheckEnvelope::Success
            {   status: "success"
              , message: "Explicit Codestral Test Complete"
              , test: "Direct Codestral call"
              , provider: result.provider
              , response: result.content
              , usage: result.usage
              , timestamp: timestamp()
            }
        }
      , Err(e) => {
          error!("Codestral check failed: {}", e);
          CheckOutcome
          {   http_status: 500
            , body: CheckEnvelope::Failure
              {   status: "error"
                , message: "Explicit Codestral Test Failed"
                , error: e.to_string()
                , timestamp: timestamp()
              }
          }
        }
    }
}

/// Form submission: `test_type == "codestral"` goes straight to
/// Codestral FIM, anything else through `route`.
pub async fn form_check(
  broker: &Broker
, prompt: &str
, test_type: &str
) -> FormOutcome
{   let outcome = if test_type == "codestral"
    {   broker
          .call_codestral(prompt, Some(&codestral_fim_config(0.3, 500)))
          .await
    } else
    {   let config = RequestConfig
        {   temperature: Some(0.7)
          , max_tokens: Some(500)
          , ..Default::default()
        };
        broker.route(prompt, Some(&config)).await
    };

    match outcome
    {   Ok(result) => FormOutcome
        {   success: true
          , result: Some(result.content)
          , error: None
          , provider: Some(result.provider)
          , usage: result.usage
        }
      , Err(e) => FormOutcome
        {   success: false
          , result: None
          , error: Some(e.to_string())
          , provider: None
          , usage: None
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn preview_counts_characters()
    {   assert_eq!(preview("short"), "short...");

        let long = "é".repeat(250);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn failure_envelope_shape()
    {   let body = CheckEnvelope::Failure
        {   status: "error"
          , message: "AI Router Test Failed"
          , error: "boom".to_string()
          , timestamp: timestamp()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("provider").is_none());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
