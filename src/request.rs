//! Normalized results and the envelopes crossing the transport seam

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token accounting, normalized across providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage
{   pub prompt_tokens: u32
  , pub completion_tokens: u32
  , pub total_tokens: u32
}

/// Usage object as providers report it; any counter may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUsage
{   #[serde(default)]
    pub prompt_tokens: Option<u32>
  , #[serde(default)]
    pub completion_tokens: Option<u32>
  , #[serde(default)]
    pub total_tokens: Option<u32>
}

impl From<RawUsage> for Usage
{   fn from(raw: RawUsage) -> Self
    {   let prompt_tokens = raw.prompt_tokens.unwrap_or(0);
        let completion_tokens = raw.completion_tokens.unwrap_or(0);
        Usage
        {   prompt_tokens
          , completion_tokens
          , total_tokens: raw.total_tokens.unwrap_or(
              prompt_tokens.saturating_add(completion_tokens)
            )
        }
    }
}

/// What the broker hands back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerResult
{   /// Generated text
    pub content: String
  , /// Provider that actually produced `content`
    pub provider: crate::Provider
  , /// Model that generated it
    pub model: String
  , /// Tokens used, when reported
    pub usage: Option<Usage>
}

/// One outbound call, fully resolved
#[derive(Debug, Clone)]
pub struct ProviderRequest
{   pub provider: crate::Provider
  , pub url: String
  , pub api_key: String
  , pub body: serde_json::Value
  , pub timeout: Duration
}

/// Raw provider answer; interpretation is left to the provider module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse
{   pub status: u16
  , pub body: String
}

impl ProviderResponse
{   pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}
