pub mod error;
pub mod config;
pub mod classify;
pub mod providers;
pub mod request;
pub mod transport;
pub mod failover;
pub mod broker;
pub mod client;
pub mod diagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use broker::Broker;
pub use client::BrokerBackend;
pub use config::{BrokerConfig, RequestConfig};
pub use error::Error;
pub use request::{BrokerResult, Usage};
pub use transport::{HttpTransport, Transport};

/*

airoute: one prompt in, one answer out, from whichever of the two
Mistral-hosted backends suits it. General prompts go to the Mistral
chat models, code prompts go to Codestral, and when the chosen one
fails the other one gets exactly one chance.

airoute/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Shared enums, channel args, re-exports
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # Per-request and broker configuration
│   ├── classify.rs     # Prompt intent heuristic
│   ├── request.rs      # Normalized results and wire envelopes
│   ├── transport.rs    # Network seam (reqwest by default)
│   ├── providers/      # Mistral and Codestral wire formats
│   ├── failover.rs     # Single-substitution fallback plan
│   ├── broker.rs       # route / call_codestral / call_mistral
│   ├── client.rs       # Channel-driven backend task
│   └── diagnostics.rs  # JSON envelopes for smoke-test routes
├── demos/usage.rs      # Console walkthrough against the live APIs
└── tests/

*/

/// AIROUTE API INTERFACE:

// ===== SendPrompt =====

pub type SendPromptReply = Result<BrokerResult, crate::error::Error>;
pub type SendPromptReplySender
  = tokio::sync::mpsc::UnboundedSender<SendPromptReply>;

pub struct SendPromptArgs
{   pub prompt: String
  , pub config: Option<RequestConfig>
  , pub entry: EntryPoint
  , pub reply: SendPromptReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== BrokerHand (sender side) =====

pub struct BrokerHand
{   pub send_prompt_tx
      : tokio::sync::mpsc::UnboundedSender<SendPromptArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== BrokerFoot (receiver side) =====

pub struct BrokerFoot
{   pub send_prompt_rx
      : tokio::sync::mpsc::UnboundedReceiver<SendPromptArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// AIROUTE STRUCTURES:

/// The two concrete backends the broker can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{
  /// Mistral AI general chat/reasoning models
  Mistral
  ,
  /// Codestral, code-specialized (chat and fill-in-the-middle)
  Codestral
}

impl Provider
{   /// The substitute used when this provider fails under `route`.
    pub fn other(self) -> Provider
    {   match self
        {   Provider::Mistral => Provider::Codestral
          , Provider::Codestral => Provider::Mistral
        }
    }

    pub fn supports_fim(self) -> bool
    {   matches!(self, Provider::Codestral)
    }

    pub fn as_str(self) -> &'static str
    {   match self
        {   Provider::Mistral => "mistral"
          , Provider::Codestral => "codestral"
        }
    }
}

impl fmt::Display for Provider
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// Provider requested through `RequestConfig::provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice
{   Mistral
  , Codestral
  , #[default]
    Auto
}

impl ProviderChoice
{   /// Concrete provider, or `None` for auto-detection.
    pub fn pinned(self) -> Option<Provider>
    {   match self
        {   ProviderChoice::Mistral => Some(Provider::Mistral)
          , ProviderChoice::Codestral => Some(Provider::Codestral)
          , ProviderChoice::Auto => None
        }
    }
}

impl From<Provider> for ProviderChoice
{   fn from(provider: Provider) -> Self
    {   match provider
        {   Provider::Mistral => ProviderChoice::Mistral
          , Provider::Codestral => ProviderChoice::Codestral
        }
    }
}

/// Request shape: conversational chat or fill-in-the-middle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint
{   #[default]
    Chat
  , Fim
}

/// Which broker operation a queued prompt runs through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoint
{   /// `Broker::route`, auto-detection with fallback
    #[default]
    Route
  , /// `Broker::call_codestral`, no fallback
    Codestral
  , /// `Broker::call_mistral`, no fallback
    Mistral
}
