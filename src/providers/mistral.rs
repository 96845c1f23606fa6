use serde::{Deserialize, Serialize};
use log::{debug, trace};

use crate::config::{ProviderConfig, RequestConfig};
use crate::request::{ProviderRequest, RawUsage};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

/// Completion response shared by chat and FIM endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse
{   #[serde(default)]
    pub model: Option<String>
  , #[serde(default)]
    pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<RawUsage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<MessageContent>
}

/// Newer models may answer with typed chunks instead of a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent
{   Text(String)
  , Chunks(Vec<ContentChunk>)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentChunk
{   #[serde(rename = "type", default)]
    pub kind: Option<String>
  , #[serde(default)]
    pub text: Option<String>
}

impl MessageContent
{   /// Concatenated text, ignoring non-text chunks.
    pub fn into_text(self) -> String
    {   match self
        {   MessageContent::Text(text) => text
          , MessageContent::Chunks(chunks) => chunks
              .into_iter()
              .filter(|c| c.kind.as_deref().unwrap_or("text") == "text")
              .filter_map(|c| c.text)
              .collect()
        }
    }
}

// ===== Request Building =====

/// Mistral always speaks chat; a FIM endpoint request is downgraded.
pub(crate) fn build_request(
  settings: &ProviderConfig
, prompt: &str
, config: &RequestConfig
) -> Result<ProviderRequest, crate::error::Error>
{   let provider = crate::Provider::Mistral;
    let resolved = super::resolve(provider, settings, config)?;

    if config.endpoint() == crate::Endpoint::Fim
    {   debug!("Mistral has no FIM mode, sending as chat");
    }

    let request = ChatRequest
    {   model: resolved.model.clone()
      , messages: vec![ChatMessage::user(prompt)]
      , max_tokens: Some(resolved.max_tokens)
      , temperature: Some(resolved.temperature)
      , stream: Some(false)
    };
    trace!("Mistral request: {:?}", request);

    resolved.into_request(
      settings.url("chat/completions"),
      &request
    )
}
