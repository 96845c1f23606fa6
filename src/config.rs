//! Configuration for individual requests and for the broker itself

use serde::{Deserialize, Serialize};
use std::path::Path;
use log::{debug, warn};

pub const MISTRAL_API_BASE: &str
  = "https://api.mistral.ai/v1";
pub const CODESTRAL_API_BASE: &str
  = "https://codestral.mistral.ai/v1";

/// Per-call options; every field falls back to the provider default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig
{   /// Explicit model; a known model family also pins the provider
    pub model: Option<String>
  , /// Sampling temperature in [0, 1]
    pub temperature: Option<f32>
  , /// Upper bound on generated tokens
    pub max_tokens: Option<u32>
  , /// Chat or fill-in-the-middle (Codestral only)
    pub endpoint: Option<crate::Endpoint>
  , /// Explicit provider override for `route`
    pub provider: Option<crate::ProviderChoice>
  , /// Code following the completion point in FIM requests
    pub suffix: Option<String>
  , /// Per-call timeout, overrides the provider setting
    pub timeout_secs: Option<u64>
}

impl RequestConfig
{   /// Reject out-of-range values before anything touches the network.
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if let Some(t) = self.temperature
        {   if !t.is_finite() || !(0.0..=1.0).contains(&t)
            {   return Err(crate::error::Error::InvalidInput(
                  format!("temperature must be within [0, 1], got {}", t)
                ));
            }
        }
        if self.max_tokens == Some(0)
        {   return Err(crate::error::Error::InvalidInput(
              "maxTokens must be positive".to_string()
            ));
        }
        if self.timeout_secs == Some(0)
        {   return Err(crate::error::Error::InvalidInput(
              "timeoutSecs must be positive".to_string()
            ));
        }
        if let Some(model) = &self.model
        {   if model.trim().is_empty()
            {   return Err(crate::error::Error::InvalidInput(
                  "model must not be empty".to_string()
                ));
            }
        }
        Ok(())
    }

    pub fn endpoint(&self) -> crate::Endpoint
    {   self.endpoint.unwrap_or_default()
    }
}

/// Connection and default settings for one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderConfig
{   /// Bearer credential
    pub api_key: Option<String>
  , /// API base URL, without trailing slash
    pub api_base: String
  , /// Model used when the request names none
    pub default_model: String
  , pub default_temperature: f32
  , pub default_max_tokens: u32
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl ProviderConfig
{   pub fn mistral() -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: MISTRAL_API_BASE.to_string()
          , default_model: "mistral-small-latest".to_string()
          , default_temperature: 0.7
          , default_max_tokens: 1024
          , timeout_secs: 30
        }
    }

    pub fn codestral() -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: CODESTRAL_API_BASE.to_string()
          , default_model: "codestral-latest".to_string()
          , default_temperature: 0.2
          , default_max_tokens: 1024
          , timeout_secs: 30
        }
    }

    /// Reject defaults that `RequestConfig::validate` would refuse.
    pub fn validate(&self, provider: crate::Provider)
      -> Result<(), crate::error::Error>
    {   let invalid = |what: String| Err(
          crate::error::Error::InvalidConfiguration(
            format!("{}: {}", provider, what)
          )
        );
        let t = self.default_temperature;
        if !t.is_finite() || !(0.0..=1.0).contains(&t)
        {   return invalid(format!(
              "default_temperature must be within [0, 1], got {}", t
            ));
        }
        if self.default_max_tokens == 0
        {   return invalid("default_max_tokens must be positive".to_string());
        }
        if self.timeout_secs == 0
        {   return invalid("timeout_secs must be positive".to_string());
        }
        if self.default_model.trim().is_empty()
        {   return invalid("default_model must not be empty".to_string());
        }
        Ok(())
    }

    /// Join the base URL and an API path.
    pub fn url(&self, path: &str) -> String
    {   format!("{}/{}",
          self.api_base.trim_end_matches('/'),
          path.trim_start_matches('/')
        )
    }
}

/// Provider fields as they appear in a config file; anything left out
/// keeps the provider's own default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ProviderOverrides
{   api_key: Option<String>
  , api_base: Option<String>
  , default_model: Option<String>
  , default_temperature: Option<f32>
  , default_max_tokens: Option<u32>
  , timeout_secs: Option<u64>
}

impl ProviderOverrides
{   fn apply(self, mut base: ProviderConfig) -> ProviderConfig
    {   if self.api_key.is_some()
        {   base.api_key = self.api_key;
        }
        if let Some(v) = self.api_base { base.api_base = v; }
        if let Some(v) = self.default_model { base.default_model = v; }
        if let Some(v) = self.default_temperature
        {   base.default_temperature = v;
        }
        if let Some(v) = self.default_max_tokens
        {   base.default_max_tokens = v;
        }
        if let Some(v) = self.timeout_secs { base.timeout_secs = v; }
        base
    }
}

/// Failover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig
{   /// Enable the single substitution under `route`
    pub enabled: bool
}

impl Default for FailoverConfig
{   fn default() -> Self
    {   FailoverConfig
        {   enabled: true
        }
    }
}

/// Broker configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokerConfig
{   pub mistral: ProviderConfig
  , pub codestral: ProviderConfig
  , pub failover: FailoverConfig
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BrokerConfigFile
{   mistral: ProviderOverrides
  , codestral: ProviderOverrides
  , failover: FailoverConfig
}

impl Default for BrokerConfig
{   fn default() -> Self
    {   BrokerConfig
        {   mistral: ProviderConfig::mistral()
          , codestral: ProviderConfig::codestral()
          , failover: FailoverConfig::default()
        }
    }
}

impl BrokerConfig
{   /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self
    {   BrokerConfig::default()
          .with_env(|name| std::env::var(name).ok())
    }

    /// Load a JSON config file, then fill gaps from the environment.
    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading broker config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("cannot read {}: {}", path.display(), e)
          )
        })?;
        Ok(BrokerConfig::from_json_str(&text)?
          .with_env(|name| std::env::var(name).ok()))
    }

    pub fn from_json_str(text: &str)
      -> Result<Self, crate::error::Error>
    {   let file: BrokerConfigFile = serde_json::from_str(text)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        let config = BrokerConfig
        {   mistral: file.mistral.apply(ProviderConfig::mistral())
          , codestral: file.codestral.apply(ProviderConfig::codestral())
          , failover: file.failover
        };
        config.mistral.validate(crate::Provider::Mistral)?;
        config.codestral.validate(crate::Provider::Codestral)?;
        Ok(config)
    }

    /// Overlay environment values read through `lookup`.
    ///
    /// Keys already present are kept. Without a Codestral key the
    /// Mistral key is reused, and a Codestral base still at its built-in
    /// value moves to the Mistral base URL, which also serves the
    /// Codestral models.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
      F: Fn(&str) -> Option<String>
    {   let read = |name: &str| lookup(name)
          .map(|v| v.trim().to_string())
          .filter(|v| !v.is_empty());

        if self.mistral.api_key.is_none()
        {   self.mistral.api_key = read("MISTRAL_API_KEY");
        }
        if let Some(base) = read("MISTRAL_API_BASE")
        {   self.mistral.api_base = base;
        }

        let codestral_base = read("CODESTRAL_API_BASE");
        if self.codestral.api_key.is_none()
        {   match read("CODESTRAL_API_KEY")
            {   Some(key) => self.codestral.api_key = Some(key)
              , None => {
                  if let Some(key) = self.mistral.api_key.clone()
                  {   debug!("Reusing Mistral key for Codestral");
                      self.codestral.api_key = Some(key);
                      if codestral_base.is_none()
                        && self.codestral.api_base == CODESTRAL_API_BASE
                      {   self.codestral.api_base
                            = self.mistral.api_base.clone();
                      }
                  }
                }
            }
        }
        if let Some(base) = codestral_base
        {   self.codestral.api_base = base;
        }

        if let Some(flag) = read("AIROUTE_FAILOVER")
        {   match flag.to_ascii_lowercase().as_str()
            {   "0" | "false" | "off" | "no" => self.failover.enabled = false
              , "1" | "true" | "on" | "yes" => self.failover.enabled = true
              , other => warn!("Ignoring AIROUTE_FAILOVER={}", other)
            }
        }
        self
    }

    pub fn provider(&self, provider: crate::Provider) -> &ProviderConfig
    {   match provider
        {   crate::Provider::Mistral => &self.mistral
          , crate::Provider::Codestral => &self.codestral
        }
    }
}
