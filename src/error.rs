use std::fmt;

/// Custom error type for broker operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// Rejected before any network call (empty prompt, bad ranges)
    InvalidInput(String)
  , /// No credential configured for a provider
    MissingApiKey(crate::Provider)
  , /// Network failure, timeout or non-2xx status
    ProviderUnavailable
    {   provider: crate::Provider
      , status: Option<u16>
      , reason: String
    }
  , /// 2xx response whose body has no usable content
    MalformedResponse
    {   provider: crate::Provider
      , reason: String
    }
  , /// Primary and substitute provider both failed
    BothProvidersFailed
    {   primary: Box<Error>
      , fallback: Box<Error>
    }
  , /// Caller cancelled the request
    Cancelled
  , /// Invalid broker configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether `route` may retry this failure against the other
    /// provider.
    pub fn is_substitutable(&self) -> bool
    {   matches!(
          self,
          Error::ProviderUnavailable { .. }
            | Error::MalformedResponse { .. }
            | Error::MissingApiKey(_)
        )
    }

    /// Provider the failure came from, when there is exactly one.
    pub fn provider(&self) -> Option<crate::Provider>
    {   match self
        {   Error::MissingApiKey(provider)
          | Error::ProviderUnavailable { provider, .. }
          | Error::MalformedResponse { provider, .. } => Some(*provider)
          , _ => None
        }
    }

    pub(crate) fn unavailable(
      provider: crate::Provider
    , reason: impl Into<String>
    ) -> Self
    {   Error::ProviderUnavailable
        {   provider
          , status: None
          , reason: reason.into()
        }
    }

    pub(crate) fn malformed(
      provider: crate::Provider
    , reason: impl Into<String>
    ) -> Self
    {   Error::MalformedResponse
        {   provider
          , reason: reason.into()
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::ProviderUnavailable { provider, status, reason } => {
              match status
              {   Some(code) => write!(f,
                    "{} unavailable (HTTP {}): {}",
                    provider, code, reason
                  )
                , None => write!(f,
                    "{} unavailable: {}",
                    provider, reason
                  )
              }
            }
          , Error::MalformedResponse { provider, reason } => {
              write!(f,
                "Malformed {} response: {}",
                provider, reason
              )
            }
          , Error::BothProvidersFailed { primary, fallback } => {
              write!(f,
                "Both providers failed; primary: {}; fallback: {}",
                primary, fallback
              )
            }
          , Error::Cancelled => {
              write!(f, "Request cancelled")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
