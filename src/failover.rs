//! Single-substitution fallback between the two providers

use log::debug;

use crate::config::RequestConfig;
use crate::Provider;

/// Provider `route` retries on after `primary` fails, if any.
pub fn substitute(primary: Provider, failover_enabled: bool)
  -> Option<Provider>
{   if failover_enabled
    {   Some(primary.other())
    } else
    {   debug!("Failover disabled, no substitute for {}", primary);
        None
    }
}

/// Carry a request config over to the substitute provider.
///
/// The model was picked for the failed provider, so the
/// substitute falls back to its own default. Mistral cannot do FIM, so
/// the endpoint and suffix are dropped for it. Sampling, length and
/// timeout settings carry over unchanged.
pub fn translate_config(
  config: &RequestConfig
, to: Provider
) -> RequestConfig
{   let mut translated = RequestConfig
    {   model: None
      , provider: Some(to.into())
      , ..config.clone()
    };
    if !to.supports_fim()
    {   translated.endpoint = None;
        translated.suffix = None;
    }
    debug!("Translated config for {}: {:?}", to, translated);
    translated
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::Endpoint;

    #[test]
    fn substitute_is_the_other_provider()
    {   assert_eq!(
          substitute(Provider::Codestral, true),
          Some(Provider::Mistral)
        );
        assert_eq!(
          substitute(Provider::Mistral, true),
          Some(Provider::Codestral)
        );
        assert_eq!(substitute(Provider::Mistral, false), None);
    }

    #[test]
    fn translation_drops_provider_specific_fields()
    {   let config = RequestConfig
        {   model: Some("codestral-latest".to_string())
          , temperature: Some(0.1)
          , max_tokens: Some(800)
          , endpoint: Some(Endpoint::Fim)
          , suffix: Some("}".to_string())
          , timeout_secs: Some(9)
          , ..Default::default()
        };

        let to_mistral = translate_config(&config, Provider::Mistral);
        assert_eq!(to_mistral.model, None);
        assert_eq!(to_mistral.endpoint, None);
        assert_eq!(to_mistral.suffix, None);
        assert_eq!(to_mistral.temperature, Some(0.1));
        assert_eq!(to_mistral.max_tokens, Some(800));
        assert_eq!(to_mistral.timeout_secs, Some(9));
        assert_eq!(
          to_mistral.provider,
          Some(crate::ProviderChoice::Mistral)
        );

        let to_codestral = translate_config(&config, Provider::Codestral);
        assert_eq!(to_codestral.endpoint, Some(Endpoint::Fim));
        assert_eq!(to_codestral.suffix.as_deref(), Some("}"));
    }
}
