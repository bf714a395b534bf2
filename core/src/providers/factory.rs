use crate::config::Config;
use crate::providers::{OpenAIProvider, OpenRouterProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};

pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("openai");

    match provider_name.to_lowercase().as_str() {
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "ABACUS_OPENAI_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = OpenAIProvider::new(api_key);
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        "openrouter" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENROUTER_API_KEY", "ABACUS_OPENROUTER_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = OpenRouterProvider::new(api_key);
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Box::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: openai, openrouter",
            provider_name
        )),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set {} or api_key in {}",
            env_vars.join(" or "),
            crate::config::get_config_path().display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: Some("nope".into()),
            ..Config::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown provider: nope"));
    }

    #[test]
    fn config_key_is_the_fallback() {
        let key = resolve_api_key_with_fallback(&["ABACUS_TEST_UNSET_KEY_VAR"], "sk-test").unwrap();
        assert_eq!(key, "sk-test");
        assert!(resolve_api_key_with_fallback(&["ABACUS_TEST_UNSET_KEY_VAR"], "").is_err());
    }

    #[test]
    fn config_model_is_applied() {
        let config = Config {
            provider: Some("OpenRouter".into()),
            api_key: "sk-test".into(),
            model: Some("openai/gpt-4o".into()),
            ..Config::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model(), "openai/gpt-4o");
    }

    #[test]
    fn unset_model_keeps_provider_default() {
        let config = |name: &str| Config {
            provider: Some(name.into()),
            api_key: "sk-test".into(),
            ..Config::default()
        };
        let openrouter = create_provider(&config("openrouter")).unwrap();
        assert_eq!(openrouter.model(), "openai/gpt-4o-mini");
        let openai = create_provider(&config("openai")).unwrap();
        assert_eq!(openai.model(), "gpt-4o-mini");
    }
}
