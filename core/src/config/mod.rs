use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ABACUS_DIR: &str = ".abacus";

/// USD per million tokens, used when the provider does not report cost.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl Pricing {
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_mtok + output_tokens as f64 * self.output_per_mtok)
            / 1_000_000.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    /// Unset means the provider's own default model.
    pub model: Option<String>,
    pub max_iterations: usize,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: None,
            max_iterations: 8,
            temperature: 0.0,
            pricing: None,
        }
    }
}

pub fn get_abacus_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ABACUS_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_abacus_dir().join("config.toml")
}

pub fn get_history_path() -> PathBuf {
    get_abacus_dir().join("history")
}

impl Config {
    /// Loads `~/.abacus/config.toml`, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default() -> Result<Self> {
        load_config_from(&get_config_path())
    }
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to read config from {}: {}",
                config_path.display(),
                e
            ));
        }
    };

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.model.is_none());
        assert_eq!(config.max_iterations, 8);
        assert!(config.provider.is_none());
        assert!(config.pricing.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
provider = "openrouter"
model = "openai/gpt-4o-mini"

[pricing]
input_per_mtok = 0.15
output_per_mtok = 0.6
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.provider.as_deref(), Some("openrouter"));
        assert_eq!(config.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert_eq!(config.temperature, 0.0);
        assert_eq!(
            config.pricing,
            Some(Pricing {
                input_per_mtok: 0.15,
                output_per_mtok: 0.6
            })
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn pricing_is_per_million_tokens() {
        let pricing = Pricing {
            input_per_mtok: 1.0,
            output_per_mtok: 2.0,
        };
        let cost = pricing.cost(1_000, 500);
        assert!((cost - 0.002).abs() < 1e-12);
    }
}
