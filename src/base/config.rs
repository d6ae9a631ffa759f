//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default sampling temperature for the LLM.
fn default_openai_temperature() -> f32 {
    0.7
}

/// Default timeout for one LLM completion, in seconds.
fn default_openai_timeout_secs() -> u64 {
    120
}

/// Default timeout for one robot webhook call, in seconds.
fn default_infoflow_robot_timeout_secs() -> u64 {
    10
}

/// Default timeout for one Grafana API call, in seconds.
fn default_grafana_timeout_secs() -> u64 {
    10
}

/// Default prompt template for the `grafana` command.
fn default_grafana_copilot_prompt() -> String {
    prompts::GRAFANA_COPILOT_PROMPT.to_string()
}

/// Configuration for the grafana-copilot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Grafana base URL, e.g. `http://localhost:3000` (`GRAFANA_HOST`).
    pub grafana_host: String,
    /// Grafana service account token (`GRAFANA_TOKEN`).
    pub grafana_token: String,
    /// Timeout for Grafana API calls in seconds (`GRAFANA_TIMEOUT_SECS`).
    #[serde(default = "default_grafana_timeout_secs")]
    pub grafana_timeout_secs: u64,
    /// Robot webhook URL replies are posted to (`INFOFLOW_ROBOT_WEBHOOK_ADDRESS`).
    pub infoflow_robot_webhook_address: String,
    /// Shared token for the callback address handshake (`INFOFLOW_ROBOT_TOKEN`).
    pub infoflow_robot_token: String,
    /// EncodingAESKey used to decrypt message callbacks (`INFOFLOW_ROBOT_ENCODING_AES_KEY`).
    pub infoflow_robot_encoding_aes_key: String,
    /// Timeout for robot webhook calls in seconds (`INFOFLOW_ROBOT_TIMEOUT_SECS`).
    #[serde(default = "default_infoflow_robot_timeout_secs")]
    pub infoflow_robot_timeout_secs: u64,
    /// API key of the OpenAI-compatible endpoint (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible endpoint (`OPENAI_API_BASE`).
    pub openai_api_base: String,
    /// Model to use (`OPENAI_MODEL`).
    pub openai_model: String,
    /// Sampling temperature to use (`OPENAI_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Timeout for one completion in seconds (`OPENAI_TIMEOUT_SECS`).
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,
    /// Optional custom prompt template to override the default (`GRAFANA_COPILOT_PROMPT`).
    #[serde(default = "default_grafana_copilot_prompt")]
    pub grafana_copilot_prompt: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check required values and ranges.
    pub fn validate(&self) -> Res<()> {
        let required = [
            ("GRAFANA_HOST", &self.grafana_host),
            ("GRAFANA_TOKEN", &self.grafana_token),
            ("INFOFLOW_ROBOT_WEBHOOK_ADDRESS", &self.infoflow_robot_webhook_address),
            ("INFOFLOW_ROBOT_TOKEN", &self.infoflow_robot_token),
            ("INFOFLOW_ROBOT_ENCODING_AES_KEY", &self.infoflow_robot_encoding_aes_key),
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("OPENAI_API_BASE", &self.openai_api_base),
            ("OPENAI_MODEL", &self.openai_model),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(anyhow::anyhow!("Configuration value `{}` not set.", name));
        }

        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if self.openai_timeout_secs == 0 || self.infoflow_robot_timeout_secs == 0 || self.grafana_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Timeouts must be at least 1 second."));
        }

        Ok(())
    }

    pub fn openai_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout_secs)
    }

    pub fn infoflow_robot_timeout(&self) -> Duration {
        Duration::from_secs(self.infoflow_robot_timeout_secs)
    }

    pub fn grafana_timeout(&self) -> Duration {
        Duration::from_secs(self.grafana_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigInner {
        ConfigInner {
            grafana_host: "http://localhost:3000".into(),
            grafana_token: "glsa_test".into(),
            grafana_timeout_secs: 10,
            infoflow_robot_webhook_address: "http://localhost/robot".into(),
            infoflow_robot_token: "token".into(),
            infoflow_robot_encoding_aes_key: "EREREREREREREREREREREQ".into(),
            infoflow_robot_timeout_secs: 10,
            openai_api_key: "sk-test".into(),
            openai_api_base: "http://localhost/v1".into(),
            openai_model: "ernie-4.0".into(),
            openai_temperature: 0.7,
            openai_timeout_secs: 120,
            grafana_copilot_prompt: default_grafana_copilot_prompt(),
        }
    }

    fn config(inner: ConfigInner) -> Config {
        Config { inner: Arc::new(inner) }
    }

    #[test]
    fn validate_accepts_complete_config() {
        let config = config(valid());

        assert!(config.validate().is_ok());
        assert_eq!(config.infoflow_robot_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn validate_names_missing_value() {
        let err = config(ConfigInner {
            infoflow_robot_token: "  ".into(),
            ..valid()
        })
        .validate()
        .unwrap_err();

        assert!(err.to_string().contains("INFOFLOW_ROBOT_TOKEN"));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(config(ConfigInner { openai_temperature: 2.5, ..valid() }).validate().is_err());
        assert!(config(ConfigInner { grafana_timeout_secs: 0, ..valid() }).validate().is_err());
    }

    #[test]
    fn load_reads_toml_file_with_defaults() {
        let path = std::env::temp_dir().join(format!("grafana-copilot-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
grafana_host = "http://grafana:3000"
grafana_token = "glsa_file"
infoflow_robot_webhook_address = "http://robot/send"
infoflow_robot_token = "file-token"
infoflow_robot_encoding_aes_key = "EREREREREREREREREREREQ"
openai_api_key = "sk-file"
openai_api_base = "http://llm/v1"
openai_model = "ernie-4.0"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.grafana_token, "glsa_file");
        assert_eq!(config.openai_temperature, 0.7);
        assert_eq!(config.infoflow_robot_timeout_secs, 10);
        assert_eq!(config.grafana_copilot_prompt, prompts::GRAFANA_COPILOT_PROMPT);
    }
}
