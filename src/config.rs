//! # Configuration Management
//!
//! Loads application configuration from multiple sources:
//! - TOML configuration file (config.toml)
//! - Environment variables (with APP_ prefix)
//! - Default values (built into the code)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Environment variables (APP_SERVER_HOST, APP_MODELS_MODEL_DIR, ...)
//! 2. Configuration file (config.toml)
//! 3. Default values (defined in the Default impl)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub limits: LimitsConfig,
}

/// Server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Speech model settings.
///
/// ## Fields:
/// - `model_dir`: directory containing one subdirectory per language model
///   (e.g. `models/vosk-model-small-en-us-0.15`)
/// - `default_language`: the language the `auto` sentinel resolves to;
///   must be one of the enumerated language codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub model_dir: String,
    pub default_language: String,
}

/// Request processing limits.
///
/// ## Fields:
/// - `chunk_frames`: PCM frames fed to the recognizer per chunk. A tuning
///   parameter, not a protocol requirement.
/// - `max_upload_bytes`: maximum accepted upload size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub chunk_frames: usize,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            models: ModelsConfig {
                model_dir: "models".to_string(),
                default_language: "en".to_string(),
            },
            limits: LimitsConfig {
                chunk_frames: 4000,
                // 2 GB, matching the transport contract
                max_upload_bytes: 2 * 1024 * 1024 * 1024,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config.toml, and the environment.
    ///
    /// `HOST` and `PORT` are honored without the APP_ prefix because
    /// deployment platforms commonly inject them.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.models.model_dir.is_empty() {
            return Err(anyhow::anyhow!("Model directory cannot be empty"));
        }

        if crate::transcription::LanguageCode::parse(&self.models.default_language).is_none() {
            return Err(anyhow::anyhow!(
                "Default language '{}' is not a supported language code",
                self.models.default_language
            ));
        }

        if self.limits.chunk_frames == 0 {
            return Err(anyhow::anyhow!("Chunk size must be greater than 0"));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limit must be greater than 0"));
        }

        Ok(())
    }

    /// Model directory as a path.
    pub fn model_dir(&self) -> PathBuf {
        PathBuf::from(&self.models.model_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.chunk_frames, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.models.default_language = "xx".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.limits.chunk_frames = 0;
        assert!(config.validate().is_err());
    }
}
