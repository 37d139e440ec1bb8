//! Runtime settings.
//!
//! Settings come from an optional TOML secrets file, then the environment. Only the API key is
//! secret; everything else has a default so an empty (or missing) file is a valid configuration.
//!
//! ```toml
//! huggingface_api_key = "hf_..."
//! confidence_floor = 0.75
//! temperature = 0.9
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::mood::DEFAULT_TEMPERATURE;
use crate::sentiment::DEFAULT_CONFIDENCE_FLOOR;

/// Environment variable holding the Inference API token.
pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

/// Default secrets file, looked up in the working directory.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Default remote sentiment classifier.
pub const DEFAULT_SENTIMENT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/finiteautomata/bertweet-base-sentiment-analysis";

/// Process-wide settings for the sentiment and generation steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bearer token for the sentiment endpoint. `None` (or empty) disables remote detection.
    pub huggingface_api_key: Option<String>,
    /// URL of the remote sentiment classifier.
    pub sentiment_endpoint: String,
    /// Minimum classifier score required to keep a polar label.
    pub confidence_floor: f32,
    /// Sampling temperature for the local model.
    pub temperature: f64,
    /// Timeout for the sentiment request, in seconds.
    pub request_timeout_secs: u64,
    /// Seed for the local model's sampler.
    pub seed: u64,
    /// Local generation model name, e.g. `qwen3-0.6b`.
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            huggingface_api_key: None,
            sentiment_endpoint: DEFAULT_SENTIMENT_ENDPOINT.to_string(),
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: 30,
            seed: 42,
            model: "qwen3-0.6b".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if it exists) and apply environment overrides.
    ///
    /// A missing file is not an error. A file that exists but does not parse is.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| match e {
                PipelineError::Config(msg) => {
                    PipelineError::Config(format!("{}: {msg}", path.display()))
                }
                other => other,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no secrets file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(settings.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from an environment lookup function.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.huggingface_api_key = Some(key);
        }
        self
    }

    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.huggingface_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(PipelineError::Config(format!(
                "confidence_floor must be within [0, 1], got {}",
                self.confidence_floor
            )));
        }
        if self.temperature < 0.0 {
            return Err(PipelineError::Config(format!(
                "temperature must not be negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}
