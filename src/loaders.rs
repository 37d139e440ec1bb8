use serde::Deserialize;
use std::path::PathBuf;
use tokenizers::Tokenizer;
use tokio::time::Duration;

use crate::error::{PipelineError, Result};

/// Sampling defaults shipped with a model in `generation_config.json`.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u64>,
    pub repeat_penalty: Option<f32>,
    pub eos_token_ids: Vec<u32>,
}

/// A single file in a HuggingFace Hub repository.
#[derive(Debug, Clone)]
pub struct HfFile {
    pub repo: String,
    pub filename: String,
}

impl HfFile {
    const MAX_ATTEMPTS: u32 = 3;

    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    /// Fetch the file into the local hub cache and return its path.
    pub async fn fetch(&self) -> Result<PathBuf> {
        let api = hf_hub::api::tokio::ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
            })?;
        let repo = api.model(self.repo.clone());

        let mut last_error = String::new();
        for attempt in 0..Self::MAX_ATTEMPTS {
            match repo.get(&self.filename).await {
                Ok(path) => {
                    tracing::debug!(repo = %self.repo, file = %self.filename, "fetched");
                    return Ok(path);
                }
                Err(e) => {
                    last_error = e.to_string();
                    // Concurrent downloads of the same file race on the hub cache lock.
                    if !last_error.contains("Lock acquisition failed") {
                        break;
                    }
                    let wait = Duration::from_millis(100 * (1 << attempt));
                    tracing::debug!(?wait, file = %self.filename, "hub cache locked, retrying");
                    tokio::time::sleep(wait).await;
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Failed to download '{}' from '{}': {}",
            self.filename, self.repo, last_error
        )))
    }
}

pub async fn load_tokenizer(repo: &str) -> Result<Tokenizer> {
    let path = HfFile::new(repo, "tokenizer.json").fetch().await?;

    Tokenizer::from_file(&path).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Failed to load tokenizer from '{}': {}",
            path.display(),
            e
        ))
    })
}

#[derive(Deserialize)]
struct RawGenerationConfig {
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u64>,
    #[serde(alias = "repetition_penalty")]
    repeat_penalty: Option<f32>,
    #[serde(alias = "eos_token_ids")]
    eos_token_id: Option<serde_json::Value>,
}

pub async fn load_generation_config(repo: &str) -> Result<GenerationConfig> {
    let path = HfFile::new(repo, "generation_config.json").fetch().await?;
    let content = std::fs::read_to_string(path)?;
    parse_generation_config(&content)
}

fn parse_generation_config(content: &str) -> Result<GenerationConfig> {
    let raw: RawGenerationConfig = serde_json::from_str(content)?;

    let as_token_id = |v: &serde_json::Value| -> Result<u32> {
        v.as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(|| PipelineError::Unexpected(format!("Invalid eos_token_id: {v}")))
    };

    let eos_token_ids = match &raw.eos_token_id {
        Some(serde_json::Value::Array(ids)) => ids.iter().map(as_token_id).collect::<Result<_>>()?,
        Some(id) => vec![as_token_id(id)?],
        None => Vec::new(),
    };

    Ok(GenerationConfig {
        temperature: raw.temperature,
        top_p: raw.top_p,
        top_k: raw.top_k,
        repeat_penalty: raw.repeat_penalty,
        eos_token_ids,
    })
}

pub async fn load_gguf(
    repo: &str,
    filename: &str,
) -> Result<(std::fs::File, candle_core::quantized::gguf_file::Content)> {
    let path = HfFile::new(repo, filename).fetch().await?;

    let mut file = std::fs::File::open(&path)?;
    let content = candle_core::quantized::gguf_file::Content::read(&mut file)
        .map_err(|e| e.with_path(path))?;

    Ok((file, content))
}
