use candle_core::{Device, Tensor};
use candle_transformers::models::quantized_qwen3 as candle_qwen3;
use std::sync::Arc;
use tokenizers::Tokenizer;

use super::capabilities::{LanguageModelContext, ModelConfig, TextGenerationModel};
use crate::error::{PipelineError, Result};
use crate::loaders::{self, GenerationConfig};

/// Tokenizer and generation defaults are shared by every Qwen3 size.
const BASE_REPO: &str = "Qwen/Qwen3-0.6B";

/// Available Qwen 3 model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qwen3Size {
    /// 0.6 billion parameters.
    Size0_6B,
    /// 1.7 billion parameters.
    Size1_7B,
    /// 4 billion parameters.
    Size4B,
    /// 8 billion parameters.
    Size8B,
}

impl Qwen3Size {
    pub(crate) fn gguf_file(self) -> (&'static str, &'static str) {
        match self {
            Qwen3Size::Size0_6B => ("unsloth/Qwen3-0.6B-GGUF", "Qwen3-0.6B-Q4_K_M.gguf"),
            Qwen3Size::Size1_7B => ("unsloth/Qwen3-1.7B-GGUF", "Qwen3-1.7B-Q4_K_M.gguf"),
            Qwen3Size::Size4B => ("unsloth/Qwen3-4B-GGUF", "Qwen3-4B-Q4_K_M.gguf"),
            Qwen3Size::Size8B => ("unsloth/Qwen3-8B-GGUF", "Qwen3-8B-Q4_K_M.gguf"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Qwen3Size::Size0_6B => "0.6B",
            Qwen3Size::Size1_7B => "1.7B",
            Qwen3Size::Size4B => "4B",
            Qwen3Size::Size8B => "8B",
        }
    }
}

impl std::fmt::Display for Qwen3Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "qwen3-{}", self.label().to_lowercase())
    }
}

impl std::str::FromStr for Qwen3Size {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "qwen3-0.6b" | "0.6b" => Ok(Qwen3Size::Size0_6B),
            "qwen3-1.7b" | "1.7b" => Ok(Qwen3Size::Size1_7B),
            "qwen3-4b" | "4b" => Ok(Qwen3Size::Size4B),
            "qwen3-8b" | "8b" => Ok(Qwen3Size::Size8B),
            other => Err(PipelineError::InvalidInput(format!(
                "Unknown model '{other}'. Expected one of: qwen3-0.6b, qwen3-1.7b, qwen3-4b, qwen3-8b"
            ))),
        }
    }
}

impl crate::pipelines::cache::ModelOptions for Qwen3Size {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl ModelConfig for Qwen3Size {
    type Model = Qwen3;

    async fn load(self, device: Device) -> Result<Qwen3> {
        Qwen3::from_hf(self, device).await
    }
}

/// Quantized Qwen 3 weights plus tokenizer, used as a plain completion model.
///
/// Only for generic annotations. Use
/// [`TextGenerationPipelineBuilder::qwen3`](crate::text_generation::TextGenerationPipelineBuilder::qwen3).
pub struct Qwen3 {
    size: Qwen3Size,
    weights: Arc<candle_qwen3::ModelWeights>,
    tokenizer: Tokenizer,
    generation_config: GenerationConfig,
    max_seq_len: usize,
    device: Device,
}

impl Qwen3 {
    async fn from_hf(size: Qwen3Size, device: Device) -> Result<Self> {
        let (repo, file) = size.gguf_file();
        tracing::info!(model = %size, repo, "loading generation model");

        let (mut reader, content) = loaders::load_gguf(repo, file).await?;

        let max_seq_len = content
            .metadata
            .get("qwen3.context_length")
            .ok_or_else(|| {
                PipelineError::Unexpected(
                    "Missing 'qwen3.context_length' in Qwen3 model metadata".to_string(),
                )
            })?
            .to_u32()? as usize;

        let weights = candle_qwen3::ModelWeights::from_gguf(content, &mut reader, &device)?;
        let tokenizer = loaders::load_tokenizer(BASE_REPO).await?;
        let generation_config = loaders::load_generation_config(BASE_REPO).await?;

        Ok(Self {
            size,
            weights: Arc::new(weights),
            tokenizer,
            generation_config,
            max_seq_len,
            device,
        })
    }
}

/// KV-cached view over the shared Qwen3 weights.
pub struct Context {
    weights: candle_qwen3::ModelWeights,
    position: usize,
}

impl LanguageModelContext for Context {
    fn forward(&mut self, input: &Tensor) -> candle_core::Result<Tensor> {
        let seq_len = input.dim(1)?;
        let logits = self.weights.forward(input, self.position)?;
        self.position += seq_len;
        Ok(logits)
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl TextGenerationModel for Qwen3 {
    type Context = Context;

    fn display_name(&self) -> String {
        format!("Qwen3 {}", self.size.label())
    }

    fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    fn generation_config(&self) -> &GenerationConfig {
        &self.generation_config
    }

    fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    fn new_context(&self) -> Context {
        // Cloning shares the quantized tensors; only the KV cache is per-context.
        let mut weights = (*self.weights).clone();
        weights.clear_kv_cache();
        Context {
            weights,
            position: 0,
        }
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
