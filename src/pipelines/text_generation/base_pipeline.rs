use candle_core::Tensor;
use candle_transformers::generation::Sampling;
use std::sync::Arc;

use super::params::{logits_processor, GenerationParams};
use crate::error::{PipelineError, Result};
use crate::models::capabilities::{LanguageModelContext, TextGenerationModel};

/// Token-level generation over a shared model.
pub struct BasePipeline<M: TextGenerationModel> {
    pub model: Arc<M>,
    pub gen_params: GenerationParams,
}

impl<M: TextGenerationModel> BasePipeline<M> {
    pub fn new(model: Arc<M>, gen_params: GenerationParams) -> Self {
        Self { model, gen_params }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .model
            .tokenizer()
            .encode(text, false)
            .map_err(|e| PipelineError::Tokenization(format!("Encode error: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    pub fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.model
            .tokenizer()
            .decode(tokens, true)
            .map_err(|e| PipelineError::Tokenization(format!("Decode error: {e}")))
    }

    /// Sample up to `max_new_tokens` tokens after `prompt_tokens` with a fresh context.
    /// The returned tokens exclude EOS.
    pub fn generate_tokens(
        &self,
        prompt_tokens: &[u32],
        max_new_tokens: usize,
        sampling: Sampling,
        seed: u64,
    ) -> Result<Vec<u32>> {
        if max_new_tokens == 0 {
            return Ok(Vec::new());
        }

        let eos_tokens = self.model.eos_tokens();
        if eos_tokens.is_empty() {
            return Err(PipelineError::Unexpected(
                "No EOS tokens configured for model. Cannot determine when to stop.".to_string(),
            ));
        }

        let device = self.model.device();
        let mut context = self.model.new_context();
        let mut processor = logits_processor(seed, sampling);
        let mut generated: Vec<u32> = Vec::with_capacity(max_new_tokens);

        // Whole prompt in one forward pass, then one token at a time.
        let mut input = Tensor::new(prompt_tokens, device)?.unsqueeze(0)?;
        while generated.len() < max_new_tokens {
            if context.position() >= self.model.max_seq_len() {
                tracing::debug!(position = context.position(), "context window full");
                break;
            }

            let logits = context.forward(&input)?.squeeze(0)?;
            let logits = self.gen_params.penalize(logits, &generated)?;
            let next_token = processor.sample(&logits)?;

            if eos_tokens.contains(&next_token) {
                break;
            }
            generated.push(next_token);
            input = Tensor::new(&[next_token], device)?.unsqueeze(0)?;
        }

        Ok(generated)
    }
}
