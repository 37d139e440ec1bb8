//! Model capability traits.
//!
//! A loaded model is immutable and shared between pipelines through the model cache. All
//! per-generation state (KV cache, position) lives in a [`LanguageModelContext`] created fresh
//! for every sequence.

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::error::Result;
use crate::loaders::GenerationConfig;
use crate::pipelines::cache::ModelOptions;

/// Per-sequence model state.
pub trait LanguageModelContext: Send {
    /// Run the input tokens through the model and return logits for the next token.
    /// Advances the position by the number of input tokens.
    fn forward(&mut self, input: &Tensor) -> candle_core::Result<Tensor>;

    /// Number of tokens processed so far.
    fn position(&self) -> usize;
}

/// A causal language model usable for raw text completion.
pub trait TextGenerationModel: Send + Sync {
    /// The context type returned by [`new_context`](Self::new_context).
    type Context: LanguageModelContext;

    /// Human-readable model name, e.g. `Qwen3 0.6B`.
    fn display_name(&self) -> String;

    fn tokenizer(&self) -> &Tokenizer;

    fn generation_config(&self) -> &GenerationConfig;

    /// Token IDs that terminate generation. Also used as the padding token.
    fn eos_tokens(&self) -> &[u32] {
        &self.generation_config().eos_token_ids
    }

    fn max_seq_len(&self) -> usize;

    /// Fresh context with an empty KV cache.
    fn new_context(&self) -> Self::Context;

    fn device(&self) -> &Device;
}

/// Options that know how to load their model.
#[allow(async_fn_in_trait)]
pub trait ModelConfig: ModelOptions + Clone + Send + Sync + 'static {
    /// The model this configuration loads.
    type Model: TextGenerationModel + 'static;

    /// Download (if needed) and load the model onto `device`.
    async fn load(self, device: Device) -> Result<Self::Model>;
}
