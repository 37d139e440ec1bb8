#![allow(private_bounds)]

use serde::Serialize;
use std::sync::Arc;

use super::base_pipeline::BasePipeline;
use super::params::GenerationParams;
use crate::error::{PipelineError, Result};
use crate::models::capabilities::TextGenerationModel;
use crate::pipelines::stats::GenerationStats;

// ============ Capability trait ============

/// Per-call generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Total token budget, prompt included.
    pub max_length: usize,
    /// How many independent sequences to sample.
    pub num_return_sequences: usize,
    /// Sampling temperature for this call. `None` keeps the pipeline's setting.
    pub temperature: Option<f64>,
    /// `false` decodes greedily.
    pub do_sample: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_length: 150,
            num_return_sequences: 1,
            temperature: None,
            do_sample: true,
        }
    }
}

/// One generated record. `generated_text` starts with the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSequence {
    /// Prompt followed by the model's continuation.
    pub generated_text: String,
}

/// Anything that can continue a prompt.
///
/// Implemented by [`TextGenerationPipeline`]; implement it yourself to plug another backend (or
/// a stub) into [`PromptComposer`](crate::mood::PromptComposer).
pub trait TextGenerator {
    /// Name shown in reports, e.g. `Qwen3 0.6B`.
    fn model_name(&self) -> String;

    /// Generate `options.num_return_sequences` continuations of `prompt`.
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn model_name(&self) -> String {
        (**self).model_name()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        (**self).generate(prompt, options)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn model_name(&self) -> String {
        (**self).model_name()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        (**self).generate(prompt, options)
    }
}

// ============ Pipeline ============

/// Output of [`TextGenerationPipeline::run`].
#[derive(Debug, Clone)]
pub struct Output {
    /// Generated records, in sampling order.
    pub sequences: Vec<GeneratedSequence>,
    /// Execution statistics.
    pub stats: GenerationStats,
}

/// Raw-completion text generation on a local model.
///
/// Created via [`TextGenerationPipelineBuilder`](super::TextGenerationPipelineBuilder). The
/// underlying model is shared through the process-wide cache; every sequence gets its own KV
/// cache, so a pipeline can be used from several threads.
///
/// # Example
///
/// ```rust,no_run
/// use mood_pipelines::text_generation::{GenerateOptions, Qwen3Size, TextGenerationPipelineBuilder};
///
/// # async fn example() -> mood_pipelines::error::Result<()> {
/// let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
///     .seed(42)
///     .build()
///     .await?;
///
/// let output = pipeline.run("Rust is a", &GenerateOptions::default())?;
/// println!("{}", output.sequences[0].generated_text);
/// # Ok(())
/// # }
/// ```
pub struct TextGenerationPipeline<M: TextGenerationModel> {
    base: BasePipeline<M>,
}

impl<M: TextGenerationModel> TextGenerationPipeline<M> {
    pub(crate) fn new(model: Arc<M>, gen_params: GenerationParams) -> Self {
        Self {
            base: BasePipeline::new(model, gen_params),
        }
    }

    /// Continue `prompt`. Each returned `generated_text` is the decoded prompt plus continuation.
    pub fn run(&self, prompt: &str, options: &GenerateOptions) -> Result<Output> {
        if prompt.is_empty() {
            return Err(PipelineError::InvalidInput(
                "Cannot generate from an empty prompt".into(),
            ));
        }
        if options.num_return_sequences == 0 {
            return Err(PipelineError::InvalidInput(
                "num_return_sequences must be at least 1".into(),
            ));
        }

        let prompt_tokens = self.base.encode(prompt)?;
        let max_new_tokens = options.max_length.saturating_sub(prompt_tokens.len());
        if max_new_tokens == 0 {
            tracing::warn!(
                prompt_tokens = prompt_tokens.len(),
                max_length = options.max_length,
                "prompt fills the whole length budget, nothing will be generated"
            );
        }

        let sampling = self
            .base
            .gen_params
            .sampling(options.temperature, options.do_sample);
        let mut stats = GenerationStats::start(prompt_tokens.len());
        let mut sequences = Vec::with_capacity(options.num_return_sequences);

        for index in 0..options.num_return_sequences {
            let seed = self.base.gen_params.seed.wrapping_add(index as u64);
            let generated =
                self.base
                    .generate_tokens(&prompt_tokens, max_new_tokens, sampling.clone(), seed)?;
            stats.record_sequence(generated.len());

            let mut all_tokens = prompt_tokens.clone();
            all_tokens.extend_from_slice(&generated);
            sequences.push(GeneratedSequence {
                generated_text: self.base.decode(&all_tokens)?,
            });
        }

        stats.finalize();
        tracing::debug!(
            sequences = stats.sequences,
            tokens = stats.tokens_generated,
            tokens_per_second = stats.tokens_per_second,
            "generation finished"
        );

        Ok(Output { sequences, stats })
    }

    /// Sampling parameters in effect for this pipeline.
    pub fn generation_params(&self) -> &GenerationParams {
        &self.base.gen_params
    }

    #[cfg(test)]
    pub(crate) fn model(&self) -> &Arc<M> {
        &self.base.model
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.base.model.device()
    }
}

impl<M: TextGenerationModel> TextGenerator for TextGenerationPipeline<M> {
    fn model_name(&self) -> String {
        self.base.model.display_name()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Vec<GeneratedSequence>> {
        self.run(prompt, options).map(|output| output.sequences)
    }
}
