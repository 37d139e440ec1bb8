#![allow(private_bounds)]

use super::params::{GenerationOverrides, GenerationParams};
use super::pipeline::TextGenerationPipeline;
use crate::error::Result;
use crate::models::capabilities::{ModelConfig, TextGenerationModel};
use crate::models::Qwen3Size;
use crate::pipelines::cache::global_cache;
use crate::pipelines::utils::{build_cache_key, DeviceRequest};

/// Builder for constructing [`TextGenerationPipeline`] instances.
///
/// # Example
///
/// ```rust,no_run
/// use mood_pipelines::text_generation::{TextGenerationPipelineBuilder, Qwen3Size};
///
/// # async fn example() -> mood_pipelines::error::Result<()> {
/// let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
///     .temperature(0.9)
///     .seed(42)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TextGenerationPipelineBuilder<C: ModelConfig> {
    config: C,
    overrides: GenerationOverrides,
    device_request: DeviceRequest,
}

impl<C: ModelConfig> TextGenerationPipelineBuilder<C> {
    /// Create a builder with the given model configuration.
    pub fn new(config: C) -> Self {
        Self {
            config,
            overrides: GenerationOverrides::default(),
            device_request: DeviceRequest::Cpu,
        }
    }

    /// Set sampling temperature. 0.0 = deterministic, higher = more random.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.overrides.temperature = Some(temperature);
        self
    }

    /// Set penalty for repeating tokens. 1.0 = no penalty.
    pub fn repeat_penalty(mut self, repeat_penalty: f32) -> Self {
        self.overrides.repeat_penalty = Some(repeat_penalty);
        self
    }

    /// Set how many recent tokens to consider for repeat penalty.
    pub fn repeat_last_n(mut self, repeat_last_n: usize) -> Self {
        self.overrides.repeat_last_n = Some(repeat_last_n);
        self
    }

    /// Set random seed for reproducible generation.
    pub fn seed(mut self, seed: u64) -> Self {
        self.overrides.seed = Some(seed);
        self
    }

    /// Set nucleus sampling threshold (0.0-1.0).
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.overrides.top_p = Some(top_p.clamp(0.0, 1.0));
        self
    }

    /// Only sample from the top k most likely tokens.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.overrides.top_k = Some(top_k);
        self
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Build the pipeline, downloading and loading the model on first use.
    ///
    /// Later builds for the same model and device reuse the cached weights.
    pub async fn build(self) -> Result<TextGenerationPipeline<C::Model>> {
        let device = self.device_request.resolve()?;
        let cache_key = build_cache_key(&self.config, &device);

        let config = self.config;
        let model = global_cache()
            .get_or_create_async(&cache_key, || config.load(device))
            .await?;

        let gen_params = GenerationParams::resolve(model.generation_config(), &self.overrides);

        Ok(TextGenerationPipeline::new(model, gen_params))
    }
}

impl TextGenerationPipelineBuilder<Qwen3Size> {
    /// Create a builder for a Qwen 3 model.
    pub fn qwen3(size: Qwen3Size) -> Self {
        Self::new(size)
    }
}
