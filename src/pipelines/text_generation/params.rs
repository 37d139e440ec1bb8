use candle_core::Tensor;
use candle_transformers::generation::{LogitsProcessor, Sampling};

use crate::loaders::GenerationConfig;

use candle_transformers::utils::apply_repeat_penalty;

/// User overrides for sampling parameters.
/// Only set fields override the model's `generation_config.json` defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationOverrides {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<usize>,
    pub repeat_penalty: Option<f32>,
    pub repeat_last_n: Option<usize>,
    pub seed: Option<u64>,
}

/// Resolved sampling parameters for a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Randomness of sampling. 0.0 = deterministic, higher = more random.
    pub temperature: f64,
    /// Nucleus sampling: only consider tokens with cumulative probability <= p.
    pub top_p: Option<f64>,
    /// Only consider the top k most likely tokens.
    pub top_k: Option<usize>,
    /// Penalty for repeating tokens. 1.0 = no penalty, higher = less repetition.
    pub repeat_penalty: f32,
    /// Number of recent tokens to consider for repeat penalty.
    pub repeat_last_n: usize,
    /// Base seed. Sequence `i` of a call is sampled with `seed + i`.
    pub seed: u64,
}

impl GenerationParams {
    /// Merge model defaults with user overrides.
    pub(crate) fn resolve(config: &GenerationConfig, overrides: &GenerationOverrides) -> Self {
        Self {
            temperature: overrides.temperature.or(config.temperature).unwrap_or(1.0),
            top_p: overrides.top_p.or(config.top_p),
            top_k: overrides.top_k.or(config.top_k.map(|k| k as usize)),
            repeat_penalty: overrides
                .repeat_penalty
                .or(config.repeat_penalty)
                .unwrap_or(1.0),
            repeat_last_n: overrides.repeat_last_n.unwrap_or(64),
            seed: overrides.seed.unwrap_or_else(rand::random),
        }
    }

    /// Sampling strategy for one call. `temperature` replaces the pipeline default when set;
    /// `do_sample = false` forces greedy decoding.
    pub(crate) fn sampling(&self, temperature: Option<f64>, do_sample: bool) -> Sampling {
        let temperature = temperature.unwrap_or(self.temperature);
        if !do_sample || temperature <= 0.0 {
            return Sampling::ArgMax;
        }

        let top_k = self.top_k.unwrap_or(0);
        let top_p = self.top_p.unwrap_or(1.0);

        match (top_k > 0, top_p < 1.0) {
            (true, true) => Sampling::TopKThenTopP {
                k: top_k,
                p: top_p,
                temperature,
            },
            (true, false) => Sampling::TopK {
                k: top_k,
                temperature,
            },
            (false, true) => Sampling::TopP {
                p: top_p,
                temperature,
            },
            (false, false) => Sampling::All { temperature },
        }
    }

    pub(crate) fn penalize(&self, logits: Tensor, generated: &[u32]) -> candle_core::Result<Tensor> {
        let start_at = generated.len().saturating_sub(self.repeat_last_n);
        let context = &generated[start_at..];
        if self.repeat_penalty <= 1.0 || context.is_empty() {
            return Ok(logits);
        }
        apply_repeat_penalty(&logits, self.repeat_penalty, context)
    }
}

pub(crate) fn logits_processor(seed: u64, sampling: Sampling) -> LogitsProcessor {
    LogitsProcessor::from_sampling(seed, sampling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.6),
            top_p: Some(0.95),
            top_k: Some(20),
            repeat_penalty: None,
            eos_token_ids: vec![0],
        }
    }

    #[test]
    fn overrides_win_over_model_defaults() {
        let overrides = GenerationOverrides {
            temperature: Some(0.9),
            seed: Some(42),
            ..Default::default()
        };
        let params = GenerationParams::resolve(&config(), &overrides);
        assert_eq!(params.temperature, 0.9);
        assert_eq!(params.top_k, Some(20));
        assert_eq!(params.repeat_penalty, 1.0);
        assert_eq!(params.seed, 42);
    }

    #[test]
    fn greedy_when_sampling_disabled() {
        let params = GenerationParams::resolve(&config(), &GenerationOverrides::default());
        assert!(matches!(params.sampling(Some(0.9), false), Sampling::ArgMax));
        assert!(matches!(params.sampling(Some(0.0), true), Sampling::ArgMax));
    }

    #[test]
    fn call_temperature_replaces_default() {
        let params = GenerationParams::resolve(&config(), &GenerationOverrides::default());
        match params.sampling(Some(0.9), true) {
            Sampling::TopKThenTopP { k, p, temperature } => {
                assert_eq!(k, 20);
                assert_eq!(p, 0.95);
                assert_eq!(temperature, 0.9);
            }
            other => panic!("unexpected sampling {other:?}"),
        }
    }

    #[test]
    fn plain_temperature_without_filters() {
        let bare = GenerationConfig::default();
        let params = GenerationParams::resolve(&bare, &GenerationOverrides::default());
        assert!(matches!(
            params.sampling(None, true),
            Sampling::All { temperature } if temperature == 1.0
        ));
    }
}
