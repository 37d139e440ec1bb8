use super::request::GenerationRequest;
use crate::error::{PipelineError, Result};
use crate::sentiment::SentimentLabel;
use crate::text_generation::{GenerateOptions, TextGenerator};

/// Default sampling temperature for steered generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.9;

/// The instruction prepended to the prompt: `The overall mood should be **{sentiment}**. `
pub fn steering_prefix(sentiment: SentimentLabel) -> String {
    format!("The overall mood should be **{sentiment}**. ")
}

/// Steering prefix followed by the prompt, exactly as sent to the model.
pub fn full_prompt(prompt: &str, sentiment: SentimentLabel) -> String {
    steering_prefix(sentiment) + prompt
}

/// Strip the steering prefix and the echoed prompt from raw model output.
///
/// Everything up to the first occurrence of `prefix` is dropped, then everything up to the first
/// occurrence of `prompt` in what remains; each cut is trimmed. Output that does not contain the
/// prefix is returned unchanged.
pub fn clean_output(raw: &str, prefix: &str, prompt: &str) -> String {
    let Some((_, after_prefix)) = raw.split_once(prefix) else {
        return raw.to_string();
    };
    let after_prefix = after_prefix.trim();

    match after_prefix.split_once(prompt) {
        Some((_, continuation)) if !prompt.is_empty() => continuation.trim().to_string(),
        _ => after_prefix.to_string(),
    }
}

/// Builds the steered prompt, runs the generator and cleans the result.
///
/// Generator errors are returned as-is; nothing is retried.
///
/// # Example
///
/// ```rust,no_run
/// use mood_pipelines::mood::{GenerationRequest, PromptComposer};
/// use mood_pipelines::sentiment::SentimentLabel;
/// use mood_pipelines::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};
///
/// # async fn example() -> mood_pipelines::error::Result<()> {
/// let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B).build().await?;
/// let composer = PromptComposer::new(pipeline);
///
/// let request = GenerationRequest::with_defaults("Tell me about cats.", SentimentLabel::Positive)?;
/// println!("{}", composer.compose(request)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PromptComposer<G> {
    generator: G,
    temperature: f64,
}

impl<G: TextGenerator> PromptComposer<G> {
    /// Composer around `generator`, sampling at [`DEFAULT_TEMPERATURE`].
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Override the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// The wrapped generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate mood-aligned text for `request`.
    pub fn compose(&self, request: GenerationRequest) -> Result<String> {
        let prefix = steering_prefix(request.sentiment());
        let prompt = full_prompt(request.original_prompt(), request.sentiment());

        let options = GenerateOptions {
            max_length: request.max_length(),
            num_return_sequences: request.sample_count(),
            temperature: Some(self.temperature),
            do_sample: true,
        };

        tracing::debug!(
            sentiment = %request.sentiment(),
            max_length = options.max_length,
            samples = options.num_return_sequences,
            "composing"
        );
        let sequences = self.generator.generate(&prompt, &options)?;
        let first = sequences.into_iter().next().ok_or_else(|| {
            PipelineError::Generation("model returned no sequences".to_string())
        })?;

        Ok(clean_output(
            &first.generated_text,
            &prefix,
            request.original_prompt(),
        ))
    }
}
