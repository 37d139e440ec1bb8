use serde::Serialize;

use super::composer::PromptComposer;
use super::request::{self, GenerationRequest};
use crate::error::Result;
use crate::sentiment::{
    ResolveWarning, SentimentChoice, SentimentClassifier, SentimentLabel, SentimentResolver,
};
use crate::text_generation::TextGenerator;

/// Prompt pre-filled when the user gives none.
pub const DEFAULT_PROMPT: &str = "The new advancements in AI are truly astonishing.";

/// One user interaction: the prompt plus generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInput {
    /// Free-text prompt.
    pub prompt: String,
    /// Auto-detect the sentiment or use a fixed one.
    pub choice: SentimentChoice,
    /// Total token budget, within [`GenerationRequest::MAX_LENGTH_RANGE`].
    pub max_length: usize,
    /// Sequences to sample; only the first is shown.
    pub sample_count: usize,
}

impl Default for SessionInput {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            choice: SentimentChoice::AutoDetect,
            max_length: GenerationRequest::DEFAULT_MAX_LENGTH,
            sample_count: 1,
        }
    }
}

impl SessionInput {
    /// Check the prompt, length and sample count without running anything.
    ///
    /// [`MoodSession::run`] does this itself; call it earlier to fail before loading a model.
    pub fn validate(&self) -> Result<()> {
        request::validate(&self.prompt, self.max_length, self.sample_count)
    }
}

/// Where the report's sentiment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentSource {
    /// Resolved from the prompt by the classifier (or its fallback).
    Detected,
    /// Picked by the user.
    Selected,
}

/// Everything shown to the user after one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodReport {
    /// Sentiment the text was steered towards.
    pub sentiment: SentimentLabel,
    /// Whether the sentiment was detected or selected.
    pub source: SentimentSource,
    /// Fallback warning from detection, if any.
    pub warning: Option<ResolveWarning>,
    /// The cleaned generated text.
    pub text: String,
    /// The prompt as the user entered it.
    pub seed_prompt: String,
    /// Name of the generation model.
    pub model_name: String,
}

impl MoodReport {
    /// Status panel line, e.g. `Detected Sentiment: **POSITIVE**`.
    pub fn status_line(&self) -> String {
        let source = match self.source {
            SentimentSource::Detected => "Detected",
            SentimentSource::Selected => "Selected",
        };
        format!(
            "{source} Sentiment: **{}**",
            self.sentiment.as_str().to_uppercase()
        )
    }

    /// Plain-text rendering of the status, output and metadata panels.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(warning) = &self.warning {
            out.push_str(&format!("Warning: {warning}\n\n"));
        }
        out.push_str(&self.status_line());
        out.push_str("\n\n--- Generated Text ---\n");
        out.push_str(&self.text);
        out.push_str("\n\n--- Details ---\n");
        out.push_str(&format!("Seed Prompt: {}\n", self.seed_prompt));
        out.push_str(&format!("Generation Model: {}\n", self.model_name));
        out
    }
}

/// Wires sentiment detection into steered generation for one request at a time.
///
/// Input is validated before anything else runs. With
/// [`SentimentChoice::AutoDetect`] the resolver picks the label; a fixed choice skips the
/// classifier entirely. Generation errors are returned to the caller.
pub struct MoodSession<C, G> {
    resolver: SentimentResolver<C>,
    composer: PromptComposer<G>,
}

impl<C: SentimentClassifier, G: TextGenerator> MoodSession<C, G> {
    /// Session from a resolver and a composer.
    pub fn new(resolver: SentimentResolver<C>, composer: PromptComposer<G>) -> Self {
        Self { resolver, composer }
    }

    /// Run one interaction.
    pub async fn run(&self, input: &SessionInput) -> Result<MoodReport> {
        input.validate()?;

        let (sentiment, source, warning) = match input.choice {
            SentimentChoice::AutoDetect => {
                let resolution = self.resolver.resolve(&input.prompt).await;
                (resolution.label, SentimentSource::Detected, resolution.warning)
            }
            SentimentChoice::Fixed(label) => (label, SentimentSource::Selected, None),
        };
        tracing::info!(%sentiment, ?source, "sentiment chosen");

        let request = GenerationRequest::new(
            input.prompt.clone(),
            sentiment,
            input.max_length,
            input.sample_count,
        )?;
        let text = self.composer.compose(request)?;

        Ok(MoodReport {
            sentiment,
            source,
            warning,
            text,
            seed_prompt: input.prompt.clone(),
            model_name: self.composer.generator().model_name(),
        })
    }
}
