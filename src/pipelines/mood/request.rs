use std::ops::RangeInclusive;

use crate::error::{PipelineError, Result};
use crate::sentiment::SentimentLabel;

/// Message shown when the prompt is empty.
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt to generate text.";

/// Everything needed for one steered generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    original_prompt: String,
    sentiment: SentimentLabel,
    max_length: usize,
    sample_count: usize,
}

impl GenerationRequest {
    /// Allowed values for `max_length`.
    pub const MAX_LENGTH_RANGE: RangeInclusive<usize> = 50..=300;
    /// `max_length` used by [`with_defaults`](Self::with_defaults).
    pub const DEFAULT_MAX_LENGTH: usize = 150;

    /// Validate and build a request.
    ///
    /// Rejects a blank prompt, a `max_length` outside [`MAX_LENGTH_RANGE`](Self::MAX_LENGTH_RANGE)
    /// and a zero `sample_count`.
    pub fn new(
        original_prompt: impl Into<String>,
        sentiment: SentimentLabel,
        max_length: usize,
        sample_count: usize,
    ) -> Result<Self> {
        let original_prompt = original_prompt.into();
        validate(&original_prompt, max_length, sample_count)?;

        Ok(Self {
            original_prompt,
            sentiment,
            max_length,
            sample_count,
        })
    }

    /// Request with the default length and a single sample.
    pub fn with_defaults(
        original_prompt: impl Into<String>,
        sentiment: SentimentLabel,
    ) -> Result<Self> {
        Self::new(original_prompt, sentiment, Self::DEFAULT_MAX_LENGTH, 1)
    }

    /// The user's prompt, unmodified.
    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    /// The mood to steer towards.
    pub fn sentiment(&self) -> SentimentLabel {
        self.sentiment
    }

    /// Total token budget, prompt included.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of sequences to sample.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// Check request fields without building a request.
pub(crate) fn validate(prompt: &str, max_length: usize, sample_count: usize) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(PipelineError::InvalidInput(EMPTY_PROMPT_MESSAGE.into()));
    }
    if !GenerationRequest::MAX_LENGTH_RANGE.contains(&max_length) {
        return Err(PipelineError::InvalidInput(format!(
            "max_length must be between {} and {}, got {max_length}",
            GenerationRequest::MAX_LENGTH_RANGE.start(),
            GenerationRequest::MAX_LENGTH_RANGE.end()
        )));
    }
    if sample_count == 0 {
        return Err(PipelineError::InvalidInput(
            "sample_count must be at least 1".into(),
        ));
    }
    Ok(())
}
