use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The mood a generation is steered towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Upbeat, favorable tone.
    Positive,
    /// Critical, unfavorable tone.
    Negative,
    /// No strong polarity. Also the fallback label.
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Every label, in display order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Lower-case name, as used in the steering prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    /// Map a classifier label (`POS`, `negative`, `Neu`, ...) onto the closed label set.
    pub fn from_classifier_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "pos" | "positive" => Some(SentimentLabel::Positive),
            "neg" | "negative" => Some(SentimentLabel::Negative),
            "neu" | "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SentimentLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                PipelineError::InvalidInput(format!(
                    "Unknown sentiment '{s}'. Expected positive, negative or neutral"
                ))
            })
    }
}

/// Whether the sentiment is detected from the prompt or picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentimentChoice {
    /// Ask the remote classifier.
    #[default]
    AutoDetect,
    /// Use this label and skip detection.
    Fixed(SentimentLabel),
}

impl std::fmt::Display for SentimentChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentChoice::AutoDetect => f.write_str("Auto-Detect"),
            SentimentChoice::Fixed(label) => label.fmt(f),
        }
    }
}

impl std::str::FromStr for SentimentChoice {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "auto-detect" | "autodetect" => Ok(SentimentChoice::AutoDetect),
            other => other.parse().map(SentimentChoice::Fixed),
        }
    }
}
