use serde::Serialize;

use super::label::SentimentLabel;
use super::model::{ClassifierError, SentimentClassifier};

/// Default minimum score for trusting a classifier label.
pub const DEFAULT_CONFIDENCE_FLOOR: f32 = 0.75;

/// Non-fatal problem that forced the `neutral` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ResolveWarning {
    /// No API key configured; the classifier was not called.
    MissingCredential,
    /// The request failed or the endpoint returned a non-2xx status.
    RequestFailed(String),
    /// The endpoint answered with something that is not a usable prediction.
    MalformedResponse(String),
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveWarning::MissingCredential => write!(
                f,
                "{} not found in settings. Using 'neutral' fallback.",
                crate::config::API_KEY_ENV
            ),
            ResolveWarning::RequestFailed(reason) => {
                write!(f, "API request failed: {reason}. Using 'neutral' fallback.")
            }
            ResolveWarning::MalformedResponse(reason) => write!(
                f,
                "Unexpected API response: {reason}. Using 'neutral' fallback."
            ),
        }
    }
}

impl From<ClassifierError> for ResolveWarning {
    fn from(error: ClassifierError) -> Self {
        match error {
            ClassifierError::Transport(_) | ClassifierError::Status { .. } => {
                ResolveWarning::RequestFailed(error.to_string())
            }
            ClassifierError::Malformed(reason) => ResolveWarning::MalformedResponse(reason),
        }
    }
}

/// Outcome of [`SentimentResolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The label to steer generation with.
    pub label: SentimentLabel,
    /// Set when resolution fell back to `neutral` because of a failure.
    pub warning: Option<ResolveWarning>,
}

impl Resolution {
    fn detected(label: SentimentLabel) -> Self {
        Self {
            label,
            warning: None,
        }
    }

    fn fallback(warning: ResolveWarning) -> Self {
        tracing::debug!(%warning, "sentiment detection fell back to neutral");
        Self {
            label: SentimentLabel::Neutral,
            warning: Some(warning),
        }
    }
}

/// Turns free text into a [`SentimentLabel`] using a classifier and a confidence floor.
///
/// Resolution never fails: a missing API key or any classifier failure yields
/// [`SentimentLabel::Neutral`] together with a single [`ResolveWarning`]. A prediction whose
/// score is below the confidence floor is also treated as neutral, without a warning.
///
/// # Example
///
/// ```rust,no_run
/// use mood_pipelines::sentiment::{InferenceApiClassifier, SentimentResolver};
/// use mood_pipelines::config::Settings;
///
/// # async fn example() -> mood_pipelines::error::Result<()> {
/// let settings = Settings::default();
/// let classifier = InferenceApiClassifier::from_settings(&settings)?;
/// let resolver = SentimentResolver::new(classifier, std::env::var("HUGGINGFACE_API_KEY").ok());
///
/// let resolution = resolver.resolve("What a fantastic day!").await;
/// if let Some(warning) = &resolution.warning {
///     eprintln!("{warning}");
/// }
/// println!("{}", resolution.label);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SentimentResolver<C> {
    classifier: C,
    api_key: Option<String>,
    confidence_floor: f32,
}

impl<C: SentimentClassifier> SentimentResolver<C> {
    /// Resolver using `classifier`. A `None` or blank key disables remote calls.
    pub fn new(classifier: C, api_key: Option<String>) -> Self {
        Self {
            classifier,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }

    /// Set the minimum score required to keep a classifier label.
    ///
    /// Values are clamped to `[0, 1]`; NaN keeps [`DEFAULT_CONFIDENCE_FLOOR`].
    pub fn confidence_floor(mut self, floor: f32) -> Self {
        self.confidence_floor = if floor.is_nan() {
            DEFAULT_CONFIDENCE_FLOOR
        } else {
            floor.clamp(0.0, 1.0)
        };
        self
    }

    /// Resolve the sentiment of `text`.
    pub async fn resolve(&self, text: &str) -> Resolution {
        let Some(api_key) = self.api_key.as_deref() else {
            return Resolution::fallback(ResolveWarning::MissingCredential);
        };

        let prediction = match self.classifier.classify(text, api_key).await {
            Ok(prediction) => prediction,
            Err(e) => return Resolution::fallback(e.into()),
        };

        tracing::debug!(label = %prediction.label, score = prediction.score, "classifier prediction");

        if prediction.score < self.confidence_floor {
            return Resolution::detected(SentimentLabel::Neutral);
        }

        match SentimentLabel::from_classifier_label(&prediction.label) {
            Some(label) => Resolution::detected(label),
            None => Resolution::fallback(ResolveWarning::MalformedResponse(format!(
                "unknown label '{}'",
                prediction.label
            ))),
        }
    }
}
