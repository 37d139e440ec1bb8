use thiserror::Error;

/// Raw classifier output: the top label and its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Label as the classifier spells it (e.g. `POS`, `NEG`, `NEU`).
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Why a classification attempt failed.
///
/// Never escapes [`SentimentResolver`](super::SentimentResolver); it only decides which
/// warning is shown.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The request never produced a response (connect error, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("{status} {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response did not have the expected `[[{label, score}]]` shape.
    #[error("{0}")]
    Malformed(String),
}

/// A sentiment classification capability, typically a remote inference endpoint.
#[allow(async_fn_in_trait)]
pub trait SentimentClassifier {
    /// Classify `text`, authenticating with `api_key`.
    async fn classify(&self, text: &str, api_key: &str) -> Result<Prediction, ClassifierError>;
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for &T {
    async fn classify(&self, text: &str, api_key: &str) -> Result<Prediction, ClassifierError> {
        (**self).classify(text, api_key).await
    }
}
