use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::model::{ClassifierError, Prediction, SentimentClassifier};
use crate::config::Settings;
use crate::error::{PipelineError, Result};

const MAX_ERROR_BODY: usize = 200;

/// Sentiment classifier behind the HuggingFace Inference API.
///
/// Sends `{"inputs": text}` with a bearer token and reads the first entry of the first list in
/// the `[[{"label": ..., "score": ...}, ...]]` response.
#[derive(Debug, Clone)]
pub struct InferenceApiClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl InferenceApiClassifier {
    /// Classifier for `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Unexpected(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Classifier configured from [`Settings`].
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.sentiment_endpoint.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SentimentClassifier for InferenceApiClassifier {
    async fn classify(
        &self,
        text: &str,
        api_key: &str,
    ) -> std::result::Result<Prediction, ClassifierError> {
        tracing::debug!(endpoint = %self.endpoint, chars = text.len(), "classifying sentiment");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            tracing::debug!(?status, %body, "sentiment endpoint returned error");
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

#[derive(Deserialize)]
struct RawPrediction {
    label: String,
    score: f32,
}

pub(crate) fn parse_response(body: &str) -> std::result::Result<Prediction, ClassifierError> {
    let batches: Vec<Vec<RawPrediction>> = serde_json::from_str(body)
        .map_err(|e| ClassifierError::Malformed(format!("unexpected response body: {e}")))?;

    let top = batches
        .into_iter()
        .next()
        .and_then(|predictions| predictions.into_iter().next())
        .ok_or_else(|| ClassifierError::Malformed("response contained no predictions".into()))?;

    if !(0.0..=1.0).contains(&top.score) {
        return Err(ClassifierError::Malformed(format!(
            "score {} is outside [0, 1]",
            top.score
        )));
    }

    Ok(Prediction {
        label: top.label,
        score: top.score,
    })
}
