//! Sentiment detection.
//!
//! Classify a prompt as `positive`, `negative`, or `neutral` with a remote classifier, falling
//! back to `neutral` whenever the answer is unavailable or not confident enough.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mood_pipelines::config::Settings;
//! use mood_pipelines::sentiment::{InferenceApiClassifier, SentimentResolver};
//!
//! # async fn example() -> mood_pipelines::error::Result<()> {
//! let settings = Settings::default();
//! let resolver = SentimentResolver::new(
//!     InferenceApiClassifier::from_settings(&settings)?,
//!     settings.api_key().map(str::to_owned),
//! )
//! .confidence_floor(settings.confidence_floor);
//!
//! let resolution = resolver.resolve("I absolutely love this product!").await;
//! println!("sentiment: {}", resolution.label);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Classifiers
//!
//! Anything implementing [`SentimentClassifier`] can stand in for the Inference API, which is
//! how the tests exercise the fallback rules without a network.

// ============ Internal API ============

pub(crate) mod label;
pub(crate) mod model;
pub(crate) mod remote;
pub(crate) mod resolver;

// ============ Public API ============

pub use label::{SentimentChoice, SentimentLabel};
pub use model::{ClassifierError, Prediction, SentimentClassifier};
pub use remote::InferenceApiClassifier;
pub use resolver::{Resolution, ResolveWarning, SentimentResolver, DEFAULT_CONFIDENCE_FLOOR};
