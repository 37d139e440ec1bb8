//! Sentiment-steered generation.
//!
//! [`PromptComposer`] prepends a steering prefix such as
//! `The overall mood should be **positive**. ` to the prompt, runs a [`TextGenerator`] and cuts
//! the prefix and the echoed prompt back out of the result. [`MoodSession`] adds input
//! validation and optional sentiment detection in front of it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mood_pipelines::config::Settings;
//! use mood_pipelines::mood::{MoodSession, PromptComposer, SessionInput};
//! use mood_pipelines::sentiment::{InferenceApiClassifier, SentimentResolver};
//! use mood_pipelines::text_generation::{Qwen3Size, TextGenerationPipelineBuilder};
//!
//! # async fn example() -> mood_pipelines::error::Result<()> {
//! let settings = Settings::default();
//! let resolver = SentimentResolver::new(
//!     InferenceApiClassifier::from_settings(&settings)?,
//!     settings.api_key().map(str::to_owned),
//! );
//! let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
//!     .seed(settings.seed)
//!     .build()
//!     .await?;
//!
//! let session = MoodSession::new(resolver, PromptComposer::new(pipeline));
//! let report = session.run(&SessionInput::default()).await?;
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```
//!
//! [`TextGenerator`]: crate::text_generation::TextGenerator

// ============ Internal API ============

pub(crate) mod composer;
pub(crate) mod request;
pub(crate) mod session;

// ============ Public API ============

pub use composer::{clean_output, full_prompt, steering_prefix, PromptComposer, DEFAULT_TEMPERATURE};
pub use request::{GenerationRequest, EMPTY_PROMPT_MESSAGE};
pub use session::{MoodReport, MoodSession, SentimentSource, SessionInput, DEFAULT_PROMPT};
