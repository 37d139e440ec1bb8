//! Sentiment-steered text generation.
//!
//! Detect the mood of a prompt with a remote sentiment classifier, then let a local
//! [Candle](https://github.com/huggingface/candle) LLM continue the prompt in that mood.
//!
//! - [`sentiment`]: remote classification with a confidence floor and a `neutral` fallback.
//! - [`text_generation`]: local raw-completion pipeline, models cached for the process lifetime.
//! - [`mood`]: the steering prefix, output cleaning, and the end-to-end session.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod config;
pub mod error;

pub use pipelines::{mood, sentiment, text_generation};
