//! Text generation pipeline for local LLMs.
//!
//! Plain prompt completion: the prompt is fed to the model as-is (no chat template) and every
//! returned record contains the prompt followed by the model's continuation, the same shape
//! HuggingFace's `text-generation` pipeline returns.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mood_pipelines::text_generation::{GenerateOptions, Qwen3Size, TextGenerationPipelineBuilder};
//!
//! # async fn example() -> mood_pipelines::error::Result<()> {
//! let pipeline = TextGenerationPipelineBuilder::qwen3(Qwen3Size::Size0_6B)
//!     .temperature(0.9)
//!     .build()
//!     .await?;
//!
//! let options = GenerateOptions {
//!     max_length: 150,
//!     num_return_sequences: 2,
//!     ..Default::default()
//! };
//! let output = pipeline.run("Once upon a time", &options)?;
//! for sequence in &output.sequences {
//!     println!("{}", sequence.generated_text);
//! }
//! println!("{} tokens in {:.2}s", output.stats.tokens_generated, output.stats.total_time.as_secs_f64());
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Sizes | Builder Method |
//! |-------|-------|----------------|
//! | Qwen3 | `0.6B`, `1.7B`, `4B`, `8B` | [`TextGenerationPipelineBuilder::qwen3`] |

// ============ Internal API ============

pub(crate) mod base_pipeline;
pub(crate) mod builder;
pub(crate) mod params;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{Qwen3, Qwen3Size};
pub use crate::pipelines::stats::GenerationStats;
pub use builder::TextGenerationPipelineBuilder;
pub use params::GenerationParams;
pub use pipeline::{GenerateOptions, GeneratedSequence, Output, TextGenerationPipeline, TextGenerator};
