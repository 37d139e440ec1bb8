pub(crate) mod cache;
pub(crate) mod stats;
pub(crate) mod utils;

pub mod mood;
pub mod sentiment;
pub mod text_generation;
