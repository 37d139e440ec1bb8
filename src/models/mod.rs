// ============ Model capability traits (crate-internal) ============

pub(crate) mod capabilities;

// ============ Model implementations ============

pub(crate) mod qwen3;

pub use qwen3::{Qwen3, Qwen3Size};
