use serde::Serialize;
use std::time::{Duration, Instant};

/// Statistics for one text generation call (all returned sequences).
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStats {
    /// Number of tokens in the prompt.
    pub prompt_tokens: usize,
    /// Number of tokens generated across all sequences.
    pub tokens_generated: usize,
    /// Number of sequences produced.
    pub sequences: usize,
    /// Total generation time.
    #[serde(serialize_with = "serialize_millis", rename = "total_time_ms")]
    pub total_time: Duration,
    /// Throughput in tokens per second.
    pub tokens_per_second: f64,
    #[serde(skip)]
    start_time: Instant,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl GenerationStats {
    pub(crate) fn start(prompt_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            tokens_generated: 0,
            sequences: 0,
            total_time: Duration::default(),
            tokens_per_second: 0.0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn record_sequence(&mut self, tokens: usize) {
        self.sequences += 1;
        self.tokens_generated += tokens;
    }

    pub(crate) fn finalize(&mut self) {
        self.total_time = self.start_time.elapsed();
        let secs = self.total_time.as_secs_f64();
        self.tokens_per_second = if secs > 0.0 {
            self.tokens_generated as f64 / secs
        } else {
            0.0
        };
    }

    #[cfg(test)]
    pub(crate) fn override_start(&mut self, start_time: Instant) {
        self.start_time = start_time;
    }
}
