#[derive(Debug, Clone, PartialEq)]
pub struct ForwardStats {
    pub batch_size: usize,

    // Timing breakdown, seconds
    pub encode_duration: f64,
    pub heads_duration: f64,
    pub total_duration: f64,

    pub sentences_per_second: f64,
}

impl ForwardStats {
    pub fn new(
        batch_size: usize,
        encode_duration: f64,
        heads_duration: f64,
        total_duration: f64,
    ) -> Self {
        let sentences_per_second = if total_duration > 0.0 {
            batch_size as f64 / total_duration
        } else {
            0.0
        };

        Self {
            batch_size,
            encode_duration,
            heads_duration,
            total_duration,
            sentences_per_second,
        }
    }
}
