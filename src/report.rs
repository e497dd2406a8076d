use std::time::Duration;

/// Accounting for one completed pipeline run, assembled by the driver from
/// the values its stage threads returned.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Items emitted by the producer stage.
    pub produced: u64,
    /// Items transformed by the processor stage.
    pub transformed: u64,
    /// Items that reached a consumer.
    pub consumed: u64,
    /// Items emitted by each producer thread.
    pub per_producer: Vec<u64>,
    /// Items recorded by each consumer thread.
    pub per_consumer: Vec<u64>,
    /// Every consumed value. Order within one consumer follows the sink
    /// queue; the interleaving across consumers is unspecified.
    pub values: Vec<u64>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// `true` when every produced item was transformed and consumed.
    pub fn is_balanced(&self) -> bool {
        self.produced == self.transformed && self.transformed == self.consumed
    }

    /// End-to-end throughput in items per second.
    pub fn throughput_ips(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.consumed as f64 / secs
        }
    }

    /// Format the report as a human-readable string.
    pub fn format(&self) -> String {
        format!(
            "Produced: {}, Transformed: {}, Consumed: {}, Throughput: {:.2} items/s, Elapsed: {:.3}s",
            self.produced,
            self.transformed,
            self.consumed,
            self.throughput_ips(),
            self.elapsed.as_secs_f64()
        )
    }
}
