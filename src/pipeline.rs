use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::queue::BlockingQueue;
use crate::report::PipelineReport;
use crate::stage::{run_consumer, run_processor, run_producer, Message};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread::{spawn, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A validated, runnable producer/processor/consumer pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and wrap it into a runnable pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the pipeline to completion and return its report.
    ///
    /// Spawns every stage thread over two shared queues, then drives the
    /// shutdown protocol: join all producers, broadcast one sentinel per
    /// processor, join all processors, broadcast one sentinel per consumer,
    /// join all consumers. Joining a whole stage before broadcasting means
    /// the sentinels are FIFO-ordered behind every real item, and one
    /// sentinel per receiver means every downstream thread terminates no
    /// matter how the stage widths relate.
    ///
    /// Returns the first worker error, if any. The broadcasts and joins run
    /// unconditionally, so a failed worker never leaves the rest of the
    /// pipeline blocked.
    pub fn run(self) -> Result<PipelineReport> {
        let config = self.config;
        info!("starting pipeline: {:?}", config);
        let start = Instant::now();

        let feed: Arc<BlockingQueue<Message<u64>>> = Arc::new(BlockingQueue::new());
        let sink: Arc<BlockingQueue<Message<u64>>> = Arc::new(BlockingQueue::new());
        let base_seed = config.base_seed();

        // Spawn all three stages up front; processors and consumers block
        // on their empty input queues until items arrive.
        let producers: Vec<JoinHandle<u64>> = (0..config.producers)
            .map(|id| {
                let feed = Arc::clone(&feed);
                let items = config.items_per_producer;
                let range = config.value_range.clone();
                let rng = StdRng::seed_from_u64(base_seed.wrapping_add(id as u64));
                spawn(move || run_producer(id, &feed, items, range, rng))
            })
            .collect();

        let processors: Vec<JoinHandle<Result<u64>>> = (0..config.processors)
            .map(|id| {
                let feed = Arc::clone(&feed);
                let sink = Arc::clone(&sink);
                let transform = Arc::clone(&config.transform);
                let stall_timeout = config.stall_timeout;
                spawn(move || run_processor(id, &feed, &sink, &*transform, stall_timeout))
            })
            .collect();

        let consumers: Vec<JoinHandle<Result<Vec<u64>>>> = (0..config.consumers)
            .map(|id| {
                let sink = Arc::clone(&sink);
                let stall_timeout = config.stall_timeout;
                spawn(move || run_consumer(id, &sink, stall_timeout))
            })
            .collect();

        let mut first_error: Option<PipelineError> = None;

        // Join every producer before any sentinel goes out.
        let mut per_producer = Vec::with_capacity(config.producers);
        for handle in producers {
            match handle.join() {
                Ok(count) => per_producer.push(count),
                Err(_) => record_error(
                    &mut first_error,
                    PipelineError::ThreadError("producer panicked".into()),
                ),
            }
        }
        debug!(
            "producer stage joined, broadcasting {} sentinels",
            config.processors
        );
        for _ in 0..config.processors {
            feed.push(Message::Done);
        }

        // Same discipline for the processor stage.
        let mut transformed = 0u64;
        for handle in processors {
            match handle.join() {
                Ok(Ok(count)) => transformed += count,
                Ok(Err(e)) => record_error(&mut first_error, e),
                Err(_) => record_error(
                    &mut first_error,
                    PipelineError::ThreadError("processor panicked".into()),
                ),
            }
        }
        debug!(
            "processor stage joined, broadcasting {} sentinels",
            config.consumers
        );
        for _ in 0..config.consumers {
            sink.push(Message::Done);
        }

        let mut per_consumer = Vec::with_capacity(config.consumers);
        let mut values = Vec::new();
        for handle in consumers {
            match handle.join() {
                Ok(Ok(mut recorded)) => {
                    per_consumer.push(recorded.len() as u64);
                    values.append(&mut recorded);
                }
                Ok(Err(e)) => record_error(&mut first_error, e),
                Err(_) => record_error(
                    &mut first_error,
                    PipelineError::ThreadError("consumer panicked".into()),
                ),
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        let report = PipelineReport {
            produced: per_producer.iter().sum(),
            transformed,
            consumed: values.len() as u64,
            per_producer,
            per_consumer,
            values,
            elapsed: start.elapsed(),
        };
        info!("pipeline complete: {}", report.format());
        Ok(report)
    }
}

/// Keep the first error for the caller; later ones are logged so they are
/// visible without masking the root cause.
fn record_error(slot: &mut Option<PipelineError>, error: PipelineError) {
    match slot {
        None => *slot = Some(error),
        Some(_) => warn!("further stage error after the first: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PipelineConfig::default().with_stages(0, 2, 3);
        assert!(matches!(
            Pipeline::new(config),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_single_threaded_stages_run_balanced() {
        let config = PipelineConfig::default()
            .with_stages(1, 1, 1)
            .with_items_per_producer(3)
            .with_seed(11);

        let report = Pipeline::new(config).unwrap().run().unwrap();

        assert_eq!(report.produced, 3);
        assert_eq!(report.transformed, 3);
        assert_eq!(report.consumed, 3);
        assert!(report.is_balanced());
    }

    #[test]
    fn test_processor_panic_surfaces_and_run_returns() {
        let config = PipelineConfig::default()
            .with_stages(2, 1, 2)
            .with_items_per_producer(1)
            .with_seed(5)
            .with_transform(|_| panic!("boom"));

        // The panicking processor never consumes its sentinel; the run must
        // still broadcast to the consumers, join everything, and report the
        // failure instead of hanging.
        let result = Pipeline::new(config).unwrap().run();

        match result {
            Err(PipelineError::ThreadError(message)) => {
                assert!(message.contains("processor"));
            }
            other => panic!("expected a processor failure, got {:?}", other),
        }
    }
}
