use crate::error::{PipelineError, Result};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Transform applied to every item at the processor stage.
pub type Transform = Arc<dyn Fn(u64) -> u64 + Send + Sync>;

/// Pipeline configuration: set once at startup, read-only afterwards.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Number of producer threads.
    pub producers: usize,
    /// Number of processor threads.
    pub processors: usize,
    /// Number of consumer threads.
    pub consumers: usize,
    /// Items generated by each producer before it finishes. Zero is legal:
    /// the run degenerates to startup and shutdown only.
    pub items_per_producer: u64,
    /// Inclusive range produced values are drawn from.
    pub value_range: RangeInclusive<u64>,
    /// Transform applied at the processor stage.
    pub transform: Transform,
    /// Base RNG seed; producer `i` draws from a stream seeded with
    /// `seed + i`. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Upper bound on how long a processor or consumer waits for a message
    /// before reporting a stall. `None` waits forever (the base behavior).
    pub stall_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    /// Three producers emitting five values each from 1..=100, two
    /// processors doubling every value, three consumers.
    fn default() -> Self {
        Self {
            producers: 3,
            processors: 2,
            consumers: 3,
            items_per_producer: 5,
            value_range: 1..=100,
            transform: Arc::new(|v| v * 2),
            seed: None,
            stall_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Set the thread count of all three stages.
    pub fn with_stages(mut self, producers: usize, processors: usize, consumers: usize) -> Self {
        self.producers = producers;
        self.processors = processors;
        self.consumers = consumers;
        self
    }

    /// Set how many items each producer emits.
    pub fn with_items_per_producer(mut self, items: u64) -> Self {
        self.items_per_producer = items;
        self
    }

    /// Set the inclusive range produced values are drawn from.
    pub fn with_value_range(mut self, range: RangeInclusive<u64>) -> Self {
        self.value_range = range;
        self
    }

    /// Set the processor-stage transform.
    pub fn with_transform(mut self, f: impl Fn(u64) -> u64 + Send + Sync + 'static) -> Self {
        self.transform = Arc::new(f);
        self
    }

    /// Fix the base RNG seed, making producer output reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bound every inter-stage wait, turning a silent hang into a
    /// [`PipelineError::Stalled`].
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    /// Reject configurations the driver cannot run.
    ///
    /// Every stage needs at least one thread. The counts may otherwise
    /// relate in any way: the sentinel broadcast is keyed to the receiving
    /// stage's width, never to the upstream one.
    pub fn validate(&self) -> Result<()> {
        if self.producers == 0 || self.processors == 0 || self.consumers == 0 {
            return Err(PipelineError::ConfigError(
                "every stage needs at least one thread".into(),
            ));
        }
        if self.value_range.is_empty() {
            return Err(PipelineError::ConfigError(format!(
                "empty value range {:?}",
                self.value_range
            )));
        }
        Ok(())
    }

    /// The seed producer streams derive from: the configured one, or the
    /// clock when none was given.
    pub(crate) fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("producers", &self.producers)
            .field("processors", &self.processors)
            .field("consumers", &self.consumers)
            .field("items_per_producer", &self.items_per_producer)
            .field("value_range", &self.value_range)
            .field("seed", &self.seed)
            .field("stall_timeout", &self.stall_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_stage_count_rejected() {
        let config = PipelineConfig::default().with_stages(3, 0, 3);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_value_range_rejected() {
        #[allow(clippy::reversed_empty_ranges)]
        let config = PipelineConfig::default().with_value_range(10..=1);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_items_is_valid() {
        let config = PipelineConfig::default().with_items_per_producer(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chained_setters() {
        let config = PipelineConfig::default()
            .with_stages(1, 4, 2)
            .with_items_per_producer(7)
            .with_value_range(5..=9)
            .with_seed(99)
            .with_stall_timeout(Duration::from_secs(1));

        assert_eq!(config.producers, 1);
        assert_eq!(config.processors, 4);
        assert_eq!(config.consumers, 2);
        assert_eq!(config.items_per_producer, 7);
        assert_eq!(config.value_range, 5..=9);
        assert_eq!(config.base_seed(), 99);
        assert_eq!(config.stall_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_debug_elides_transform() {
        let rendered = format!("{:?}", PipelineConfig::default());
        assert!(rendered.contains("producers: 3"));
        assert!(!rendered.contains("transform"));
    }
}
