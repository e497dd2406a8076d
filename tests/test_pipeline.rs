use conveyor::{Pipeline, PipelineConfig, PipelineReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Replay the producer RNG streams to recover exactly what a seeded run
/// must have emitted.
fn replay_producers(
    seed: u64,
    producers: usize,
    items: u64,
    range: RangeInclusive<u64>,
) -> Vec<u64> {
    let mut values = Vec::new();
    for id in 0..producers {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(id as u64));
        for _ in 0..items {
            values.push(rng.gen_range(range.clone()));
        }
    }
    values
}

fn run(config: PipelineConfig) -> PipelineReport {
    Pipeline::new(config)
        .expect("Pipeline build failed")
        .run()
        .expect("Pipeline run failed")
}

#[test]
fn test_default_scenario_consumes_fifteen_doubled_values() {
    let report = run(PipelineConfig::default().with_seed(42));

    assert_eq!(report.produced, 15);
    assert_eq!(report.transformed, 15);
    assert_eq!(report.consumed, 15);
    assert!(report.is_balanced());
    assert_eq!(report.per_producer, vec![5, 5, 5]);
    assert_eq!(report.per_consumer.len(), 3);
    assert_eq!(report.per_consumer.iter().sum::<u64>(), 15);

    assert_eq!(report.values.len(), 15);
    for value in &report.values {
        // Doubled values from 1..=100 are even and within 2..=200.
        assert_eq!(value % 2, 0);
        assert!((2..=200).contains(value));
    }
}

#[test]
fn test_fixed_range_makes_output_fully_predictable() {
    let config = PipelineConfig::default()
        .with_value_range(7..=7)
        .with_seed(1);

    let report = run(config);

    assert_eq!(report.consumed, 15);
    assert!(report.values.iter().all(|&v| v == 14));
}

#[test]
fn test_seeded_run_conserves_the_exact_multiset() {
    let seed = 2024;
    let config = PipelineConfig::default()
        .with_stages(3, 2, 3)
        .with_items_per_producer(50)
        .with_value_range(1..=1000)
        .with_seed(seed);

    let report = run(config);

    let mut expected: Vec<u64> = replay_producers(seed, 3, 50, 1..=1000)
        .into_iter()
        .map(|v| v * 2)
        .collect();
    expected.sort_unstable();

    let mut actual = report.values.clone();
    actual.sort_unstable();

    assert_eq!(actual, expected);
}

#[test]
fn test_fewer_producers_than_processors() {
    let config = PipelineConfig::default()
        .with_stages(1, 4, 2)
        .with_items_per_producer(20)
        .with_seed(3);

    let report = run(config);

    assert_eq!(report.consumed, 20);
    assert!(report.is_balanced());
    assert_eq!(report.per_consumer.len(), 2);
}

#[test]
fn test_more_processors_than_consumers() {
    let config = PipelineConfig::default()
        .with_stages(4, 3, 1)
        .with_items_per_producer(25)
        .with_seed(4);

    let report = run(config);

    assert_eq!(report.consumed, 100);
    assert!(report.is_balanced());
    // The single consumer drains everything, then its one sentinel.
    assert_eq!(report.per_consumer, vec![100]);
}

#[test]
fn test_zero_items_shuts_down_cleanly() {
    let config = PipelineConfig::default().with_items_per_producer(0);

    let report = run(config);

    assert_eq!(report.produced, 0);
    assert_eq!(report.transformed, 0);
    assert_eq!(report.consumed, 0);
    assert_eq!(report.per_producer, vec![0, 0, 0]);
    assert_eq!(report.per_consumer, vec![0, 0, 0]);
}

#[test]
fn test_custom_transform_applies_to_every_item() {
    let config = PipelineConfig::default()
        .with_value_range(10..=10)
        .with_transform(|v| v + 1)
        .with_seed(6);

    let report = run(config);

    assert!(report.values.iter().all(|&v| v == 11));
}

#[test]
fn test_stall_timeout_does_not_disturb_a_healthy_run() {
    let config = PipelineConfig::default()
        .with_stages(2, 2, 2)
        .with_items_per_producer(100)
        .with_seed(7)
        .with_stall_timeout(Duration::from_secs(5));

    let report = run(config);

    assert_eq!(report.consumed, 200);
    assert!(report.is_balanced());
}

#[test]
fn test_wide_run_loses_nothing() {
    let config = PipelineConfig::default()
        .with_stages(4, 3, 2)
        .with_items_per_producer(250)
        .with_value_range(1..=10_000)
        .with_seed(8);

    let report = run(config);

    assert_eq!(report.produced, 1000);
    assert_eq!(report.transformed, 1000);
    assert_eq!(report.consumed, 1000);
    assert_eq!(report.values.len(), 1000);
}
