//! Run the default pipeline shape: three producers emitting five random
//! values each, two doubling processors, three consumers.
//!
//! Usage: `cargo run --example doubling_line`
//! Set `RUST_LOG=debug` (or `trace`) to watch the stage lifecycle.

use conveyor::{Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PipelineConfig::default().with_seed(42);
    println!("Running {:?}", config);

    let report = Pipeline::new(config)?.run()?;

    println!("{}", report.format());
    println!("Per producer: {:?}", report.per_producer);
    println!("Per consumer: {:?}", report.per_consumer);

    let mut values = report.values.clone();
    values.sort_unstable();
    println!("Consumed values (sorted): {:?}", values);

    Ok(())
}
