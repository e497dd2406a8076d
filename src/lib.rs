//! Concurrency building blocks and the staged pipeline that composes them.
//!
//! This crate provides two independent thread-safe containers and a driver
//! that wires one of them into a producer -> processor -> consumer pipeline.
//!
//! # Features
//!
//! - A lock-free LIFO stack built on compare-and-swap with epoch-based
//!   node reclamation
//! - An unbounded FIFO queue with a blocking `pop` and a deadline-bounded
//!   variant
//! - A pipeline driver with configurable stage widths and a sentinel
//!   broadcast shutdown that terminates every thread deterministically
//! - Reproducible runs via seeded per-producer RNG streams
//! - Per-run accounting: items per stage, per-thread counts, throughput
//!
//! # Example
//!
//! ```ignore
//! use conveyor::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default().with_seed(42);
//! let report = Pipeline::new(config)?.run()?;
//! assert!(report.is_balanced());
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod report;
pub mod stack;
pub mod stage;

// Re-exports for convenience
pub use config::{PipelineConfig, Transform};
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use queue::BlockingQueue;
pub use report::PipelineReport;
pub use stack::TreiberStack;
pub use stage::Message;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
