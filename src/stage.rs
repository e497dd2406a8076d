use crate::error::{PipelineError, Result};
use crate::queue::BlockingQueue;
use rand::rngs::StdRng;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, trace};

/// A message on an inter-stage queue.
///
/// The shutdown sentinel travels in-band: same queue, same type as the
/// data it follows. FIFO ordering therefore guarantees that every real
/// item precedes every sentinel pushed after the upstream stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<T> {
    /// A real data item.
    Item(T),
    /// No more items will arrive for the thread that pops this.
    Done,
}

/// Producer body: draw `items` values uniformly from `range` and push each
/// onto `out`. Returns the number of items emitted.
///
/// Producers never push sentinels. The driver broadcasts one per
/// downstream thread after the whole producer stage has been joined, so
/// the sentinel count matches the receiver count regardless of how many
/// producers there are.
pub fn run_producer(
    id: usize,
    out: &BlockingQueue<Message<u64>>,
    items: u64,
    range: RangeInclusive<u64>,
    mut rng: StdRng,
) -> u64 {
    for _ in 0..items {
        let value = rng.gen_range(range.clone());
        out.push(Message::Item(value));
        trace!("producer {} emitted {}", id, value);
    }
    debug!("producer {} finished after {} items", id, items);
    items
}

/// Processor body: pop from `input`, apply `transform`, push the result to
/// `output`. Returns the number of items transformed.
///
/// Exits on the first sentinel without forwarding it; the driver owns the
/// downstream broadcast, so each sentinel is consumed exactly once.
pub fn run_processor(
    id: usize,
    input: &BlockingQueue<Message<u64>>,
    output: &BlockingQueue<Message<u64>>,
    transform: &(dyn Fn(u64) -> u64 + Send + Sync),
    stall_timeout: Option<Duration>,
) -> Result<u64> {
    let mut transformed = 0;
    loop {
        match next_message("processor", id, input, stall_timeout)? {
            Message::Item(value) => {
                let mapped = transform(value);
                output.push(Message::Item(mapped));
                transformed += 1;
                trace!("processor {} mapped {} -> {}", id, value, mapped);
            }
            Message::Done => {
                debug!("processor {} finished after {} items", id, transformed);
                return Ok(transformed);
            }
        }
    }
}

/// Consumer body: pop from `input` and record every value until the
/// sentinel arrives. Returns the recorded values in arrival order.
pub fn run_consumer(
    id: usize,
    input: &BlockingQueue<Message<u64>>,
    stall_timeout: Option<Duration>,
) -> Result<Vec<u64>> {
    let mut recorded = Vec::new();
    loop {
        match next_message("consumer", id, input, stall_timeout)? {
            Message::Item(value) => {
                trace!("consumer {} recorded {}", id, value);
                recorded.push(value);
            }
            Message::Done => {
                debug!("consumer {} finished after {} items", id, recorded.len());
                return Ok(recorded);
            }
        }
    }
}

/// Blocking pop with the optional bounded-wait policy applied.
fn next_message(
    stage: &'static str,
    id: usize,
    input: &BlockingQueue<Message<u64>>,
    stall_timeout: Option<Duration>,
) -> Result<Message<u64>> {
    match stall_timeout {
        None => Ok(input.pop()),
        Some(timeout) => input
            .pop_timeout(timeout)
            .ok_or(PipelineError::Stalled { stage, id, timeout }),
    }
}
