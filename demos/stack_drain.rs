//! Hammer the lock-free stack from several threads, then drain it and
//! check that nothing was lost.
//!
//! Usage: `cargo run --example stack_drain`

use conveyor::TreiberStack;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const THREADS: u64 = 4;
const PER_THREAD: u64 = 25_000;

fn main() {
    let stack = Arc::new(TreiberStack::new());
    let start = Instant::now();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let stack = Arc::clone(&stack);
            thread::spawn(move || {
                let base = t * PER_THREAD;
                for i in 0..PER_THREAD {
                    stack.push(base + i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Push thread panicked");
    }

    let mut drained = 0u64;
    let mut sum = 0u64;
    while let Some(value) = stack.pop() {
        drained += 1;
        sum += value;
    }

    let total = THREADS * PER_THREAD;
    println!(
        "Drained {} of {} pushed values (sum {}) in {:?}",
        drained,
        total,
        sum,
        start.elapsed()
    );
    assert_eq!(drained, total);
    assert_eq!(sum, total * (total - 1) / 2);
}
