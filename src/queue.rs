use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// An unbounded FIFO queue with a blocking pop, the channel between
/// pipeline stages.
///
/// All access is serialized by one mutex, so the sequence is never observed
/// torn: every call moves the length by exactly one element (or none, for a
/// timed-out pop). `push` never blocks beyond the lock; `pop` suspends the
/// caller until an item is available. Share it across threads behind an
/// `Arc`.
pub struct BlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    /// Signaled on every push; poppers re-check the queue after every
    /// wakeup, so spurious wakeups and racing poppers are harmless.
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Append `value` at the tail and wake one blocked popper.
    ///
    /// The queue is unbounded: this never waits for space.
    pub fn push(&self, value: T) {
        let mut items = self.items.lock();
        items.push_back(value);
        self.not_empty.notify_one();
    }

    /// Remove and return the head element, blocking until one exists.
    ///
    /// Blocks indefinitely if nothing is ever pushed; callers that need
    /// failure detection instead of an unbounded wait use [`pop_timeout`].
    ///
    /// [`pop_timeout`]: BlockingQueue::pop_timeout
    pub fn pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return value;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Like [`pop`], but gives up once `timeout` has elapsed with the
    /// queue still empty.
    ///
    /// A push that races the deadline is still honored: the queue is
    /// re-checked one last time after the wait times out.
    ///
    /// [`pop`]: BlockingQueue::pop
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return Some(value);
            }
            if self.not_empty.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Number of queued items. Diagnostic snapshot only.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// `true` if the queue held nothing at the moment of the check.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
