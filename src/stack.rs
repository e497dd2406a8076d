use crossbeam::epoch::{self, Atomic, Owned};
use crossbeam::utils::Backoff;
use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

/// Treiber's lock-free stack.
///
/// A multi-producer/multi-consumer LIFO over an atomic singly-linked list.
/// `push` and `pop` never block: each operation snapshots the head and
/// retries its compare-and-swap until the head is won. Detached nodes are
/// retired to the epoch collector rather than freed in place, so a thread
/// still holding a stale head snapshot can never dereference freed memory
/// (no ABA, no use-after-free).
pub struct TreiberStack<T> {
    head: Atomic<Node<T>>,
}

struct Node<T> {
    /// Moved out by a successful `pop` before the node is retired; the
    /// deferred destructor must not drop it a second time.
    value: ManuallyDrop<T>,
    next: Atomic<Node<T>>,
}

impl<T> TreiberStack<T> {
    /// Create a new, empty stack.
    pub fn new() -> Self {
        Self {
            head: Atomic::null(),
        }
    }

    /// Push `value` on top of the stack.
    ///
    /// Allocates one node and publishes it with a CAS loop. Concurrent
    /// pushes may force retries, but some thread always makes progress.
    pub fn push(&self, value: T) {
        let mut node = Owned::new(Node {
            value: ManuallyDrop::new(value),
            next: Atomic::null(),
        });
        let guard = epoch::pin();
        let backoff = Backoff::new();

        loop {
            let head = self.head.load(Acquire, &guard);
            node.next.store(head, Relaxed);

            match self
                .head
                .compare_exchange(head, node, Release, Relaxed, &guard)
            {
                Ok(_) => return,
                Err(e) => {
                    node = e.new;
                    backoff.spin();
                }
            }
        }
    }

    /// Pop the top value, or `None` if the stack is observed empty.
    ///
    /// Returns immediately on an empty stack; otherwise retries the
    /// head CAS until this caller wins a node. On success the node's value
    /// is moved out and the node is handed to the epoch collector.
    pub fn pop(&self) -> Option<T> {
        let guard = epoch::pin();
        let backoff = Backoff::new();

        loop {
            let head = self.head.load(Acquire, &guard);
            let node = unsafe { head.as_ref() }?;
            let next = node.next.load(Relaxed, &guard);

            match self
                .head
                .compare_exchange(head, next, Release, Relaxed, &guard)
            {
                Ok(_) => unsafe {
                    // The CAS detached this node: the value now belongs to
                    // this caller, the node itself to the collector.
                    guard.defer_destroy(head);
                    return Some(ManuallyDrop::into_inner(ptr::read(&node.value)));
                },
                Err(_) => backoff.spin(),
            }
        }
    }

    /// `true` if no node was reachable at the moment of the check.
    ///
    /// Diagnostic only: the answer can be stale by the time the caller
    /// acts on it. There is no `len` or `peek` because any such snapshot
    /// is just as stale, and `pop` already reports emptiness.
    pub fn is_empty(&self) -> bool {
        let guard = epoch::pin();
        self.head.load(Acquire, &guard).is_null()
    }
}

impl<T> Default for TreiberStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for TreiberStack<T> {
    fn drop(&mut self) {
        // `&mut self` guarantees no concurrent operation is in flight, so
        // the chain can be walked and freed without pinning.
        unsafe {
            let guard = epoch::unprotected();
            let mut head = self.head.load(Relaxed, guard);
            while let Some(node) = head.as_ref() {
                let next = node.next.load(Relaxed, guard);
                let mut owned = head.into_owned();
                ManuallyDrop::drop(&mut owned.value);
                drop(owned);
                head = next;
            }
        }
    }
}

// Values are moved in and out whole; sharing the stack never hands out a
// reference to a `T`, so `T: Send` is the only requirement.
unsafe impl<T: Send> Send for TreiberStack<T> {}
unsafe impl<T: Send> Sync for TreiberStack<T> {}
