// src/exec/latch.rs

//! Countdown latch with a single-fire completion signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

/// Fires its [`oneshot::Receiver`] exactly once, when the count reaches zero.
///
/// Cloning shares the same counter. Counting down below zero is a logic error
/// and is ignored.
#[derive(Debug, Clone)]
pub struct CountdownLatch {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    count: AtomicUsize,
    fire: Mutex<Option<oneshot::Sender<()>>>,
}

impl CountdownLatch {
    /// Create a latch starting at `count`, plus the receiver it fires.
    ///
    /// A latch created with `count == 0` fires immediately.
    pub fn new(count: usize) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let latch = Self {
            inner: Arc::new(Inner {
                count: AtomicUsize::new(count),
                fire: Mutex::new(Some(tx)),
            }),
        };
        if count == 0 {
            latch.fire();
        }
        (latch, rx)
    }

    /// Register one more participant. Adding after the latch fired does not
    /// re-arm it.
    pub fn add(&self) {
        self.inner.count.fetch_add(1, Ordering::AcqRel);
    }

    pub fn count_down(&self) {
        let prev = self
            .inner
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match prev {
            Ok(1) => self.fire(),
            Ok(remaining) => trace!(remaining = remaining - 1, "latch counted down"),
            Err(_) => trace!("latch already at zero; ignoring count_down"),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::Acquire)
    }

    fn fire(&self) {
        if let Some(tx) = self.inner.fire.lock().take() {
            // Receiver may be gone if nobody is waiting; that's fine.
            let _ = tx.send(());
        }
    }
}
