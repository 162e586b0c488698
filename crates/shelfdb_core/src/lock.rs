//! Per-key exclusivity with FIFO hand-off.
//!
//! Every mutating collection operation runs inside
//! [`LockManager::run_exclusive`], keyed by the collection name. For one
//! key, operations run one at a time and in the order `run_exclusive` was
//! called; different keys never wait on each other.
//!
//! ## How a turn moves
//!
//! A key present in the table is busy. Its entry holds the queue of
//! waiters, each the sending half of a one-shot channel. When the running
//! operation finishes, its `TurnGuard` is dropped and the manager sends a
//! fresh guard to the first waiter. A waiter that went away hands the
//! guard straight back, and the turn moves on to the next one. When the
//! queue is empty the entry is removed and the key is idle again.
//!
//! The turn is reserved when `run_exclusive` is called, not when the
//! returned [`Pending`] is first polled, so call order is queue order even
//! if the caller never awaits.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Key reserved for database-wide operations such as
/// [`Database::delete_all`](crate::Database::delete_all).
pub const GLOBAL_LOCK_KEY: &str = "__global__";

type Waiters = VecDeque<oneshot::Sender<TurnGuard>>;

/// Grants one turn at a time per key.
#[derive(Default)]
pub struct LockManager {
    slots: Mutex<HashMap<String, Waiters>>,
}

impl LockManager {
    /// Creates a lock manager with no busy keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `op` to run exclusively for `key`.
    ///
    /// `op` runs on Tokio's blocking pool once every operation scheduled
    /// earlier for the same key has finished. An error or panic in `op`
    /// reaches only this caller; the turn is released either way.
    ///
    /// Dropping the returned [`Pending`] does not cancel the operation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn run_exclusive<T, F>(self: &Arc<Self>, key: &str, op: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> CoreResult<T> + Send + 'static,
    {
        let ticket = self.reserve(key);
        Pending {
            handle: tokio::spawn(run_turn(ticket, op)),
        }
    }

    /// Returns true while an operation holds or waits for `key`.
    #[must_use]
    pub fn is_busy(&self, key: &str) -> bool {
        self.slots.lock().contains_key(key)
    }

    /// Number of operations waiting behind the one running for `key`.
    #[must_use]
    pub fn queued(&self, key: &str) -> usize {
        self.slots.lock().get(key).map_or(0, VecDeque::len)
    }

    fn reserve(self: &Arc<Self>, key: &str) -> Ticket {
        let mut slots = self.slots.lock();
        if let Some(waiters) = slots.get_mut(key) {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            debug!(key, queued = waiters.len(), "waiting for turn");
            Ticket::Queued(rx)
        } else {
            slots.insert(key.to_string(), VecDeque::new());
            Ticket::Ready(TurnGuard::new(Arc::clone(self), key))
        }
    }

    fn release(self: &Arc<Self>, key: &str) {
        loop {
            let next = {
                let mut slots = self.slots.lock();
                let Some(waiters) = slots.get_mut(key) else {
                    return;
                };
                match waiters.pop_front() {
                    Some(next) => next,
                    None => {
                        slots.remove(key);
                        debug!(key, "key idle");
                        return;
                    }
                }
            };

            // The slot lock is released here: a guard that comes back
            // must not re-enter `release` while it is held.
            match next.send(TurnGuard::new(Arc::clone(self), key)) {
                Ok(()) => {
                    debug!(key, "turn handed over");
                    return;
                }
                Err(mut unclaimed) => unclaimed.disarm(),
            }
        }
    }
}

impl fmt::Debug for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("LockManager")
            .field("busy_keys", &slots.len())
            .finish()
    }
}

async fn run_turn<T, F>(ticket: Ticket, op: F) -> CoreResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> CoreResult<T> + Send + 'static,
{
    let turn = ticket.wait().await?;
    let result = tokio::task::spawn_blocking(op).await;
    drop(turn);
    result?
}

/// Proof that the holder owns the turn for a key. Dropping it passes the
/// turn on.
struct TurnGuard {
    manager: Option<Arc<LockManager>>,
    key: String,
}

impl TurnGuard {
    fn new(manager: Arc<LockManager>, key: &str) -> Self {
        Self {
            manager: Some(manager),
            key: key.to_string(),
        }
    }

    fn disarm(&mut self) {
        self.manager = None;
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.take() {
            manager.release(&self.key);
        }
    }
}

impl fmt::Debug for TurnGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnGuard").field("key", &self.key).finish()
    }
}

enum Ticket {
    Ready(TurnGuard),
    Queued(oneshot::Receiver<TurnGuard>),
}

impl Ticket {
    async fn wait(self) -> CoreResult<TurnGuard> {
        match self {
            Self::Ready(guard) => Ok(guard),
            Self::Queued(rx) => rx
                .await
                .map_err(|_| CoreError::task_failed("lock manager dropped a queued turn")),
        }
    }
}

/// The eventual result of an exclusive operation.
///
/// Await it to get the operation's result. The operation runs whether or
/// not this is awaited.
#[must_use = "the result of the operation is only observable by awaiting it"]
pub struct Pending<T> {
    handle: JoinHandle<CoreResult<T>>,
}

impl<T> Pending<T> {
    /// Returns true once the operation has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for Pending<T> {
    type Output = CoreResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|joined| joined.map_err(CoreError::from).and_then(|result| result))
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}
