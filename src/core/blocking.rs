// src/core/blocking.rs

//! Manages clients that are blocked waiting for data on list keys (`BLPOP`).
//!
//! Waiters are registered while the key's shard lock is held and parked on a
//! single-shot rendezvous outside of it. A push hands values directly to
//! waiters inside its own critical section, so no push can be lost to an
//! armed waiter and no waiter can register after a push meant for it.

use crate::core::storage::data_types::DataValue;
use crate::core::storage::db::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::debug;

/// The value handed to a waiter when a blocking list pop succeeds.
#[derive(Debug, Clone)]
pub struct PoppedValue {
    pub key: Bytes,
    pub value: Bytes,
}

/// The result of a blocking operation, indicating the outcome.
#[derive(Debug)]
enum BlockerOutcome {
    /// The client was woken up with data.
    Woken(PoppedValue),
    /// The operation timed out before any data arrived.
    TimedOut,
}

/// The waker sends the popped value itself, eliminating the need for a re-read.
type Waker = oneshot::Sender<PoppedValue>;

/// A shareable waker struct. The `Option` allows it to be `take()`-n to prevent multiple sends.
type SharedWaker = Arc<Mutex<Option<Waker>>>;

/// Holds information about a waiting client, including its session ID for cleanup.
#[derive(Clone, Debug)]
struct WaiterInfo {
    session_id: u64,
    waker: SharedWaker,
}

/// Manages all clients currently blocked on list operations.
#[derive(Debug, Default)]
pub struct BlockerManager {
    // Key: the name of the key being watched.
    // Value: a FIFO queue of waiters for clients waiting on this key.
    waiters: DashMap<Bytes, VecDeque<WaiterInfo>>,
}

impl BlockerManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Orchestrates the `BLPOP` command.
    pub async fn orchestrate_blocking_pop(
        self: &Arc<Self>,
        ctx: &mut ExecutionContext<'_>,
        key: &Bytes,
        wait_timeout: Duration,
    ) -> Result<RespValue, CitrineError> {
        // 1. Attempt a non-blocking pop first.
        {
            let guard = ctx.get_single_shard_context_mut()?;
            if let Some(entry) = guard.get_mut(key) {
                let DataValue::List(list) = &mut entry.data else {
                    return Err(CitrineError::WrongType);
                };
                if let Some(value) = list.pop_front() {
                    return Ok(RespValue::Array(vec![
                        RespValue::BulkString(key.clone()),
                        RespValue::BulkString(value),
                    ]));
                }
            }
        }

        // 2. Prepare for blocking if no data was found.
        let (tx, rx) = oneshot::channel();
        let shared_waker = Arc::new(Mutex::new(Some(tx)));
        let waiter_info = WaiterInfo {
            session_id: ctx.session_id,
            waker: shared_waker.clone(),
        };

        // 3. Register the waker BEFORE releasing locks to prevent a race condition
        // where a push happens after the non-blocking check but before we start waiting.
        self.waiters
            .entry(key.clone())
            .or_default()
            .push_back(waiter_info);
        debug!(
            "Session {}: Registered to block on list key '{}'",
            ctx.session_id,
            String::from_utf8_lossy(key)
        );

        // 4. Release locks and enter the blocking wait.
        ctx.release_locks();
        let block_result = Self::wait_for_value(rx, wait_timeout, &shared_waker).await;

        // 5. Process the result and clean up the waiter.
        self.remove_waiter(key, &shared_waker);

        match block_result {
            BlockerOutcome::TimedOut => Ok(RespValue::Null),
            BlockerOutcome::Woken(popped) => Ok(RespValue::Array(vec![
                RespValue::BulkString(popped.key),
                RespValue::BulkString(popped.value),
            ])),
        }
    }

    /// Awaits the rendezvous, bounded by the timeout.
    ///
    /// A waiter transitions out of the armed state exactly once: on elapse it
    /// must first reclaim its waker slot, and if a notifier already took the
    /// slot, the delivery is in flight and is honored instead of dropped.
    async fn wait_for_value(
        mut rx: oneshot::Receiver<PoppedValue>,
        wait_timeout: Duration,
        shared_waker: &SharedWaker,
    ) -> BlockerOutcome {
        let first_attempt = timeout(wait_timeout, &mut rx).await;
        match first_attempt {
            Ok(Ok(popped)) => BlockerOutcome::Woken(popped),
            // The waker was dropped without sending: cancellation.
            Ok(Err(_)) => BlockerOutcome::TimedOut,
            Err(_elapsed) => {
                let reclaimed = shared_waker.lock().unwrap().take();
                if reclaimed.is_some() {
                    BlockerOutcome::TimedOut
                } else {
                    // A notifier committed to this waiter before the slot was
                    // reclaimed; the value must not be lost.
                    match rx.await {
                        Ok(popped) => BlockerOutcome::Woken(popped),
                        Err(_) => BlockerOutcome::TimedOut,
                    }
                }
            }
        }
    }

    /// Called by list write commands (`LPUSH`/`RPUSH`) inside their critical
    /// section. Hands off the first `min(waiters, values)` values to waiters
    /// in FIFO order; each handed-off value bypasses the list entirely.
    /// Returns the number of values consumed by waiters.
    pub fn notify_and_consume_for_push(&self, key: &Bytes, values: &[Bytes]) -> usize {
        let Some(mut queue) = self.waiters.get_mut(key) else {
            return 0;
        };

        let mut consumed = 0;
        while consumed < values.len() {
            let Some(info) = queue.pop_front() else {
                break;
            };
            // Skip stale waiters whose wakers were already reclaimed (timeout/cancel).
            let Some(waker) = info.waker.lock().unwrap().take() else {
                continue;
            };
            let popped = PoppedValue {
                key: key.clone(),
                value: values[consumed].clone(),
            };
            if waker.send(popped).is_ok() {
                debug!(
                    "Atomically handed off value to a waiter for list key '{}'",
                    String::from_utf8_lossy(key)
                );
                consumed += 1;
            }
            // A failed send means the receiver is gone; retry the same value
            // with the next waiter.
        }

        if queue.is_empty() {
            drop(queue);
            self.waiters.remove_if(key, |_, q| q.is_empty());
        }
        consumed
    }

    /// Removes a specific waker from a key's queue.
    fn remove_waiter(&self, key: &Bytes, waker_to_remove: &SharedWaker) {
        if let Some(mut queue) = self.waiters.get_mut(key) {
            queue.retain(|info| !Arc::ptr_eq(&info.waker, waker_to_remove));
            if queue.is_empty() {
                drop(queue);
                self.waiters.remove_if(key, |_, q| q.is_empty());
            }
        }
    }

    /// Removes all wakers for a given session_id upon client disconnection.
    pub fn remove_waiters_for_session(&self, session_id: u64) {
        self.waiters.iter_mut().for_each(|mut queue| {
            queue.retain(|info| info.session_id != session_id);
        });
        self.waiters.retain(|_, queue| !queue.is_empty());
        debug!(
            "Removed any pending blockers for session_id {}.",
            session_id
        );
    }
}
