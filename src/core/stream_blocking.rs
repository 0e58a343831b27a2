// src/core/stream_blocking.rs

//! Manages clients that are blocked waiting for data on one or more streams,
//! for the `XREAD` command with the `BLOCK` option.
//!
//! Each waiter carries a watermark: the largest stream id it has already
//! observed. `XADD` delivers the appended entry directly to every waiter whose
//! watermark is strictly smaller, inside the same critical section as the
//! append, so a woken client never has to re-read the stream.

use crate::core::storage::db::ExecutionContext;
use crate::core::storage::stream::{StreamEntry, StreamId};
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::debug;

/// The payload handed to a woken `XREAD` waiter: the stream key whose append
/// fired and the appended entry itself.
#[derive(Debug, Clone)]
pub struct DeliveredEntry {
    pub key: Bytes,
    pub entry: StreamEntry,
}

/// The result of a stream blocking operation.
#[derive(Debug)]
pub enum StreamBlockerResult {
    /// An entry strictly newer than the waiter's watermark arrived.
    Delivered(DeliveredEntry),
    /// The blocking operation timed out.
    TimedOut,
}

/// The waker for stream blocking carries the delivered entry.
type Waker = oneshot::Sender<DeliveredEntry>;

/// A shareable, thread-safe waker. The `Option` allows it to be `take()`-n,
/// ensuring it is only used once.
type SharedWaker = Arc<Mutex<Option<Waker>>>;

/// Holds information about a waiting client, including its session ID for cleanup.
#[derive(Clone, Debug)]
struct WaiterInfo {
    session_id: u64,
    watermark: StreamId,
    waker: SharedWaker,
}

/// Manages all clients currently blocked on stream commands.
#[derive(Debug, Default)]
pub struct StreamBlockerManager {
    // Key: the name of the stream being watched.
    // Value: a queue of waiters for clients waiting on this stream.
    waiters: DashMap<Bytes, VecDeque<WaiterInfo>>,
}

impl StreamBlockerManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// The main orchestrator for blocking on stream keys.
    ///
    /// One waiter per queried key is registered, all sharing a single
    /// rendezvous, so whichever stream receives a qualifying entry first wins.
    /// Registration happens *before* the database locks are released; the
    /// caller must still hold the locks it used for its initial read.
    pub async fn block_on(
        self: &Arc<Self>,
        ctx: &mut ExecutionContext<'_>,
        streams: &[(Bytes, StreamId)],
        wait_timeout: Duration,
    ) -> StreamBlockerResult {
        let (tx, rx) = oneshot::channel();
        let shared_waker = Arc::new(Mutex::new(Some(tx)));

        for (key, watermark) in streams {
            self.waiters
                .entry(key.clone())
                .or_default()
                .push_back(WaiterInfo {
                    session_id: ctx.session_id,
                    watermark: *watermark,
                    waker: shared_waker.clone(),
                });
        }
        debug!(
            "Session {}: Registered to block on {} stream(s)",
            ctx.session_id,
            streams.len()
        );

        ctx.release_locks();
        let block_result = Self::wait_for_entry(rx, wait_timeout, &shared_waker).await;

        for (key, _) in streams {
            self.remove_waiter(key, &shared_waker);
        }
        debug!("Session {}: Stream waiter cleaned up.", ctx.session_id);

        block_result
    }

    /// Awaits the rendezvous, bounded by the timeout. On elapse, the waker
    /// slot is reclaimed first; a delivery that won the race is honored.
    async fn wait_for_entry(
        mut rx: oneshot::Receiver<DeliveredEntry>,
        wait_timeout: Duration,
        shared_waker: &SharedWaker,
    ) -> StreamBlockerResult {
        let first_attempt = timeout(wait_timeout, &mut rx).await;
        match first_attempt {
            Ok(Ok(delivered)) => StreamBlockerResult::Delivered(delivered),
            // Closed without a value: cancellation.
            Ok(Err(_)) => StreamBlockerResult::TimedOut,
            Err(_elapsed) => {
                let reclaimed = shared_waker.lock().unwrap().take();
                if reclaimed.is_some() {
                    StreamBlockerResult::TimedOut
                } else {
                    match rx.await {
                        Ok(delivered) => StreamBlockerResult::Delivered(delivered),
                        Err(_) => StreamBlockerResult::TimedOut,
                    }
                }
            }
        }
    }

    /// Wakes every waiter whose watermark is strictly below the appended
    /// entry's id, handing each the entry. Called by `XADD` inside its
    /// critical section. Woken waiters are removed from the queue.
    pub fn notify(&self, key: &Bytes, entry: &StreamEntry) {
        let Some(mut queue) = self.waiters.get_mut(key) else {
            return;
        };

        queue.retain_mut(|info| {
            if info.watermark >= entry.id {
                return true;
            }
            // `take()` ensures a waiter shared across several keys is woken
            // by exactly one of them.
            let Some(waker) = info.waker.lock().unwrap().take() else {
                return false;
            };
            let _ = waker.send(DeliveredEntry {
                key: key.clone(),
                entry: entry.clone(),
            });
            false
        });

        if queue.is_empty() {
            drop(queue);
            self.waiters.remove_if(key, |_, q| q.is_empty());
        }
    }

    /// Cleans up a specific waker from a key's queue after it's been used or
    /// has timed out.
    fn remove_waiter(&self, key: &Bytes, waker_to_remove: &SharedWaker) {
        if let Some(mut queue) = self.waiters.get_mut(key) {
            queue.retain(|info| !Arc::ptr_eq(&info.waker, waker_to_remove));
            if queue.is_empty() {
                drop(queue);
                self.waiters.remove_if(key, |_, q| q.is_empty());
            }
        }
    }

    /// Removes all wakers for a given session_id.
    /// Called when a client connection is closed to prevent dangling wakers.
    pub fn remove_waiters_for_session(&self, session_id: u64) {
        self.waiters.iter_mut().for_each(|mut queue| {
            queue.retain(|info| info.session_id != session_id);
        });
        self.waiters.retain(|_, queue| !queue.is_empty());
        debug!(
            "Removed any pending stream blockers for session_id {}.",
            session_id
        );
    }
}
