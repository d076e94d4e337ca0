//! Host-driven frame scheduling.
//!
//! The host reports display frames through [`FrameScheduler::advance`]; scheduled tokens come
//! back out when their frame is due. Nothing here owns callbacks, so the caller stays free to
//! borrow whatever state the token refers to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nominal frame interval for a 60 Hz target, in milliseconds.
pub const FRAME_INTERVAL_MS: u64 = 1000 / 60;

/// How scheduled entries are released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameTiming {
    /// Release on the next display frame, skipping frames that arrive closer together than one
    /// interval (some hosts report the same refresh more than once).
    #[default]
    DisplayFrame,
    /// Release once a fixed interval has elapsed since scheduling.
    Interval,
}

/// Identifies one scheduled entry. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    token: T,
    scheduled_at: u64,
    frame_seq: u64,
}

#[derive(Debug)]
pub struct FrameScheduler<T> {
    timing: FrameTiming,
    next_handle: u64,
    pending: BTreeMap<FrameHandle, Pending<T>>,
    last_fire_ms: u64,
    clock_ms: u64,
    frame_seq: u64,
}

impl<T> FrameScheduler<T> {
    pub fn new(timing: FrameTiming) -> Self {
        Self {
            timing,
            next_handle: 1,
            pending: BTreeMap::new(),
            last_fire_ms: 0,
            clock_ms: 0,
            frame_seq: 0,
        }
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    /// Queue `token` for a future frame.
    pub fn schedule(&mut self, token: T) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(
            handle,
            Pending {
                token,
                scheduled_at: self.clock_ms,
                frame_seq: self.frame_seq,
            },
        );
        handle
    }

    /// Drop a pending entry. Unknown or already released handles are ignored.
    pub fn cancel(&mut self, handle: FrameHandle) -> Option<T> {
        self.pending.remove(&handle).map(|p| p.token)
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deliver a host frame at `now_ms` and return the tokens released by it, in scheduling
    /// order.
    ///
    /// Entries scheduled while handling a frame are never released by that same frame.
    pub fn advance(&mut self, now_ms: u64) -> Vec<T> {
        self.frame_seq += 1;
        self.clock_ms = now_ms;

        let mut due = Vec::new();
        for (handle, p) in &self.pending {
            if p.frame_seq >= self.frame_seq {
                continue;
            }
            let ready = match self.timing {
                FrameTiming::DisplayFrame => {
                    let ready = self.last_fire_ms == now_ms
                        || self.last_fire_ms + FRAME_INTERVAL_MS - 1 < now_ms;
                    if ready {
                        self.last_fire_ms = now_ms;
                    }
                    ready
                }
                FrameTiming::Interval => now_ms >= p.scheduled_at + FRAME_INTERVAL_MS,
            };
            if ready {
                due.push(*handle);
            }
        }

        due.into_iter()
            .filter_map(|h| self.pending.remove(&h))
            .map(|p| p.token)
            .collect()
    }

    /// Earliest time at which `advance` could release something, for hosts that sleep between
    /// frames.
    pub fn next_deadline(&self) -> Option<u64> {
        match self.timing {
            FrameTiming::Interval => self
                .pending
                .values()
                .map(|p| p.scheduled_at + FRAME_INTERVAL_MS)
                .min(),
            FrameTiming::DisplayFrame => (!self.pending.is_empty()).then(|| {
                (self.last_fire_ms + FRAME_INTERVAL_MS).max(self.clock_ms + 1)
            }),
        }
    }
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new(FrameTiming::default())
    }
}
