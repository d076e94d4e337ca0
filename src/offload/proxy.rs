use super::WorkerChannel;
use super::protocol::{CorrelationId, FromWorker, ToWorker};
use crate::completion::CompletionSignal;
use crate::foundation::core::SurfaceSize;
use crate::options::BurstOptions;
use crate::surface::draw::DrawingSurface;
use std::collections::HashMap;
use std::sync::mpsc::TryRecvError;

/// Primary-side bookkeeping for a worker.
///
/// While one request is outstanding, later fires ride along without a correlation id and share
/// its completion signal; the worker merges them into the running animation.
#[derive(Debug)]
pub struct OffloadProxy {
    channel: WorkerChannel,
    next_id: u64,
    pending: HashMap<CorrelationId, CompletionSignal>,
    outstanding: Option<CorrelationId>,
    disconnected: bool,
}

impl OffloadProxy {
    pub fn new(channel: WorkerChannel) -> Self {
        Self {
            channel,
            next_id: 1,
            pending: HashMap::new(),
            outstanding: None,
            disconnected: false,
        }
    }

    /// Move `surface` to the worker. On a dead channel the surface is handed back.
    pub fn init(
        &mut self,
        surface: Box<dyn DrawingSurface>,
        size: SurfaceSize,
    ) -> Option<Box<dyn DrawingSurface>> {
        self.post(ToWorker::Init { surface, size })
            .err()
            .and_then(ToWorker::into_surface)
    }

    pub fn send(&mut self, options: BurstOptions) -> CompletionSignal {
        if let Some(id) = self.outstanding
            && let Some(signal) = self.pending.get(&id)
        {
            let signal = signal.clone();
            if self
                .post(ToWorker::Fire {
                    options,
                    callback: None,
                })
                .is_err()
            {
                self.settle_all();
            }
            return signal;
        }

        let id = CorrelationId(self.next_id);
        self.next_id += 1;
        let signal = CompletionSignal::new();
        if self
            .post(ToWorker::Fire {
                options,
                callback: Some(id),
            })
            .is_err()
        {
            signal.settle();
            return signal;
        }
        self.pending.insert(id, signal.clone());
        self.outstanding = Some(id);
        signal
    }

    pub fn resize_notify(&mut self, size: SurfaceSize) {
        // A dead worker has nothing left to resize.
        let _ = self.post(ToWorker::Resize(size));
    }

    /// Ask the worker to stop and settle every pending signal without waiting for it.
    pub fn reset_all(&mut self) -> usize {
        let _ = self.post(ToWorker::Reset);
        self.settle_all()
    }

    /// Drain worker replies without blocking; returns how many signals settled.
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;
        loop {
            match self.channel.receiver().try_recv() {
                Ok(FromWorker::Completed { callback }) => {
                    tracing::trace!(callback = callback.0, "offload completion received");
                    if self.outstanding == Some(callback) {
                        self.outstanding = None;
                    }
                    if let Some(signal) = self.pending.remove(&callback) {
                        signal.settle();
                        settled += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.pending.is_empty() {
                        self.note_disconnect();
                        settled += self.settle_all();
                    }
                    break;
                }
            }
        }
        settled
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    fn post(&mut self, msg: ToWorker) -> Result<(), ToWorker> {
        tracing::trace!(kind = msg.kind(), "posting to offload worker");
        let result = self.channel.post(msg);
        if result.is_err() {
            self.note_disconnect();
        }
        result
    }

    fn note_disconnect(&mut self) {
        if !self.disconnected {
            tracing::warn!("offload worker is gone; settling its bursts immediately");
            self.disconnected = true;
        }
    }

    fn settle_all(&mut self) -> usize {
        self.outstanding = None;
        let n = self.pending.len();
        for (_, signal) in self.pending.drain() {
            signal.settle();
        }
        n
    }
}
