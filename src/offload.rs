//! Running bursts on a secondary thread.
//!
//! The primary side keeps an [`OffloadProxy`] per cannon. The proxy owns the channel pair to a
//! worker that runs its own cannon against the surface moved to it with
//! [`ToWorker::Init`](protocol::ToWorker::Init).

pub mod protocol;
pub mod proxy;
pub mod worker;

pub use protocol::{CorrelationId, FromWorker, ToWorker};
pub use proxy::OffloadProxy;

use crate::foundation::error::ConfettiError;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

#[derive(thiserror::Error, Debug)]
pub enum OffloadError {
    #[error("failed to start offload worker: {0}")]
    Spawn(String),

    #[error("offload worker disconnected")]
    Disconnected,
}

impl From<OffloadError> for ConfettiError {
    fn from(err: OffloadError) -> Self {
        ConfettiError::offload(err.to_string())
    }
}

/// Primary-side ends of a worker connection.
#[derive(Debug)]
pub struct WorkerChannel {
    tx: Option<Sender<ToWorker>>,
    rx: Receiver<FromWorker>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerChannel {
    pub fn new(tx: Sender<ToWorker>, rx: Receiver<FromWorker>) -> Self {
        Self {
            tx: Some(tx),
            rx,
            thread: None,
        }
    }

    /// Join `thread` when the channel is dropped.
    pub fn with_thread(mut self, thread: JoinHandle<()>) -> Self {
        self.thread = Some(thread);
        self
    }

    pub(crate) fn post(&self, msg: ToWorker) -> Result<(), ToWorker> {
        match &self.tx {
            Some(tx) => tx.send(msg).map_err(|e| e.0),
            None => Err(msg),
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<FromWorker> {
        &self.rx
    }
}

impl Drop for WorkerChannel {
    fn drop(&mut self) {
        // Hanging up is what tells the worker to exit.
        drop(self.tx.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("offload worker panicked");
        }
    }
}

/// Starts a secondary execution context.
pub trait ContextSpawner {
    fn spawn(&self) -> Result<WorkerChannel, OffloadError>;
}

/// Runs the worker on a dedicated OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSpawner;

impl ContextSpawner for ThreadSpawner {
    fn spawn(&self) -> Result<WorkerChannel, OffloadError> {
        let (to_worker, worker_rx) = mpsc::channel();
        let (worker_tx, from_worker) = mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("confetti-offload".to_owned())
            .spawn(move || worker::run(worker_rx, worker_tx))
            .map_err(|e| OffloadError::Spawn(e.to_string()))?;
        Ok(WorkerChannel::new(to_worker, from_worker).with_thread(thread))
    }
}

/// Never spawns; delegation always degrades to local execution.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpawner;

impl ContextSpawner for NoSpawner {
    fn spawn(&self) -> Result<WorkerChannel, OffloadError> {
        Err(OffloadError::Spawn(
            "secondary contexts are unavailable".to_owned(),
        ))
    }
}
