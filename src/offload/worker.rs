//! Worker-side message loop.

use super::protocol::{CorrelationId, FromWorker, ToWorker};
use crate::cannon::{Cannon, CannonOpts};
use crate::completion::CompletionSignal;
use crate::foundation::core::SurfaceSize;
use crate::scheduler::FrameTiming;
use crate::surface::draw::{DrawingSurface, SurfaceHandle, SurfaceId};
use crate::surface::headless::HeadlessContainer;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SendError, Sender};
use std::time::{Duration, Instant};

/// Serve one primary until it hangs up.
///
/// The worker keeps its own cannon bound to the surface received with `Init` and pumps it on
/// its own clock, sleeping until the next frame is due.
pub fn run(rx: Receiver<ToWorker>, tx: Sender<FromWorker>) {
    let clock = Instant::now();
    let mut worker = Worker::default();
    tracing::debug!("offload worker started");

    loop {
        let msg = match worker.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_sub(elapsed_ms(clock));
                match rx.recv_timeout(Duration::from_millis(wait)) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            },
        };

        if let Some(msg) = msg {
            tracing::trace!(kind = msg.kind(), "offload worker received");
            worker.handle(msg);
        }
        worker.pump(elapsed_ms(clock));
        if worker.report(&tx).is_err() {
            break;
        }
    }

    if let Some(cannon) = worker.cannon.as_mut() {
        cannon.reset();
    }
    tracing::debug!("offload worker exiting");
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[derive(Default)]
struct Worker {
    cannon: Option<Cannon<HeadlessContainer>>,
    tracked: Vec<(CorrelationId, CompletionSignal)>,
}

impl Worker {
    fn next_deadline(&self) -> Option<u64> {
        self.cannon.as_ref().and_then(Cannon::next_deadline)
    }

    fn handle(&mut self, msg: ToWorker) {
        match msg {
            ToWorker::Init { surface, size } => self.init(surface, size),
            ToWorker::Fire { options, callback } => match self.cannon.as_mut() {
                Some(cannon) => {
                    let signal = cannon.fire(&options);
                    if let Some(id) = callback {
                        self.tracked.push((id, signal));
                    }
                }
                None => {
                    tracing::warn!("fire received before a surface; completing it unanimated");
                    if let Some(id) = callback {
                        self.tracked.push((id, CompletionSignal::settled()));
                    }
                }
            },
            ToWorker::Reset => {
                if let Some(cannon) = self.cannon.as_mut() {
                    cannon.reset();
                }
            }
            ToWorker::Resize(size) => {
                if let Some(cannon) = self.cannon.as_mut() {
                    cannon.set_forced_size(Some(size));
                }
            }
        }
    }

    fn init(&mut self, surface: Box<dyn DrawingSurface>, size: SurfaceSize) {
        if let Some(mut old) = self.cannon.take() {
            old.reset();
        }
        let opts = CannonOpts {
            timing: FrameTiming::Interval,
            ..CannonOpts::default()
        };
        let mut cannon = Cannon::with_surface(
            HeadlessContainer::new(size),
            SurfaceHandle::new(SurfaceId(0), surface),
            opts,
        );
        cannon.set_forced_size(Some(size));
        self.cannon = Some(cannon);
    }

    fn pump(&mut self, now_ms: u64) {
        if let Some(cannon) = self.cannon.as_mut() {
            cannon.advance(now_ms);
        }
    }

    fn report(&mut self, tx: &Sender<FromWorker>) -> Result<(), SendError<FromWorker>> {
        // Replies go out in the order the bursts were registered.
        let mut result = Ok(());
        self.tracked.retain(|(callback, signal)| {
            if result.is_err() || !signal.is_settled() {
                return true;
            }
            match tx.send(FromWorker::Completed {
                callback: *callback,
            }) {
                Ok(()) => false,
                Err(e) => {
                    result = Err(e);
                    true
                }
            }
        });
        result
    }
}
