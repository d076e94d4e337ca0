//! One-shot completion signal returned by `fire`.
//!
//! Every clone observes the same state. The signal settles at most once; later `settle` calls are
//! ignored. It can be polled, waited on from another thread, or awaited as a `Future`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    settled: bool,
    wakers: Vec<Waker>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

#[derive(Clone, Debug, Default)]
pub struct CompletionSignal {
    inner: Arc<Inner>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that is already complete.
    pub fn settled() -> Self {
        let s = Self::new();
        s.settle();
        s
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Complete the signal. Returns `false` if it had already completed.
    pub fn settle(&self) -> bool {
        let wakers = {
            let mut state = self.lock();
            if state.settled {
                return false;
            }
            state.settled = true;
            std::mem::take(&mut state.wakers)
        };
        self.inner.cond.notify_all();
        for w in wakers {
            w.wake();
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.lock().settled
    }

    /// Whether both handles refer to the same signal.
    pub fn same_as(&self, other: &CompletionSignal) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Block until settled or `timeout` elapses; returns whether the signal settled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.lock();
        match self
            .inner
            .cond
            .wait_timeout_while(state, timeout, |s| !s.settled)
        {
            Ok((state, _)) => state.settled,
            Err(poisoned) => poisoned.into_inner().0.settled,
        }
    }
}

impl Future for CompletionSignal {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.lock();
        if state.settled {
            return Poll::Ready(());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
