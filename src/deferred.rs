//! Deferred results for promise-returning methods.
//!
//! A [`Deferred`] travels with the queue entry to whoever performs the real work;
//! the matching [`DeferredResult`] is handed to the caller immediately.

use crate::error::CallError;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

pub type CallResult = Result<Value, CallError>;

/// Process-unique id for one intercepted call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u64);

impl CallId {
    /// Allocate the next id. Ids increase in allocation order.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        CallId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// Resolver/rejecter pair for one call. Settles at most once.
pub struct Deferred {
    id: CallId,
    tx: Mutex<Option<oneshot::Sender<CallResult>>>,
}

impl Deferred {
    /// Create a handle and the caller-visible awaitable bound to it.
    pub fn pair(id: CallId) -> (Deferred, DeferredResult) {
        let (tx, rx) = oneshot::channel();
        (
            Deferred {
                id,
                tx: Mutex::new(Some(tx)),
            },
            DeferredResult { id, rx },
        )
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    /// Resolve with a value. Returns false if the handle was already settled.
    pub fn resolve(&self, value: Value) -> bool {
        self.settle(Ok(value))
    }

    /// Reject with an error. Returns false if the handle was already settled.
    pub fn reject(&self, error: CallError) -> bool {
        self.settle(Err(error))
    }

    pub fn settle(&self, result: CallResult) -> bool {
        match self.tx.lock().take() {
            // The caller may have dropped its awaitable; the handle still counts as settled.
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.tx.lock().is_none()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.id)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Caller-side awaitable of a promise-returning call.
///
/// Stays pending until the paired [`Deferred`] is settled. If the handle is
/// dropped unsettled the result is [`CallError::Abandoned`].
#[derive(Debug)]
pub struct DeferredResult {
    id: CallId,
    rx: oneshot::Receiver<CallResult>,
}

impl DeferredResult {
    pub fn id(&self) -> CallId {
        self.id
    }

    /// Non-blocking check; `None` while still pending.
    pub fn try_result(&mut self) -> Option<CallResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(CallError::Abandoned)),
        }
    }
}

impl Future for DeferredResult {
    type Output = CallResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(CallError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}
