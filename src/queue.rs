//! Pending Call Queue
//!
//! Ordered, append-only record of calls made against the stub. The stub is the
//! only producer. The real implementation is the only consumer: once attached it
//! drains entries in FIFO order, invokes the matching method with the recorded
//! arguments and settles any attached [`Deferred`].

use crate::args::CallArg;
use crate::deferred::{CallId, Deferred};
use crate::method::Method;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// One recorded call awaiting replay.
#[derive(Debug)]
pub struct QueueEntry {
    id: CallId,
    method: Method,
    deferred: Option<Deferred>,
    args: Vec<CallArg>,
}

impl QueueEntry {
    pub fn new(id: CallId, method: Method, deferred: Option<Deferred>, args: Vec<CallArg>) -> Self {
        Self {
            id,
            method,
            deferred,
            args,
        }
    }

    pub fn id(&self) -> CallId {
        self.id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn deferred(&self) -> Option<&Deferred> {
        self.deferred.as_ref()
    }

    pub fn args(&self) -> &[CallArg] {
        &self.args
    }

    pub fn into_parts(self) -> (Method, Option<Deferred>, Vec<CallArg>) {
        (self.method, self.deferred, self.args)
    }
}

#[derive(Debug, Default)]
struct QueueState {
    entries: Vec<QueueEntry>,
    /// Set once the real implementation has taken over; later pushes are refused.
    sealed: bool,
}

/// Shared FIFO of [`QueueEntry`] values. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct CallQueue {
    state: Arc<Mutex<QueueState>>,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A sealed queue hands the entry back so the caller can
    /// route it to the real implementation directly.
    pub fn push(&self, entry: QueueEntry) -> Result<CallId, QueueEntry> {
        let mut state = self.state.lock();
        if state.sealed {
            return Err(entry);
        }
        let id = entry.id;
        debug!(
            call_id = %id,
            method = %entry.method,
            deferred = entry.deferred.is_some(),
            position = state.entries.len(),
            "Queued call"
        );
        state.entries.push(entry);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Methods of the queued entries, in queue order.
    pub fn methods(&self) -> Vec<Method> {
        self.state.lock().entries.iter().map(|e| e.method).collect()
    }

    /// Inspect the entries without consuming them.
    pub fn with_entries<R>(&self, f: impl FnOnce(&[QueueEntry]) -> R) -> R {
        f(&self.state.lock().entries)
    }

    /// Take every queued entry, oldest first. Consumer side only.
    pub fn drain(&self) -> Vec<QueueEntry> {
        std::mem::take(&mut self.state.lock().entries)
    }

    /// Refuse further pushes. Entries already queued stay until drained.
    pub fn seal(&self) {
        self.state.lock().sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }
}
