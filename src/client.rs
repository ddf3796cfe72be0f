//! Call Interceptor
//!
//! The client handle host code calls into. Until the real implementation is
//! attached every method is intercepted according to its calling convention in
//! [`METHOD_TABLE`](crate::method::METHOD_TABLE):
//!
//! - void-queued: trigger a load, queue the call, return nothing;
//! - promise-queued: trigger a load, queue the call with a [`Deferred`], hand the
//!   caller the paired [`DeferredResult`];
//! - synchronous-default: return the declared default, no load, no queueing.
//!
//! The interceptor body never awaits, so entries land in the queue in call order.
//! A promise-queued call whose load never succeeds stays pending forever; no
//! timeout is applied.
//!
//! Attaching the real implementation seals the queue and lets it drain before
//! the client reports itself active. A call that finds the queue sealed while
//! the drain is running waits for the drain to finish, so every queued call
//! executes ahead of it. Calls made by the implementation itself from inside the
//! drain go straight through.

use crate::args::{Attributes, CallArg, Callback, InitOptions, StartOptions};
use crate::deferred::{CallId, CallResult, Deferred, DeferredResult};
use crate::error::AttachError;
use crate::loader::{LoadHandle, LoadStatus, Loader};
use crate::method::{CallingConvention, Method};
use crate::queue::{CallQueue, QueueEntry};
use futures::future::BoxFuture;
use once_cell::sync::OnceCell;
use parking_lot::ReentrantMutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Contract the real implementation honours once loaded.
pub trait Backend: Send + Sync {
    /// Take over the queue: drain it in order, invoke each call with its recorded
    /// arguments and settle any attached [`Deferred`] with the outcome.
    fn activate(&self, queue: &CallQueue);

    fn call_void(&self, method: Method, args: Vec<CallArg>);

    /// Start the call now; the returned future yields its outcome.
    fn call_async(&self, method: Method, args: Vec<CallArg>) -> BoxFuture<'static, CallResult>;

    fn call_sync(&self, method: Method, args: Vec<CallArg>) -> Value;
}

/// Lifecycle of the client as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Nothing has triggered a load yet, or the last attempt failed.
    Stub,
    /// A load is in flight or finished, but the real implementation has not attached.
    Loading,
    /// The real implementation is attached and the queue has drained. Terminal.
    Active,
}

/// Result of the generic [`Client::call`] routine.
#[derive(Debug)]
pub enum CallOutcome {
    /// Void method; nothing to return.
    Void,
    /// Promise method; settles when the call has been executed.
    Pending(DeferredResult),
    /// Synchronous method; answered immediately.
    Immediate(Value),
}

struct ClientInner {
    queue: CallQueue,
    loader: Loader,
    backend: OnceCell<Arc<dyn Backend>>,
    /// Set once `Backend::activate` has returned.
    active: AtomicBool,
    /// Held by `attach` for the whole seal-and-drain sequence.
    activation: ReentrantMutex<()>,
    runtime: Handle,
}

/// Process-wide client handle. Clones refer to the same client.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

fn push_optional(args: &mut Vec<CallArg>, value: Option<Value>) {
    if let Some(value) = value {
        args.push(CallArg::Value(value));
    }
}

fn nullable_callback(callback: Option<Callback>) -> CallArg {
    match callback {
        Some(callback) => CallArg::Callback(callback),
        None => CallArg::Value(Value::Null),
    }
}

impl Client {
    pub fn new(queue: CallQueue, loader: Loader, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                queue,
                loader,
                backend: OnceCell::new(),
                active: AtomicBool::new(false),
                activation: ReentrantMutex::new(()),
                runtime,
            }),
        }
    }

    /// Generic interceptor: dispatch by the method's calling convention.
    pub fn call(&self, method: Method, args: Vec<CallArg>) -> CallOutcome {
        match method.convention() {
            CallingConvention::VoidQueued => {
                self.call_void(method, args);
                CallOutcome::Void
            }
            CallingConvention::PromiseQueued => CallOutcome::Pending(self.call_promise(method, args)),
            CallingConvention::SyncDefault(default) => match self.attached_backend() {
                Some(backend) => CallOutcome::Immediate(backend.call_sync(method, args)),
                None => CallOutcome::Immediate(default.to_value()),
            },
        }
    }

    fn call_void(&self, method: Method, args: Vec<CallArg>) {
        self.dispatch(QueueEntry::new(CallId::next(), method, None, args));
    }

    fn call_promise(&self, method: Method, args: Vec<CallArg>) -> DeferredResult {
        let id = CallId::next();
        let (deferred, result) = Deferred::pair(id);
        self.dispatch(QueueEntry::new(id, method, Some(deferred), args));
        result
    }

    /// The attached implementation, once it may take direct calls.
    ///
    /// While an attach is draining the queue on another thread this blocks until
    /// the drain is over. On the draining thread itself it returns immediately.
    fn attached_backend(&self) -> Option<&Arc<dyn Backend>> {
        if self.inner.active.load(Ordering::Acquire) {
            return self.inner.backend.get();
        }
        self.inner.backend.get()?;
        let _drained = self.inner.activation.lock();
        self.inner.backend.get()
    }

    fn dispatch(&self, entry: QueueEntry) {
        if let Some(backend) = self.attached_backend() {
            self.forward(backend, entry);
            return;
        }

        // Fire and forget: failures surface through the loader's diagnostics.
        let _ = self.inner.loader.ensure_loaded();

        if let Err(entry) = self.inner.queue.push(entry) {
            match self.attached_backend() {
                Some(backend) => self.forward(backend, entry),
                None => warn!(method = %entry.method(), "Queue sealed without an attached implementation; call dropped"),
            }
        }
    }

    /// Invoke the implementation in the caller's context; only settling a
    /// deferred is left to the runtime.
    fn forward(&self, backend: &Arc<dyn Backend>, entry: QueueEntry) {
        let (method, deferred, args) = entry.into_parts();
        debug!(method = %method, "Forwarding call to attached implementation");
        match deferred {
            None => backend.call_void(method, args),
            Some(deferred) => {
                let outcome = backend.call_async(method, args);
                self.inner.runtime.spawn(async move {
                    deferred.settle(outcome.await);
                });
            }
        }
    }

    /// Install the real implementation. Seals the queue and hands it over for
    /// draining; the client turns active once the drain returns.
    pub fn attach(&self, backend: Arc<dyn Backend>) -> Result<(), AttachError> {
        let _activation = self.inner.activation.lock();
        self.inner
            .backend
            .set(Arc::clone(&backend))
            .map_err(|_| AttachError::AlreadyActive)?;
        self.inner.queue.seal();
        info!(pending = self.inner.queue.len(), "Real implementation attached");
        backend.activate(&self.inner.queue);
        self.inner.active.store(true, Ordering::Release);
        debug!("Queue drained; client active");
        Ok(())
    }

    /// Trigger loading the real implementation.
    pub fn load(&self) -> LoadHandle {
        self.inner.loader.ensure_loaded()
    }

    /// True until the real implementation is attached and the queue has drained.
    pub fn is_stubbed(&self) -> bool {
        !self.inner.active.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ClientState {
        if !self.is_stubbed() {
            return ClientState::Active;
        }
        match self.inner.loader.status() {
            LoadStatus::Idle => ClientState::Stub,
            LoadStatus::Loading | LoadStatus::Loaded => ClientState::Loading,
        }
    }

    pub fn queue(&self) -> &CallQueue {
        &self.inner.queue
    }

    pub fn loader(&self) -> &Loader {
        &self.inner.loader
    }

    /// True when both handles refer to the same client.
    pub fn ptr_eq(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn init(&self, env_id: &str, options: Option<InitOptions>) {
        let mut args = vec![CallArg::from(env_id)];
        push_optional(&mut args, options.map(|o| o.to_value()));
        self.call_void(Method::Init, args);
    }

    pub fn identify(&self, user_id: &str, attributes: Option<Attributes>) -> DeferredResult {
        let mut args = vec![CallArg::from(user_id)];
        push_optional(&mut args, attributes.map(Value::Object));
        self.call_promise(Method::Identify, args)
    }

    pub fn identify_anonymous(&self, attributes: Option<Attributes>) -> DeferredResult {
        let mut args = Vec::new();
        push_optional(&mut args, attributes.map(Value::Object));
        self.call_promise(Method::IdentifyAnonymous, args)
    }

    pub fn update_user(&self, attributes: Attributes) -> DeferredResult {
        self.call_promise(Method::UpdateUser, vec![CallArg::from(attributes)])
    }

    pub fn group(&self, group_id: &str, attributes: Option<Attributes>) -> DeferredResult {
        let mut args = vec![CallArg::from(group_id)];
        push_optional(&mut args, attributes.map(Value::Object));
        self.call_promise(Method::Group, args)
    }

    pub fn update_group(&self, attributes: Attributes) -> DeferredResult {
        self.call_promise(Method::UpdateGroup, vec![CallArg::from(attributes)])
    }

    pub fn track(&self, event_name: &str, attributes: Option<Attributes>) -> DeferredResult {
        let mut args = vec![CallArg::from(event_name)];
        push_optional(&mut args, attributes.map(Value::Object));
        self.call_promise(Method::Track, args)
    }

    pub fn start(&self, content_id: &str, options: Option<StartOptions>) -> DeferredResult {
        let mut args = vec![CallArg::from(content_id)];
        push_optional(&mut args, options.map(|o| o.to_value()));
        self.call_promise(Method::Start, args)
    }

    pub fn end_all(&self) -> DeferredResult {
        self.call_promise(Method::EndAll, Vec::new())
    }

    pub fn reset(&self) {
        self.call_void(Method::Reset, Vec::new());
    }

    pub fn remount(&self) {
        self.call_void(Method::Remount, Vec::new());
    }

    pub fn on(&self, event_name: &str, listener: Callback) {
        self.call_void(
            Method::On,
            vec![CallArg::from(event_name), CallArg::Callback(listener)],
        );
    }

    pub fn off(&self, event_name: &str, listener: Callback) {
        self.call_void(
            Method::Off,
            vec![CallArg::from(event_name), CallArg::Callback(listener)],
        );
    }

    pub fn set_base_z_index(&self, base_z_index: i64) {
        self.call_void(Method::SetBaseZIndex, vec![CallArg::Value(base_z_index.into())]);
    }

    pub fn set_target_missing_seconds(&self, seconds: u32) {
        self.call_void(
            Method::SetTargetMissingSeconds,
            vec![CallArg::Value(seconds.into())],
        );
    }

    /// `None` clears a previously set selector.
    pub fn set_custom_input_selector(&self, selector: Option<&str>) {
        let arg = selector.map(CallArg::from).unwrap_or(CallArg::Value(Value::Null));
        self.call_void(Method::SetCustomInputSelector, vec![arg]);
    }

    pub fn set_custom_navigate(&self, navigate: Option<Callback>) {
        self.call_void(Method::SetCustomNavigate, vec![nullable_callback(navigate)]);
    }

    pub fn set_url_filter(&self, filter: Option<Callback>) {
        self.call_void(Method::SetUrlFilter, vec![nullable_callback(filter)]);
    }

    pub fn set_link_url_decorator(&self, decorator: Option<Callback>) {
        self.call_void(Method::SetLinkUrlDecorator, vec![nullable_callback(decorator)]);
    }

    pub fn set_custom_scroll_into_view(&self, scroll: Option<Callback>) {
        self.call_void(
            Method::SetCustomScrollIntoView,
            vec![nullable_callback(scroll)],
        );
    }

    pub fn set_server_endpoint(&self, endpoint: &str) {
        self.call_void(Method::SetServerEndpoint, vec![CallArg::from(endpoint)]);
    }

    /// `false` until the real implementation answers.
    pub fn is_identified(&self) -> bool {
        match self.call(Method::IsIdentified, Vec::new()) {
            CallOutcome::Immediate(value) => value.as_bool().unwrap_or(false),
            _ => false,
        }
    }
}
