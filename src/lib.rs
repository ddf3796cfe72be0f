//! Usertour: lazy-loading client stub
//!
//! A client handle that host code can call before the real Usertour.js
//! implementation has been fetched. Calls are recorded in order into a shared
//! queue, loading is triggered at most once at a time, and promise-returning
//! calls hand back an awaitable that settles when the real implementation
//! replays the queue.

pub mod args;
pub mod cli;
pub mod client;
pub mod config;
pub mod deferred;
pub mod error;
pub mod loader;
pub mod logging;
pub mod method;
pub mod queue;
pub mod registry;
pub mod target;

pub use args::{Attributes, CallArg, Callback, InitOptions, InitUserInfo, StartOptions};
pub use client::{Backend, CallOutcome, Client, ClientState};
pub use deferred::{CallId, CallResult, Deferred, DeferredResult};
pub use error::{ApiError, AttachError, CallError, LoadError};
pub use loader::{LoadHandle, LoadStatus, Loader, ResourceAcquirer};
pub use method::{CallingConvention, Method};
pub use queue::{CallQueue, QueueEntry};
pub use registry::Registry;
