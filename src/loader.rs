//! Loader
//!
//! Owns the at-most-once asynchronous fetch of the real implementation.
//!
//! [`Loader::ensure_loaded`] may be called any number of times from anywhere,
//! including from inside an in-flight acquisition. Every caller gets a clone of
//! the same [`LoadHandle`]. The handle is recorded as in-flight state before the
//! acquisition task is spawned, so two near-simultaneous first calls cannot start
//! two fetches. A failed attempt unmounts its script tag and returns the loader to
//! idle so the next call retries.

use crate::config::EnvVars;
use crate::error::LoadError;
use crate::target::{resolve_script_source, ScriptSource};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

pub mod acquire;

pub use acquire::{HttpAcquirer, LoadedScript, ResourceAcquirer};

/// Cloneable awaitable shared by every caller of [`Loader::ensure_loaded`].
pub type LoadHandle = Shared<BoxFuture<'static, Result<(), LoadError>>>;

/// Observable load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
}

enum LoadState {
    Idle,
    Pending { attempt: u64, handle: LoadHandle },
    Loaded { handle: LoadHandle },
}

/// Inputs to build variant selection that are fixed for the loader's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    pub url_prefix: String,
    pub user_agent: String,
}

/// A script element mounted into the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub attempt: u64,
    pub source: ScriptSource,
    pub loaded: bool,
}

/// The host document's script container.
#[derive(Debug, Default)]
pub struct ScriptHead {
    tags: Mutex<Vec<ScriptTag>>,
}

impl ScriptHead {
    fn mount(&self, attempt: u64, source: ScriptSource) {
        self.tags.lock().push(ScriptTag {
            attempt,
            source,
            loaded: false,
        });
    }

    fn mark_loaded(&self, attempt: u64) {
        if let Some(tag) = self.tags.lock().iter_mut().find(|t| t.attempt == attempt) {
            tag.loaded = true;
        }
    }

    fn unmount(&self, attempt: u64) {
        self.tags.lock().retain(|t| t.attempt != attempt);
    }

    pub fn tags(&self) -> Vec<ScriptTag> {
        self.tags.lock().clone()
    }
}

struct LoaderInner {
    state: Mutex<LoadState>,
    attempts: AtomicU64,
    env_vars: Arc<RwLock<EnvVars>>,
    settings: LoaderSettings,
    acquirer: Arc<dyn ResourceAcquirer>,
    head: ScriptHead,
    loaded: Mutex<Option<LoadedScript>>,
    runtime: Handle,
}

/// At-most-once loader for the real implementation.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

impl Loader {
    /// Create a loader. Acquisition tasks are spawned on `runtime`.
    ///
    /// Override variables are read when a load starts, not here.
    pub fn new(
        env_vars: Arc<RwLock<EnvVars>>,
        settings: LoaderSettings,
        acquirer: Arc<dyn ResourceAcquirer>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                state: Mutex::new(LoadState::Idle),
                attempts: AtomicU64::new(0),
                env_vars,
                settings,
                acquirer,
                head: ScriptHead::default(),
                loaded: Mutex::new(None),
                runtime,
            }),
        }
    }

    /// Start loading unless a load is in flight or has succeeded; never blocks.
    pub fn ensure_loaded(&self) -> LoadHandle {
        let mut state = self.inner.state.lock();
        match &*state {
            LoadState::Pending { handle, .. } | LoadState::Loaded { handle } => {
                return handle.clone();
            }
            LoadState::Idle => {}
        }

        let attempt = self.inner.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let source = self.select_source();
        debug!(
            attempt,
            url = %source.url,
            target = %source.target,
            module = source.module,
            "Loading Usertour.js"
        );
        self.inner.head.mount(attempt, source.clone());

        let inner = Arc::clone(&self.inner);
        let handle: LoadHandle = async move { inner.acquire(attempt, source).await }
            .boxed()
            .shared();
        *state = LoadState::Pending {
            attempt,
            handle: handle.clone(),
        };
        drop(state);

        self.inner.runtime.spawn(handle.clone());
        handle
    }

    /// The source the next load would fetch, given the current override variables.
    pub fn select_source(&self) -> ScriptSource {
        let env = self.inner.env_vars.read();
        resolve_script_source(
            &env,
            &self.inner.settings.url_prefix,
            &self.inner.settings.user_agent,
        )
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.inner.state.lock() {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Pending { .. } => LoadStatus::Loading,
            LoadState::Loaded { .. } => LoadStatus::Loaded,
        }
    }

    /// Number of acquisition attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// Script tags currently mounted.
    pub fn mounted_scripts(&self) -> Vec<ScriptTag> {
        self.inner.head.tags()
    }

    /// The script fetched by the successful attempt, if any.
    pub fn loaded_script(&self) -> Option<LoadedScript> {
        self.inner.loaded.lock().clone()
    }
}

impl LoaderInner {
    async fn acquire(self: Arc<Self>, attempt: u64, source: ScriptSource) -> Result<(), LoadError> {
        match self.acquirer.acquire(&source).await {
            Ok(script) => {
                self.head.mark_loaded(attempt);
                info!(
                    attempt,
                    url = %source.url,
                    bytes = script.body.len(),
                    "Loaded Usertour.js"
                );
                *self.loaded.lock() = Some(script);
                let mut state = self.state.lock();
                if let LoadState::Pending { attempt: current, handle } = &*state {
                    if *current == attempt {
                        let handle = handle.clone();
                        *state = LoadState::Loaded { handle };
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.head.unmount(attempt);
                {
                    let mut state = self.state.lock();
                    if matches!(&*state, LoadState::Pending { attempt: current, .. } if *current == attempt)
                    {
                        *state = LoadState::Idle;
                    }
                }
                warn!(attempt, url = %source.url, error = %err, "Could not load Usertour.js");
                Err(err)
            }
        }
    }
}
