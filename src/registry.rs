//! Process-wide Registry
//!
//! Holds the single client handle, the pending-call queue and the override
//! variables. A registry is passed explicitly to whoever needs it; a process that
//! wants ambient access installs one registry into the global slot with
//! [`install_global`]. Installing is single-shot: later installs are no-ops that
//! return the registry already in place.

use crate::client::Client;
use crate::config::{EnvVars, SnippetConfig};
use crate::loader::{Loader, LoaderSettings, ResourceAcquirer};
use crate::queue::CallQueue;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

static GLOBAL: OnceCell<Registry> = OnceCell::new();

pub struct Registry {
    client: OnceCell<Client>,
    queue: CallQueue,
    env_vars: Arc<RwLock<EnvVars>>,
    settings: LoaderSettings,
    acquirer: Arc<dyn ResourceAcquirer>,
    runtime: Handle,
}

impl Registry {
    /// Build an empty registry. No client exists until [`Registry::get_or_create_client`].
    pub fn new(config: &SnippetConfig, acquirer: Arc<dyn ResourceAcquirer>, runtime: Handle) -> Self {
        Self {
            client: OnceCell::new(),
            queue: CallQueue::new(),
            env_vars: Arc::new(RwLock::new(config.env_vars.clone())),
            settings: LoaderSettings {
                url_prefix: config.url_prefix.clone(),
                user_agent: config.user_agent.clone().unwrap_or_default(),
            },
            acquirer,
            runtime,
        }
    }

    /// Return the client, creating the stub on first use. Never fails; later
    /// calls return the same handle untouched.
    pub fn get_or_create_client(&self) -> Client {
        self.client
            .get_or_init(|| {
                debug!("Creating stub client");
                let loader = Loader::new(
                    Arc::clone(&self.env_vars),
                    self.settings.clone(),
                    Arc::clone(&self.acquirer),
                    self.runtime.clone(),
                );
                Client::new(self.queue.clone(), loader, self.runtime.clone())
            })
            .clone()
    }

    /// The client, if one has been created.
    pub fn client(&self) -> Option<&Client> {
        self.client.get()
    }

    pub fn queue(&self) -> &CallQueue {
        &self.queue
    }

    pub fn env_vars(&self) -> EnvVars {
        self.env_vars.read().clone()
    }

    /// Replace the override variables. Takes effect for the next load attempt.
    pub fn set_env_vars(&self, env_vars: EnvVars) {
        *self.env_vars.write() = env_vars;
    }
}

/// Install `registry` as the process-wide registry, or return the one already installed.
pub fn install_global(registry: Registry) -> &'static Registry {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if !installed {
        debug!("Global registry already installed; reusing existing instance");
    }
    global
}

/// The process-wide registry, if installed.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}
