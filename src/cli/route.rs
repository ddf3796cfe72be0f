//! CLI route: single route table and run context.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_load_report, format_method_table, format_script_source};
use crate::config::{ConfigLoader, SnippetConfig};
use crate::error::ApiError;
use crate::loader::HttpAcquirer;
use crate::registry::{self, Registry};
use crate::target::resolve_script_source;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime context for CLI execution: the resolved configuration.
pub struct RunContext {
    config: SnippetConfig,
    config_path: Option<PathBuf>,
}

impl RunContext {
    /// Create run context from an optional config path. Uses ConfigLoader only.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Create run context from an already resolved configuration.
    pub fn from_config(config: SnippetConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Target { user_agent, format } => {
                let user_agent = self.user_agent(user_agent.as_deref());
                let source =
                    resolve_script_source(&self.config.env_vars, &self.config.url_prefix, &user_agent);
                Ok(format_script_source(&source, format))
            }
            Commands::Methods => Ok(format_method_table()),
            Commands::Load {
                user_agent,
                env_id,
                attempts,
            } => self.handle_load(user_agent.as_deref(), env_id, *attempts),
            Commands::Config => {
                if let Some(path) = &self.config_path {
                    info!(config_path = %path.display(), "Rendering configuration");
                }
                ConfigLoader::to_toml(&self.config)
            }
        }
    }

    fn user_agent(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_string)
            .or_else(|| self.config.user_agent.clone())
            .unwrap_or_default()
    }

    fn handle_load(
        &self,
        user_agent: Option<&str>,
        env_id: &str,
        attempts: u32,
    ) -> Result<String, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Runtime(format!("Failed to start runtime: {}", e)))?;

        let mut config = self.config.clone();
        config.user_agent = Some(self.user_agent(user_agent));
        let acquirer = Arc::new(HttpAcquirer::new()?);
        let registry = registry::install_global(Registry::new(
            &config,
            acquirer,
            runtime.handle().clone(),
        ));
        let client = registry.get_or_create_client();
        client.init(env_id, None);

        let outcome = runtime.block_on(async {
            let mut outcome = client.load().await;
            for _ in 1..attempts.max(1) {
                if outcome.is_ok() {
                    break;
                }
                warn!("Retrying Usertour.js load");
                outcome = client.load().await;
            }
            outcome
        });

        let loader = client.loader();
        let source = loader.select_source();
        let bytes = loader.loaded_script().map(|script| script.body.len());
        let report = format_load_report(&source, loader.attempts(), bytes, client.queue().len());
        match outcome {
            Ok(()) => Ok(report),
            Err(err) => {
                eprintln!("{}", report);
                Err(ApiError::Load(err))
            }
        }
    }
}
