use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    app::{load_config, load_config_from, AppState, Config},
    backend::HttpBackend,
    cli::{handle_command, Cli},
    utils::{log_info, log_warn},
};

use super::non_interactive::{format_result, run_once};
use super::terminal::run_interactive;

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        // Load configuration
        let mut config = if let Some(config_path) = &cli.config {
            load_config_from(std::slice::from_ref(config_path))
                .with_context(|| format!("Failed to load {}", config_path.display()))?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    log_warn("config", format!("{}. Using defaults.", e));
                    Config::default()
                }
            }
        };

        // CLI flags win over every config layer
        if let Some(base_url) = &cli.base_url {
            config.backend.base_url = base_url.clone();
        }
        if cli.no_color {
            config.ui.color = false;
        }

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator. Returns `false` if a one-shot exchange failed.
    pub async fn run(self) -> Result<bool> {
        if !self.config.ui.color {
            colored::control::set_override(false);
        }

        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(true); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        log_info("backend", &self.config.backend.base_url);
        let backend = HttpBackend::new(&self.config.backend)?;
        let mut state = AppState::new(Arc::new(backend));

        if let Some(prompt) = &self.cli.prompt {
            let result = run_once(&mut state, prompt).await;
            println!("{}", format_result(&result, self.cli.output_format));
            return Ok(result.succeeded());
        }

        run_interactive(state, self.config.ui.clone()).await?;
        Ok(true)
    }
}
