use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    backend::HttpBackend,
};

use super::Commands;

/// Handle CLI subcommands. Returns `false` when the chat should start.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing medassist configuration...");
            let path = init_config()?;
            println!("Configuration ready at: {}", path.display());
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("medassist v{}", env!("CARGO_PKG_VERSION"));
    println!("   Conversational medical appointment scheduling");
}

/// Show backend reachability and configuration location
async fn show_status(config: &Config) -> Result<()> {
    println!("medassist Status:");
    println!();

    let backend = HttpBackend::new(&config.backend)?;
    match backend.ping().await {
        Ok(true) => println!(
            "  {} Backend: reachable at {}",
            "[OK]".green(),
            backend.base_url()
        ),
        Ok(false) => println!(
            "  {} Backend: answered with an error at {}",
            "[WARNING]".yellow(),
            backend.base_url()
        ),
        Err(e) => println!(
            "  {} Backend: unreachable at {} ({})",
            "[ERROR]".red(),
            backend.base_url(),
            e
        ),
    }

    if let Ok(dir) = get_config_dir() {
        let config_path = dir.join("config.toml");
        if config_path.exists() {
            println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
        } else {
            println!(
                "  {} Configuration: Not found (using defaults)",
                "[WARNING]".yellow()
            );
        }
    }

    println!();
    Ok(())
}
