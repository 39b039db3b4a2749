use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments shared by the audit commands
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Common subcommands that only inspect the configuration
#[derive(Subcommand, Debug, Clone)]
pub enum CommonCommands {
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::{Configuration, TENANT_PLACEHOLDER};
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Log level derived from the verbosity flags
    pub fn log_level(args: &CommonArgs) -> &'static str {
        if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Initialize logging based on CLI arguments, `RUST_LOG` wins when set
    pub fn init_logging(args: &CommonArgs) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(args)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format, password masked
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        let config = config.redacted();
        if json {
            let json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("Artefact Audit Configuration:");
            println!("=============================");
            println!("Asset manager URL: {}", config.assetmanager.url);
            match &config.assetmanager.url_pattern {
                Some(pattern) => println!("Asset manager URL pattern: {pattern}"),
                None => println!("Asset manager URL pattern: none"),
            }
            for (tenant, url) in &config.assetmanager.tenant_urls {
                println!("Tenant URL: {tenant} -> {url}");
            }
            println!("Request timeout: {:?}", config.assetmanager.timeout);
            println!("Digest user: {}", config.digest.user);
            println!("Digest password: {}", config.digest.password);

            if config.inventory.distribution_dirs.is_empty() {
                println!("Distribution directories: none");
            }
            for dir in &config.inventory.distribution_dirs {
                println!("Distribution directory: {}", dir.display());
            }
            if config.inventory.tenants.is_empty() {
                println!("Tenants: all");
            } else {
                println!("Tenants: {}", config.inventory.tenants.join(", "));
            }
        }
        Ok(())
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        if config.assetmanager.url.trim().is_empty() {
            anyhow::bail!("Asset manager URL cannot be empty");
        }

        if let Some(pattern) = &config.assetmanager.url_pattern {
            if !pattern.contains(TENANT_PLACEHOLDER) {
                anyhow::bail!(
                    "Asset manager URL pattern '{pattern}' must contain the tenant placeholder '{TENANT_PLACEHOLDER}'"
                );
            }
        }

        if config.assetmanager.timeout.is_zero() {
            anyhow::bail!("Asset manager timeout must be positive");
        }

        if config.digest.user.trim().is_empty() {
            anyhow::bail!("Digest user cannot be empty");
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Handle the configuration-only commands
    pub fn handle_common_command(command: &CommonCommands, config: &Configuration) -> Result<()> {
        match command {
            CommonCommands::Config { json } => display_config(config, *json),
            CommonCommands::Validate => validate_config(config),
            CommonCommands::Version => {
                println!("{}", version_info());
                Ok(())
            }
        }
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
