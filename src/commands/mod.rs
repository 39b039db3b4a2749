pub mod check;
pub mod scan;

use anyhow::{Context, Result};
use audit::Inventory;
use clap::{Parser, Subcommand};
use common::Configuration;
use common::cli::{CommonArgs, CommonCommands, utils};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Artefact audit: find distribution artefacts of deleted media packages
#[derive(Parser)]
#[command(name = "artefact-audit", version, about)]
pub struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find distribution artefacts whose media package no longer exists
    Check(check::CheckArgs),
    /// Build the distribution artefact inventory and print it
    Scan(scan::ScanArgs),
    #[command(flatten)]
    Common(CommonCommands),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        utils::init_logging(&self.common);
        let config = utils::load_config(self.common.config.as_ref())?;

        match self.command {
            Commands::Check(args) => args.run(&config, self.common.quiet),
            Commands::Scan(args) => args.run(&config),
            Commands::Common(command) => utils::handle_common_command(&command, &config),
        }
    }
}

/// Where the inventory comes from and which tenants to keep
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InventoryArgs {
    /// Read the inventory from this JSON file instead of scanning the distribution directories
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Scan this distribution directory, may be repeated (overrides the configuration)
    #[arg(long = "dir")]
    dirs: Vec<PathBuf>,

    /// Only audit this tenant, may be repeated (overrides the configuration)
    #[arg(long = "tenant")]
    tenants: Vec<String>,
}

impl InventoryArgs {
    /// Load or scan the inventory, restricted to the selected tenants
    pub fn resolve(&self, config: &Configuration) -> Result<Inventory> {
        let tenants = if self.tenants.is_empty() {
            config.inventory.tenants.clone()
        } else {
            self.tenants.clone()
        };

        let mut inventory = match &self.inventory {
            Some(path) => {
                log::info!("Loading inventory from: {}", path.display());
                audit::inventory::load_json(path).context("Failed to load inventory")?
            }
            None => {
                let dirs = if self.dirs.is_empty() {
                    &config.inventory.distribution_dirs
                } else {
                    &self.dirs
                };
                if dirs.is_empty() {
                    anyhow::bail!(
                        "No inventory file given and no distribution directories configured"
                    );
                }
                audit::inventory::scan_distribution_dirs(dirs, &tenants)
                    .context("Failed to scan distribution directories")?
            }
        };

        if !tenants.is_empty() {
            inventory.retain(|tenant, _| tenants.contains(tenant));
        }
        Ok(inventory)
    }
}

/// Write JSON to the file, or to stdout without a file
pub fn write_output<T: serde::Serialize + ?Sized>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => {
            audit::inventory::write_json(path, value)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)
                .context("Failed to serialize output")?;
            writeln!(stdout).context("Failed to write output")?;
        }
    }
    Ok(())
}
