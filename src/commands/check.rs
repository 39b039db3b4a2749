use super::{InventoryArgs, write_output};
use anyhow::{Context, Result};
use assetmanager::AssetManagerChecker;
use audit::{ConsoleProgress, LogProgress, ProgressReporter, ScanSummary};
use clap::Args;
use common::Configuration;
use common::cli::utils;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    inventory: InventoryArgs,

    /// Write the dead artefacts to this JSON file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl CheckArgs {
    pub fn run(&self, config: &Configuration, quiet: bool) -> Result<()> {
        utils::validate_config(config)?;

        let interactive = !self.no_progress && !quiet && std::io::stderr().is_terminal();
        let summary = if interactive {
            self.execute(config, ConsoleProgress::stderr())?
        } else {
            self.execute(config, LogProgress)?
        };

        if summary.failed > 0 {
            log::warn!(
                "{} media package(s) could not be checked, their artefacts were kept",
                summary.failed
            );
        }
        Ok(())
    }

    fn execute<P: ProgressReporter>(
        &self,
        config: &Configuration,
        progress: P,
    ) -> Result<ScanSummary> {
        let inventory = self.inventory.resolve(config)?;
        let checker = AssetManagerChecker::from_config(config)
            .context("Failed to create asset manager client")?;

        let classification = audit::scan(&inventory, &checker, progress);
        classification.summary.log();

        write_output(self.output.as_deref(), &classification.dead)?;
        Ok(classification.summary)
    }
}
