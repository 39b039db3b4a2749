use super::{InventoryArgs, write_output};
use anyhow::Result;
use audit::inventory::{artefact_count, media_package_count};
use clap::Args;
use common::Configuration;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[command(flatten)]
    inventory: InventoryArgs,

    /// Write the inventory to this JSON file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl ScanArgs {
    pub fn run(&self, config: &Configuration) -> Result<()> {
        let inventory = self.inventory.resolve(config)?;
        log::info!(
            "Found {} distribution artefact(s) of {} media package(s) in {} tenant(s)",
            artefact_count(&inventory),
            media_package_count(&inventory),
            inventory.len()
        );
        write_output(self.output.as_deref(), &inventory)
    }
}
