//! Dead distribution artefact audit.
//!
//! Finds distribution artefacts whose media package no longer exists in the
//! asset manager. Nothing is deleted here, the result is a filtered inventory
//! that an operator (or a later cleanup step) can act upon.
//!
//! ## Safety Principles
//!
//! 1. **Conservative Classification**: only an explicit "does not exist" marks
//!    a media package as dead, a failed check always keeps it
//! 2. **Resilience**: individual check failures are reported as notices and
//!    never abort the scan
//! 3. **Read Only**: the source inventory is borrowed, never modified
//!
//! ## Architecture
//!
//! - `inventory`: inventory model, counting, JSON and filesystem IO
//! - `checker`: the existence check boundary
//! - `progress`: progress reporting boundary plus console and log reporters
//! - `classifier`: the dead artefact classification
//!
//! ## Usage
//!
//! ```no_run
//! use audit::{ConsoleProgress, classify, inventory};
//! # fn checker() -> impl audit::ExistenceChecker {
//! #     |_: &str, _: &str| -> Result<bool, audit::CheckFailed> { Ok(true) }
//! # }
//!
//! let inventory = inventory::load_json("inventory.json")?;
//! let dead = classify(&inventory, &checker(), &mut ConsoleProgress::stderr());
//! inventory::write_json("dead.json", &dead)?;
//! # Ok::<(), audit::InventoryError>(())
//! ```

pub mod checker;
pub mod classifier;
pub mod inventory;
pub mod progress;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use checker::{CheckFailed, ExistenceChecker};
pub use classifier::{Classification, ScanSummary, classify, finished_message, scan};
pub use inventory::{DeadInventory, Inventory, InventoryError};
pub use progress::{ConsoleProgress, LogProgress, ProgressReporter};
