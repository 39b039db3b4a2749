//! Distribution artefact inventory.
//!
//! An inventory maps tenant -> media package -> artefacts. Artefacts are opaque
//! to the audit, the binary uses file paths.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Media package id -> artefacts of one tenant.
pub type TenantArtefacts<A = String> = BTreeMap<String, Vec<A>>;

/// Tenant id -> media package id -> artefacts.
pub type Inventory<A = String> = BTreeMap<String, TenantArtefacts<A>>;

/// Dead subset of an [`Inventory`], borrowing keys and artefacts from it.
pub type DeadInventory<'a, A = String> = BTreeMap<&'a str, BTreeMap<&'a str, &'a [A]>>;

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid inventory JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Distribution directory {0} does not exist")]
    MissingDirectory(PathBuf),
}

impl InventoryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Number of (tenant, media package) pairs.
pub fn media_package_count<A>(inventory: &Inventory<A>) -> usize {
    inventory.values().map(BTreeMap::len).sum()
}

/// Number of artefacts across all tenants and media packages.
pub fn artefact_count<A>(inventory: &Inventory<A>) -> usize {
    inventory
        .values()
        .flat_map(BTreeMap::values)
        .map(Vec::len)
        .sum()
}

/// Detach a dead inventory from the inventory it borrows from.
pub fn to_owned_inventory<A: Clone>(dead: &DeadInventory<'_, A>) -> Inventory<A> {
    dead.iter()
        .map(|(tenant, media_packages)| {
            let media_packages = media_packages
                .iter()
                .map(|(mp, artefacts)| (mp.to_string(), artefacts.to_vec()))
                .collect();
            (tenant.to_string(), media_packages)
        })
        .collect()
}

/// Read an inventory from a JSON file.
pub fn load_json(path: impl AsRef<Path>) -> Result<Inventory, InventoryError> {
    load_json_as(path)
}

/// Read an inventory with a custom artefact type from a JSON file.
pub fn load_json_as<A: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<Inventory<A>, InventoryError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| InventoryError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| InventoryError::json(path, e))
}

/// Write any inventory (dead or complete) as pretty printed JSON.
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    inventory: &T,
) -> Result<(), InventoryError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| InventoryError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, inventory)
        .map_err(|e| InventoryError::json(path, e))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| InventoryError::io(path, e))
}

/// Build an inventory from distribution directories on disk.
///
/// Each directory is expected to be laid out as
/// `<dir>/<tenant>/<channel>/<media package>/<element>/<file>`. Files of the
/// same media package found in several channels or directories are merged.
/// Dot entries and names that are not valid UTF-8 are skipped. Symbolic links
/// are never followed, a link inside a media package is listed as an artefact.
/// When `tenants` is not empty only those tenants are scanned.
pub fn scan_distribution_dirs(
    dirs: &[PathBuf],
    tenants: &[String],
) -> Result<Inventory, InventoryError> {
    let mut inventory = Inventory::new();

    for dir in dirs {
        if !dir.is_dir() {
            return Err(InventoryError::MissingDirectory(dir.clone()));
        }

        tracing::info!(dir = %dir.display(), "Scanning distribution directory");

        for (tenant, tenant_dir) in subdirectories(dir)? {
            if !tenants.is_empty() && !tenants.contains(&tenant) {
                tracing::debug!(tenant = %tenant, "Skipping tenant not selected for scan");
                continue;
            }

            for (channel, channel_dir) in subdirectories(&tenant_dir)? {
                for (media_package, mp_dir) in subdirectories(&channel_dir)? {
                    let mut files = Vec::new();
                    collect_files(&mp_dir, &mut files)?;

                    tracing::trace!(
                        tenant = %tenant,
                        channel = %channel,
                        media_package = %media_package,
                        files = files.len(),
                        "Found distributed media package"
                    );

                    let artefacts = inventory
                        .entry(tenant.clone())
                        .or_default()
                        .entry(media_package)
                        .or_default();
                    artefacts.extend(files);
                }
            }
        }
    }

    for artefacts in inventory.values_mut().flat_map(BTreeMap::values_mut) {
        artefacts.sort();
        artefacts.dedup();
    }

    tracing::info!(
        tenants = inventory.len(),
        media_packages = media_package_count(&inventory),
        artefacts = artefact_count(&inventory),
        "Built distribution artefact inventory"
    );

    Ok(inventory)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Visible file name of an entry, `None` for dot entries and names that are not UTF-8.
fn visible_name(entry: &fs::DirEntry) -> Option<String> {
    match entry.file_name().into_string() {
        Ok(name) if is_hidden(&name) => None,
        Ok(name) => Some(name),
        Err(name) => {
            tracing::warn!(
                dir = %entry.path().parent().unwrap_or(Path::new("")).display(),
                name = ?name,
                "Skipping entry with a name that is not valid UTF-8"
            );
            None
        }
    }
}

/// Visible subdirectories of `dir` as (name, path), sorted by name.
///
/// Symbolic links are not followed.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, InventoryError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| InventoryError::io(dir, e))? {
        let entry = entry.map_err(|e| InventoryError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| InventoryError::io(dir, e))?;
        if !file_type.is_dir() {
            if file_type.is_symlink() {
                tracing::debug!(path = %entry.path().display(), "Not following symbolic link");
            }
            continue;
        }
        if let Some(name) = visible_name(&entry) {
            found.push((name, entry.path()));
        }
    }
    found.sort();
    Ok(found)
}

/// Files below `dir`. A symbolic link is one artefact of its own and never followed.
fn collect_files(dir: &Path, files: &mut Vec<String>) -> Result<(), InventoryError> {
    for entry in fs::read_dir(dir).map_err(|e| InventoryError::io(dir, e))? {
        let entry = entry.map_err(|e| InventoryError::io(dir, e))?;
        let Some(name) = visible_name(&entry) else {
            continue;
        };
        let file_type = entry.file_type().map_err(|e| InventoryError::io(dir, e))?;
        let path = dir.join(name);
        if file_type.is_dir() {
            collect_files(&path, files)?;
            continue;
        }
        match path.into_os_string().into_string() {
            Ok(path) => files.push(path),
            Err(path) => tracing::warn!(
                path = ?path,
                "Skipping artefact with a path that is not valid UTF-8"
            ),
        }
    }
    Ok(())
}
