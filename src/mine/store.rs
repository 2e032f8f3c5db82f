//! Durable storage for the mine registry
//!
//! The registry serializes to a versioned blob in which every mine carries
//! its own independently decodable payload: one corrupt record is skipped
//! and logged without losing the rest, and a fully unreadable blob loads as
//! an empty registry. The optional [`MineStore`] wraps the blob in an
//! lz4-compressed file with atomic replace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::distribution::{DistributionLayer, WeightedEntry};
use super::manager::MineManager;
use super::mine::Mine;
use super::region::Region;
use crate::error::MineError;

/// Bump when the record layout changes
pub const STORE_VERSION: u32 = 1;

const STORE_FILE: &str = "mines.bin";

#[derive(Debug, Serialize, Deserialize)]
struct WeightedEntryRecord {
    material_id: String,
    weight: f64,
}

/// Per-mine record; field-tagged so material ids may contain any character
#[derive(Debug, Serialize, Deserialize)]
struct MineRecord {
    min: [i32; 3],
    max: [i32; 3],
    entrance: [i32; 3],
    next_reset_tick: u64,
    refill_interval_ticks: u32,
    warning_ticks: u32,
    border_material: String,
    border_built: bool,
    distribution: Vec<WeightedEntryRecord>,
    /// Empty for flat-only mines
    layers: Vec<Vec<WeightedEntryRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NamedRecord {
    name: String,
    payload: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RegistryBlob {
    version: u32,
    mines: Vec<NamedRecord>,
}

fn entry_records(entries: &[WeightedEntry]) -> Vec<WeightedEntryRecord> {
    entries
        .iter()
        .map(|e| WeightedEntryRecord {
            material_id: e.material_id.clone(),
            weight: e.weight,
        })
        .collect()
}

fn entries_from_records(records: Vec<WeightedEntryRecord>) -> Result<Vec<WeightedEntry>> {
    records
        .into_iter()
        .map(|r| WeightedEntry::new(r.material_id, r.weight).map_err(anyhow::Error::from))
        .collect()
}

fn record_from_mine(mine: &Mine) -> MineRecord {
    MineRecord {
        min: mine.region.min.to_array(),
        max: mine.region.max.to_array(),
        entrance: mine.entrance.to_array(),
        next_reset_tick: mine.next_reset_tick,
        refill_interval_ticks: mine.refill_interval_ticks as u32,
        warning_ticks: mine.warning_ticks as u32,
        border_material: mine.border_material.clone(),
        border_built: mine.border_built,
        distribution: entry_records(&mine.distribution),
        layers: mine
            .layers
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|l| entry_records(&l.entries))
            .collect(),
    }
}

fn mine_from_record(record: MineRecord) -> Result<Mine> {
    if record.refill_interval_ticks == 0 {
        return Err(MineError::InvalidInterval(0).into());
    }
    if record.warning_ticks > record.refill_interval_ticks {
        return Err(MineError::WarningExceedsInterval {
            warning: record.warning_ticks as u64,
            interval: record.refill_interval_ticks as u64,
        }
        .into());
    }
    if record.layers.len() == 1 {
        return Err(MineError::TooFewLayers.into());
    }

    let distribution = entries_from_records(record.distribution)?;
    let layers = if record.layers.is_empty() {
        None
    } else {
        Some(
            record
                .layers
                .into_iter()
                .map(|entries| {
                    DistributionLayer::new(entries_from_records(entries)?)
                        .map_err(anyhow::Error::from)
                })
                .collect::<Result<Vec<_>>>()?,
        )
    };

    Ok(Mine {
        region: Region::new(IVec3::from_array(record.min), IVec3::from_array(record.max)),
        entrance: IVec3::from_array(record.entrance),
        distribution,
        layers,
        border_material: record.border_material,
        refill_interval_ticks: record.refill_interval_ticks as u64,
        warning_ticks: record.warning_ticks as u64,
        next_reset_tick: record.next_reset_tick,
        border_built: record.border_built,
    })
}

/// Serialize the registry to a durable blob
pub fn save(manager: &MineManager) -> Result<Vec<u8>> {
    let mut mines = Vec::with_capacity(manager.len());
    for (name, mine) in manager.iter() {
        let payload =
            bincode_next::serde::encode_to_vec(record_from_mine(mine), bincode_next::config::standard())
                .context("Failed to serialize mine record")?;
        mines.push(NamedRecord {
            name: name.clone(),
            payload,
        });
    }

    let blob = RegistryBlob {
        version: STORE_VERSION,
        mines,
    };
    bincode_next::serde::encode_to_vec(&blob, bincode_next::config::standard())
        .context("Failed to serialize mine registry")
}

/// Deserialize a registry blob.
///
/// Never fails: corrupt individual records are skipped with a warning and a
/// fully unreadable blob yields an empty registry. The returned registry
/// starts clean (not dirty).
pub fn load(bytes: &[u8]) -> MineManager {
    let mut manager = MineManager::new();

    let blob: RegistryBlob = match bincode_next::serde::decode_from_slice(
        bytes,
        bincode_next::config::standard(),
    ) {
        Ok((blob, _)) => blob,
        Err(e) => {
            log::warn!("[LOAD] Unreadable mine registry blob, starting empty: {:?}", e);
            return manager;
        }
    };

    if blob.version != STORE_VERSION {
        log::warn!(
            "[LOAD] Mine registry version {} not supported (expected {}), starting empty",
            blob.version,
            STORE_VERSION
        );
        return manager;
    }

    for named in blob.mines {
        let record: MineRecord = match bincode_next::serde::decode_from_slice(
            &named.payload,
            bincode_next::config::standard(),
        ) {
            Ok((record, _)) => record,
            Err(e) => {
                log::warn!("[LOAD] Skipping corrupt mine record '{}': {:?}", named.name, e);
                continue;
            }
        };

        match mine_from_record(record) {
            Ok(mine) => {
                if let Err(e) = manager.insert(&named.name, mine) {
                    log::warn!("[LOAD] Skipping duplicate mine record '{}': {}", named.name, e);
                }
            }
            Err(e) => {
                log::warn!("[LOAD] Skipping invalid mine record '{}': {}", named.name, e);
            }
        }
    }

    log::info!("[LOAD] Loaded {} mines from registry blob", manager.len());
    manager.clear_dirty();
    manager
}

/// File-backed registry store with compression and atomic replace
pub struct MineStore {
    world_dir: PathBuf,
}

impl MineStore {
    /// Create a store rooted at the given world directory
    pub fn new(world_dir: impl Into<PathBuf>) -> Result<Self> {
        let world_dir = world_dir.into();
        std::fs::create_dir_all(&world_dir).context("Failed to create world directory")?;
        Ok(Self { world_dir })
    }

    fn store_path(&self) -> PathBuf {
        self.world_dir.join(STORE_FILE)
    }

    /// Save the registry to disk; write to a temp file, then rename
    pub fn save(&self, manager: &MineManager) -> Result<()> {
        let serialized = save(manager)?;
        let compressed = lz4_flex::compress_prepend_size(&serialized);

        let path = self.store_path();
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, compressed).context("Failed to write registry temp file")?;
        std::fs::rename(temp_path, &path).context("Failed to rename registry file")?;

        log::info!("[SAVE] Saved {} mines to {:?}", manager.len(), path);
        Ok(())
    }

    /// Load the registry from disk, or return an empty one if the file is
    /// missing or unreadable
    pub fn load(&self) -> MineManager {
        let path = self.store_path();
        if !path.exists() {
            log::info!("[LOAD] No mine registry at {:?}, starting empty", path);
            return MineManager::new();
        }

        let compressed = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("[LOAD] Failed to read {:?}: {}, starting empty", path, e);
                return MineManager::new();
            }
        };

        match lz4_flex::decompress_size_prepended(&compressed) {
            Ok(serialized) => load(&serialized),
            Err(e) => {
                log::warn!("[LOAD] Failed to decompress {:?}: {}, starting empty", path, e);
                MineManager::new()
            }
        }
    }

    /// Delete the stored registry file if present
    pub fn delete(&self) -> Result<()> {
        let path = self.store_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to delete registry file")?;
        }
        Ok(())
    }
}
