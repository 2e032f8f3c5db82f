//! Mine type templates and preset file loading
//!
//! Presets are RON files in a config directory, one type per file; the type
//! name is the lowercased file stem. A commented `default.ron` is written on
//! first run. Unknown or unparseable types never fail a caller: lookups fall
//! back to a built-in stone-heavy default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::distribution::{DistributionLayer, WeightedEntry};
use crate::error::MineError;
use crate::world::TICKS_PER_SECOND;

const SECONDS_PER_MINUTE: u64 = 60;

/// Parsed mine type: timing plus content distribution.
///
/// When `layers` holds two or more entries the interior fill blends them by
/// depth and `flat_distribution` is ignored; otherwise the flat distribution
/// is used uniformly for every slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineTypeTemplate {
    pub name: String,
    pub refill_interval_ticks: u64,
    pub warning_ticks: u64,
    pub flat_distribution: Vec<WeightedEntry>,
    pub layers: Vec<DistributionLayer>,
}

impl MineTypeTemplate {
    /// Create a flat (unlayered) template
    pub fn flat(
        name: impl Into<String>,
        refill_interval_ticks: u64,
        warning_ticks: u64,
        flat_distribution: Vec<WeightedEntry>,
    ) -> Result<Self, MineError> {
        Self::layered(
            name,
            refill_interval_ticks,
            warning_ticks,
            flat_distribution,
            Vec::new(),
        )
    }

    /// Create a template with depth-blended layers
    pub fn layered(
        name: impl Into<String>,
        refill_interval_ticks: u64,
        warning_ticks: u64,
        flat_distribution: Vec<WeightedEntry>,
        layers: Vec<DistributionLayer>,
    ) -> Result<Self, MineError> {
        let template = Self {
            name: name.into(),
            refill_interval_ticks,
            warning_ticks,
            flat_distribution,
            layers,
        };
        template.validate()?;
        Ok(template)
    }

    /// Whether this type blends layered distributions by depth
    pub fn has_layers(&self) -> bool {
        self.layers.len() >= 2
    }

    /// Check the shape invariants: interval >= 1 tick, warning window no
    /// longer than the interval, layer list empty or >= 2, no negative
    /// weights, no empty layers
    pub fn validate(&self) -> Result<(), MineError> {
        if self.refill_interval_ticks == 0 {
            return Err(MineError::InvalidInterval(self.refill_interval_ticks));
        }
        if self.warning_ticks > self.refill_interval_ticks {
            return Err(MineError::WarningExceedsInterval {
                warning: self.warning_ticks,
                interval: self.refill_interval_ticks,
            });
        }
        if self.layers.len() == 1 {
            return Err(MineError::TooFewLayers);
        }
        for entry in self
            .flat_distribution
            .iter()
            .chain(self.layers.iter().flat_map(|l| l.entries.iter()))
        {
            if entry.weight < 0.0 {
                return Err(MineError::NegativeWeight(entry.weight));
            }
        }
        for layer in &self.layers {
            if layer.entries.is_empty() {
                return Err(MineError::EmptyLayer);
            }
        }
        Ok(())
    }
}

/// On-disk preset shape: human-friendly minutes/seconds and plain
/// (id, weight) pairs instead of the internal tick counts
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MineTypePreset {
    #[serde(default = "default_interval_minutes")]
    interval_minutes: u64,
    #[serde(default = "default_warning_seconds")]
    warning_seconds: u64,
    /// Fallback distribution used when no layers are defined
    #[serde(default)]
    blocks: Vec<(String, f64)>,
    /// Layered distributions, blended by depth across the mine height
    #[serde(default)]
    layers: Vec<Vec<(String, f64)>>,
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_warning_seconds() -> u64 {
    60
}

impl MineTypePreset {
    fn into_template(self, name: &str) -> Result<MineTypeTemplate, MineError> {
        let flat = self
            .blocks
            .into_iter()
            .map(|(id, weight)| WeightedEntry::new(id, weight))
            .collect::<Result<Vec<_>, _>>()?;
        let layers = self
            .layers
            .into_iter()
            .map(|entries| {
                let entries = entries
                    .into_iter()
                    .map(|(id, weight)| WeightedEntry::new(id, weight))
                    .collect::<Result<Vec<_>, _>>()?;
                DistributionLayer::new(entries)
            })
            .collect::<Result<Vec<_>, _>>()?;

        MineTypeTemplate::layered(
            name,
            self.interval_minutes * SECONDS_PER_MINUTE * TICKS_PER_SECOND,
            self.warning_seconds * TICKS_PER_SECOND,
            flat,
            layers,
        )
    }
}

/// Loaded mine type presets, keyed by lowercased name
pub struct MineTypes {
    dir: PathBuf,
    types: HashMap<String, MineTypeTemplate>,
}

impl MineTypes {
    /// Load every `*.ron` preset under `dir`, creating the directory and a
    /// default preset file on first run. Unparseable files are skipped and
    /// logged; they never abort the load.
    pub fn load_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create mine type config directory")?;

        let default_path = dir.join("default.ron");
        if !default_path.exists() {
            std::fs::write(&default_path, default_preset_ron())
                .context("Failed to write default mine type preset")?;
            log::info!("[CONFIG] Wrote default mine type preset to {:?}", default_path);
        }

        let mut types = HashMap::new();
        for entry in std::fs::read_dir(&dir).context("Failed to list mine type directory")? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("ron") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = stem.to_lowercase();
            match Self::load_preset(&path, &name) {
                Ok(template) => {
                    log::debug!("[CONFIG] Loaded mine type '{}' from {:?}", name, path);
                    types.insert(name, template);
                }
                Err(e) => {
                    log::warn!("[CONFIG] Skipping mine type file {:?}: {}", path, e);
                }
            }
        }

        log::info!("[CONFIG] Loaded {} mine types from {:?}", types.len(), dir);
        Ok(Self { dir, types })
    }

    fn load_preset(path: &Path, name: &str) -> Result<MineTypeTemplate> {
        let contents = std::fs::read_to_string(path).context("Failed to read preset file")?;
        let preset: MineTypePreset =
            ron::from_str(&contents).context("Failed to parse preset file")?;
        preset
            .into_template(name)
            .context("Preset violates mine type invariants")
    }

    /// Directory the presets were loaded from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up a type by name (case-insensitive), falling back to the
    /// built-in default for unknown names
    pub fn get(&self, name: &str) -> MineTypeTemplate {
        self.types
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| {
                log::warn!("[CONFIG] Unknown mine type '{}', using fallback", name);
                Self::fallback()
            })
    }

    /// Names of all loaded types, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    /// Built-in stone-heavy flat type used when a preset is missing
    pub fn fallback() -> MineTypeTemplate {
        let entries = [
            ("stone", 70.0),
            ("coal_ore", 10.0),
            ("iron_ore", 8.0),
            ("copper_ore", 5.0),
            ("diamond_ore", 1.0),
            ("air", 6.0),
        ];
        let flat = entries
            .iter()
            .map(|&(id, weight)| WeightedEntry {
                material_id: id.to_string(),
                weight,
            })
            .collect();

        MineTypeTemplate {
            name: "default".to_string(),
            refill_interval_ticks: 30 * SECONDS_PER_MINUTE * TICKS_PER_SECOND,
            warning_ticks: 60 * TICKS_PER_SECOND,
            flat_distribution: flat,
            layers: Vec::new(),
        }
    }
}

/// Commented starter preset mirroring the fallback type plus a layered
/// surface-to-deepslate example
fn default_preset_ron() -> String {
    r#"// Default mine type.
// interval_minutes and warning_seconds control timing.
// blocks is the flat fallback distribution, used when layers is empty.
// layers are blended by depth across the mine height, bottom layer first.
(
    interval_minutes: 30,
    warning_seconds: 60,
    blocks: [
        ("stone", 70.0),
        ("andesite", 6.0),
        ("granite", 6.0),
        ("diorite", 6.0),
        ("dirt", 6.0),
        ("gravel", 3.0),
    ],
    layers: [
        [
            ("deepslate", 70.0),
            ("tuff", 10.0),
            ("deepslate_coal_ore", 5.0),
            ("deepslate_iron_ore", 6.0),
            ("deepslate_gold_ore", 2.0),
            ("deepslate_diamond_ore", 0.6),
        ],
        [
            ("stone", 60.0),
            ("andesite", 8.0),
            ("granite", 8.0),
            ("dirt", 8.0),
            ("gravel", 4.0),
            ("coal_ore", 8.0),
            ("copper_ore", 6.0),
            ("iron_ore", 5.0),
            ("gold_ore", 2.0),
            ("emerald_ore", 0.2),
        ],
    ],
)
"#
    .to_string()
}
