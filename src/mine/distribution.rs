//! Weighted material distributions and depth blending
//!
//! A mine is filled from either a single flat distribution or a stack of
//! layers anchored to reference depths. For every interior Y slice the two
//! layers bracketing that depth are merged by linear interpolation, then
//! turned into an integer-weighted sampler. Material ids resolve once at
//! sampler build time; unknown ids degrade to the world's filler material so
//! a fill never aborts mid-region.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::region::Region;
use crate::error::MineError;
use crate::world::{MaterialId, MineWorld};

/// Fractional weights are scaled by this factor into integer sampling mass
pub const WEIGHT_PRECISION: f64 = 1000.0;

/// A material id paired with its relative weight.
///
/// Weights do not need to sum to anything in particular; they are normalised
/// by the sampler. Doubles allow fractional rarities like `0.2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub material_id: String,
    pub weight: f64,
}

impl WeightedEntry {
    /// Create an entry, rejecting negative weights
    pub fn new(material_id: impl Into<String>, weight: f64) -> Result<Self, MineError> {
        if weight < 0.0 {
            return Err(MineError::NegativeWeight(weight));
        }
        Ok(Self {
            material_id: material_id.into(),
            weight,
        })
    }
}

/// Weighted material mix at one vertical reference slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionLayer {
    pub entries: Vec<WeightedEntry>,
}

impl DistributionLayer {
    /// Create a layer, rejecting empty entry lists
    pub fn new(entries: Vec<WeightedEntry>) -> Result<Self, MineError> {
        if entries.is_empty() {
            return Err(MineError::EmptyLayer);
        }
        Ok(Self { entries })
    }
}

/// Normalised depth of an interior slice: 0.0 at the bottom slice
/// (`min.y + 1`), 1.0 at the top slice (`max.y`), clamped to `[0, 1]`
pub fn depth_fraction(region: &Region, y: i32) -> f64 {
    let bottom = region.interior_bottom_y();
    let span = (region.interior_top_y() - bottom).max(1);
    ((y - bottom) as f64 / span as f64).clamp(0.0, 1.0)
}

/// Merge the two layers bracketing depth `t` into a single weight list.
///
/// Duplicate material ids accumulate additively, both within a layer and
/// across the pair. At `t == 0.0` the result equals the first layer exactly;
/// at `t == 1.0` it equals the last layer exactly.
pub fn blend_layers(layers: &[DistributionLayer], t: f64) -> Vec<(String, f64)> {
    if layers.is_empty() {
        return Vec::new();
    }

    let last = layers.len() - 1;
    let scaled = t.clamp(0.0, 1.0) * last as f64;
    let lo = (scaled.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    let frac = scaled - lo as f64;

    let mut merged: Vec<(String, f64)> = Vec::new();
    let mut accumulate = |entries: &[WeightedEntry], factor: f64| {
        for entry in entries {
            match merged.iter_mut().find(|(id, _)| *id == entry.material_id) {
                Some((_, weight)) => *weight += entry.weight * factor,
                None => merged.push((entry.material_id.clone(), entry.weight * factor)),
            }
        }
    };

    // A factor of zero must not leak the other layer's ids into the result;
    // the edge slices have to equal their layer exactly.
    if frac < 1.0 {
        accumulate(&layers[lo].entries, 1.0 - frac);
    }
    if frac > 0.0 {
        accumulate(&layers[hi].entries, frac);
    }
    merged
}

/// Integer-weighted sampler over resolved materials.
///
/// Built once per Y slice (or once per mine for flat distributions); sampling
/// itself never consults the material registry.
#[derive(Debug, Clone)]
pub struct MaterialSampler {
    /// (material, cumulative weight), cumulative values strictly increasing
    cumulative: Vec<(MaterialId, u64)>,
    total: u64,
}

impl MaterialSampler {
    /// Build a sampler from merged (id, weight) pairs.
    ///
    /// Weights are scaled by [`WEIGHT_PRECISION`] and floored to at least 1
    /// so any strictly-positive fractional weight keeps sampling mass; zero
    /// weights are dropped. Ids that do not resolve substitute the world's
    /// filler material. An empty result degenerates to filler-only.
    pub fn build<W: MineWorld + ?Sized>(weights: &[(String, f64)], world: &W) -> Self {
        let filler = world.filler_material();
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0u64;

        for (id, weight) in weights {
            if *weight <= 0.0 {
                continue;
            }
            let material = world.resolve_material(id).unwrap_or(filler);
            let mass = ((weight * WEIGHT_PRECISION) as u64).max(1);
            total += mass;
            cumulative.push((material, total));
        }

        if cumulative.is_empty() {
            total = 1;
            cumulative.push((filler, 1));
        }

        Self { cumulative, total }
    }

    /// Build directly from a flat entry list
    pub fn from_entries<W: MineWorld + ?Sized>(entries: &[WeightedEntry], world: &W) -> Self {
        let weights: Vec<(String, f64)> = entries
            .iter()
            .map(|e| (e.material_id.clone(), e.weight))
            .collect();
        Self::build(&weights, world)
    }

    /// Draw one material
    pub fn sample(&self, rng: &mut dyn RngCore) -> MaterialId {
        let roll = rng.gen_range(0..self.total);
        let idx = self
            .cumulative
            .partition_point(|&(_, bound)| bound <= roll);
        self.cumulative[idx].0
    }

    /// Number of distinct weighted entries; never zero, empty builds
    /// degenerate to a single filler entry
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MemoryWorld;
    use glam::IVec3;
    use std::collections::HashMap;

    fn test_world() -> MemoryWorld {
        let mut world = MemoryWorld::new(12345);
        world.set_filler(1);
        world.register_material("stone", 1);
        world.register_material("ore", 21);
        world.register_material("deepslate", 35);
        world
    }

    fn entry(id: &str, weight: f64) -> WeightedEntry {
        WeightedEntry::new(id, weight).unwrap()
    }

    fn sample_counts(
        sampler: &MaterialSampler,
        world: &mut MemoryWorld,
        n: usize,
    ) -> HashMap<MaterialId, usize> {
        let mut counts = HashMap::new();
        for _ in 0..n {
            *counts.entry(sampler.sample(world.rng())).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert_eq!(
            WeightedEntry::new("stone", -1.0),
            Err(MineError::NegativeWeight(-1.0))
        );
        assert!(WeightedEntry::new("stone", 0.0).is_ok());
    }

    #[test]
    fn test_empty_layer_rejected() {
        assert_eq!(DistributionLayer::new(vec![]), Err(MineError::EmptyLayer));
    }

    #[test]
    fn test_depth_fraction_edges() {
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 10, 4));
        assert_eq!(depth_fraction(&region, 1), 0.0);
        assert_eq!(depth_fraction(&region, 10), 1.0);
        // Clamped outside the interior
        assert_eq!(depth_fraction(&region, 0), 0.0);
        assert_eq!(depth_fraction(&region, 11), 1.0);
    }

    #[test]
    fn test_depth_fraction_single_slice_region() {
        // Interior height of one slice: span clamps to 1, t stays 0
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 1, 4));
        assert_eq!(depth_fraction(&region, 1), 0.0);
    }

    #[test]
    fn test_blend_exact_at_boundaries() {
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 60.0), entry("ore", 8.0)]).unwrap(),
            DistributionLayer::new(vec![entry("deepslate", 70.0)]).unwrap(),
        ];

        let bottom = blend_layers(&layers, 0.0);
        assert_eq!(
            bottom,
            vec![("stone".to_string(), 60.0), ("ore".to_string(), 8.0)]
        );

        let top = blend_layers(&layers, 1.0);
        assert_eq!(top, vec![("deepslate".to_string(), 70.0)]);
    }

    #[test]
    fn test_blend_midpoint_halves_weights() {
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 10.0)]).unwrap(),
            DistributionLayer::new(vec![entry("deepslate", 10.0)]).unwrap(),
        ];

        let mid = blend_layers(&layers, 0.5);
        assert_eq!(
            mid,
            vec![
                ("stone".to_string(), 5.0),
                ("deepslate".to_string(), 5.0)
            ]
        );
    }

    #[test]
    fn test_blend_duplicate_ids_accumulate() {
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 4.0)]).unwrap(),
            DistributionLayer::new(vec![entry("stone", 8.0)]).unwrap(),
        ];

        let mid = blend_layers(&layers, 0.5);
        assert_eq!(mid, vec![("stone".to_string(), 6.0)]);
    }

    #[test]
    fn test_blend_three_layers_brackets_correct_pair() {
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 1.0)]).unwrap(),
            DistributionLayer::new(vec![entry("ore", 1.0)]).unwrap(),
            DistributionLayer::new(vec![entry("deepslate", 1.0)]).unwrap(),
        ];

        // t = 0.25 sits halfway between layer 0 and layer 1
        let merged = blend_layers(&layers, 0.25);
        assert_eq!(
            merged,
            vec![("stone".to_string(), 0.5), ("ore".to_string(), 0.5)]
        );

        // t = 1.0 must be layer 2 only
        let top = blend_layers(&layers, 1.0);
        assert_eq!(top, vec![("deepslate".to_string(), 1.0)]);
    }

    #[test]
    fn test_sampler_drops_zero_weights() {
        let world = test_world();
        let sampler = MaterialSampler::build(
            &[("stone".to_string(), 1.0), ("ore".to_string(), 0.0)],
            &world,
        );
        assert_eq!(sampler.len(), 1);
    }

    #[test]
    fn test_sampler_keeps_tiny_fractional_weights() {
        let mut world = test_world();
        // 0.0004 * 1000 floors to 0; the sampler must clamp it up to mass 1
        let sampler = MaterialSampler::build(
            &[("stone".to_string(), 1000.0), ("ore".to_string(), 0.0004)],
            &world,
        );
        assert_eq!(sampler.len(), 2);

        let counts = sample_counts(&sampler, &mut world, 100_000);
        assert!(counts.contains_key(&1), "dominant material never sampled");
    }

    #[test]
    fn test_sampler_unresolved_falls_back_to_filler() {
        let mut world = test_world();
        let sampler = MaterialSampler::build(&[("unobtainium".to_string(), 5.0)], &world);

        for _ in 0..100 {
            assert_eq!(sampler.sample(world.rng()), 1);
        }
    }

    #[test]
    fn test_sampler_empty_input_degenerates_to_filler() {
        let mut world = test_world();
        let sampler = MaterialSampler::build(&[], &world);
        assert_eq!(sampler.sample(world.rng()), 1);
    }

    #[test]
    fn test_sampler_empirical_proportions() {
        let mut world = test_world();
        let sampler = MaterialSampler::build(
            &[("stone".to_string(), 70.0), ("ore".to_string(), 10.0)],
            &world,
        );

        const N: usize = 100_000;
        let counts = sample_counts(&sampler, &mut world, N);
        let stone_share = counts[&1] as f64 / N as f64;
        let ore_share = counts[&21] as f64 / N as f64;

        assert!(
            (stone_share - 0.875).abs() < 0.02,
            "stone share {} out of tolerance",
            stone_share
        );
        assert!(
            (ore_share - 0.125).abs() < 0.02,
            "ore share {} out of tolerance",
            ore_share
        );
    }

    #[test]
    fn test_blend_boundary_sampling_is_layer_exact() {
        let mut world = test_world();
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 3.0)]).unwrap(),
            DistributionLayer::new(vec![entry("deepslate", 3.0)]).unwrap(),
        ];
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 8, 4));

        let bottom = MaterialSampler::build(
            &blend_layers(&layers, depth_fraction(&region, region.interior_bottom_y())),
            &world,
        );
        let top = MaterialSampler::build(
            &blend_layers(&layers, depth_fraction(&region, region.interior_top_y())),
            &world,
        );

        for _ in 0..1000 {
            assert_eq!(bottom.sample(world.rng()), 1);
        }
        for _ in 0..1000 {
            assert_eq!(top.sample(world.rng()), 35);
        }
    }

    #[test]
    fn test_blend_boundary_mixed_layers_empirical() {
        // Two-material layers: the bottom slice must match L0's 70/10 split
        // within tolerance, untouched by L1's inverted split.
        let mut world = test_world();
        let layers = vec![
            DistributionLayer::new(vec![entry("stone", 70.0), entry("ore", 10.0)]).unwrap(),
            DistributionLayer::new(vec![entry("stone", 10.0), entry("ore", 70.0)]).unwrap(),
        ];
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 8, 4));

        let bottom = MaterialSampler::build(
            &blend_layers(&layers, depth_fraction(&region, region.interior_bottom_y())),
            &world,
        );

        const N: usize = 100_000;
        let counts = sample_counts(&bottom, &mut world, N);
        let stone_share = counts[&1] as f64 / N as f64;
        assert!(
            (stone_share - 0.875).abs() < 0.02,
            "bottom slice stone share {} out of tolerance",
            stone_share
        );
    }
}
