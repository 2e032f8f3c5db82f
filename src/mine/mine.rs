//! Mine entity - a bounded region that periodically refills itself

use glam::IVec3;

use super::config::MineTypeTemplate;
use super::distribution::{blend_layers, depth_fraction, DistributionLayer, MaterialSampler, WeightedEntry};
use super::region::Region;
use crate::world::MineWorld;

/// A bounded excavation region subject to scheduled content regeneration.
///
/// Timing state is implicit in the numeric fields: `next_reset_tick == 0`
/// means unscheduled; the first [`Mine::regenerate`] arms the schedule and
/// builds the border shell, which is never rebuilt afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Mine {
    /// Normalised cuboid covered by this mine
    pub region: Region,
    /// Where occupants are relocated before a reset
    pub entrance: IVec3,
    /// Flat weighted distribution, used when no layers are present
    pub distribution: Vec<WeightedEntry>,
    /// Depth-blended layers; two or more take precedence over `distribution`
    pub layers: Option<Vec<DistributionLayer>>,
    /// Material id for the one-time border shell
    pub border_material: String,
    /// Ticks between resets
    pub refill_interval_ticks: u64,
    /// Ticks before a reset at which occupants are warned
    pub warning_ticks: u64,
    /// Tick of the next scheduled reset; 0 means not yet scheduled
    pub next_reset_tick: u64,
    /// Whether the border shell has been built
    pub border_built: bool,
}

impl Mine {
    /// Create a mine from two corners, an entrance and a type template.
    ///
    /// Corners may be given in any order; the region is normalised at
    /// construction. The mine stays unscheduled until first regenerated.
    pub fn new(
        pos1: IVec3,
        pos2: IVec3,
        entrance: IVec3,
        template: &MineTypeTemplate,
        border_material: impl Into<String>,
    ) -> Self {
        Self {
            region: Region::new(pos1, pos2),
            entrance,
            distribution: template.flat_distribution.clone(),
            layers: if template.layers.is_empty() {
                None
            } else {
                Some(template.layers.clone())
            },
            border_material: border_material.into(),
            refill_interval_ticks: template.refill_interval_ticks,
            warning_ticks: template.warning_ticks,
            next_reset_tick: 0,
            border_built: false,
        }
    }

    /// Returns true if `pos` lies within the mine region (inclusive)
    pub fn contains(&self, pos: IVec3) -> bool {
        self.region.contains(pos)
    }

    /// Whether interior fills blend layered distributions by depth
    pub fn has_layers(&self) -> bool {
        self.layers.as_ref().is_some_and(|l| l.len() >= 2)
    }

    /// Yaw facing the region's horizontal center from the entrance,
    /// in the host convention (degrees, -90 offset)
    pub fn exit_yaw(&self) -> f32 {
        let (cx, cz) = self.region.horizontal_center();
        let dx = cx - (self.entrance.x as f64 + 0.5);
        let dz = cz - (self.entrance.z as f64 + 0.5);
        (dz.atan2(dx).to_degrees() - 90.0) as f32
    }

    /// Refill the interior and, on the first call only, build the border.
    ///
    /// Interior cells (`x`/`z` strictly inside, `y` from one above the floor
    /// up to and including the open top) are drawn independently from the
    /// per-slice sampler. Unconditionally reschedules
    /// `next_reset_tick = current_tick + refill_interval_ticks`. Never fails:
    /// unresolvable materials degrade to the world's filler.
    pub fn regenerate<W: MineWorld>(&mut self, world: &mut W, current_tick: u64) {
        let region = self.region;

        if !self.border_built {
            self.build_border(world);
            self.border_built = true;
        }

        // Flat samplers are identical across slices; build once and reuse.
        let flat = if self.has_layers() {
            None
        } else {
            Some(MaterialSampler::from_entries(&self.distribution, world))
        };

        let mut filled = 0u64;
        for y in region.interior_bottom_y()..=region.interior_top_y() {
            let sampler = match &flat {
                Some(sampler) => sampler.clone(),
                None => {
                    let layers = self.layers.as_deref().unwrap_or(&[]);
                    let t = depth_fraction(&region, y);
                    MaterialSampler::build(&blend_layers(layers, t), world)
                }
            };

            for x in region.min.x + 1..region.max.x {
                for z in region.min.z + 1..region.max.z {
                    let material = sampler.sample(world.rng());
                    world.set_block(IVec3::new(x, y, z), material);
                    filled += 1;
                }
            }
        }

        self.next_reset_tick = current_tick + self.refill_interval_ticks;

        log::debug!(
            "[MINE] Regenerated {} interior blocks in {:?}..{:?}, next reset at tick {}",
            filled,
            region.min,
            region.max,
            self.next_reset_tick
        );
    }

    /// Build the border shell: walls and floor, top face left open
    fn build_border<W: MineWorld>(&self, world: &mut W) {
        let region = self.region;
        let material = world
            .resolve_material(&self.border_material)
            .unwrap_or_else(|| world.filler_material());

        let mut placed = 0u64;
        for x in region.min.x..=region.max.x {
            for y in region.min.y..=region.max.y {
                for z in region.min.z..=region.max.z {
                    let pos = IVec3::new(x, y, z);
                    if region.is_border(pos) {
                        world.set_block(pos, material);
                        placed += 1;
                    }
                }
            }
        }

        log::debug!(
            "[MINE] Built border of {} '{}' blocks for {:?}..{:?}",
            placed,
            self.border_material,
            region.min,
            region.max
        );
    }
}
