//! In-memory world backend - headless hosting and deterministic tests

use std::collections::HashMap;

use glam::IVec3;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use super::{MaterialId, MineWorld, OccupantId};

#[derive(Debug, Clone)]
struct OccupantState {
    pos: IVec3,
    yaw: f32,
    pitch: f32,
    hide_messages: bool,
}

/// HashMap-backed [`MineWorld`] with a seedable RNG.
///
/// Blocks default to absent (air); materials must be registered before they
/// resolve. Teleports and messages are recorded so tests can assert on them.
pub struct MemoryWorld {
    /// Tick clock, advanced by the caller
    pub time: u64,
    blocks: HashMap<IVec3, MaterialId>,
    materials: HashMap<String, MaterialId>,
    filler: MaterialId,
    occupants: HashMap<OccupantId, OccupantState>,
    messages: Vec<(OccupantId, String)>,
    rng: Xoshiro256StarStar,
}

impl MemoryWorld {
    /// Create an empty world with a seeded RNG
    pub fn new(seed: u64) -> Self {
        Self {
            time: 0,
            blocks: HashMap::new(),
            materials: HashMap::new(),
            filler: 0,
            occupants: HashMap::new(),
            messages: Vec::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Register a material id string, returning its handle
    pub fn register_material(&mut self, id: &str, material: MaterialId) -> MaterialId {
        self.materials.insert(id.to_string(), material);
        material
    }

    /// Set the filler material substituted for unresolvable ids
    pub fn set_filler(&mut self, material: MaterialId) {
        self.filler = material;
    }

    /// Add an occupant at the given position
    pub fn add_occupant(&mut self, occupant: OccupantId, pos: IVec3) {
        self.occupants.insert(
            occupant,
            OccupantState {
                pos,
                yaw: 0.0,
                pitch: 0.0,
                hide_messages: false,
            },
        );
    }

    /// Flip the per-occupant message opt-out flag
    pub fn set_hide_messages(&mut self, occupant: OccupantId, hide: bool) {
        if let Some(state) = self.occupants.get_mut(&occupant) {
            state.hide_messages = hide;
        }
    }

    /// Material at `pos`, if any block was written there
    pub fn block_at(&self, pos: IVec3) -> Option<MaterialId> {
        self.blocks.get(&pos).copied()
    }

    /// Number of blocks written so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Facing of an occupant as (yaw, pitch)
    pub fn facing_of(&self, occupant: OccupantId) -> Option<(f32, f32)> {
        self.occupants.get(&occupant).map(|s| (s.yaw, s.pitch))
    }

    /// Messages delivered so far, in order
    pub fn messages(&self) -> &[(OccupantId, String)] {
        &self.messages
    }

    /// Drop all recorded messages
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }
}

impl MineWorld for MemoryWorld {
    fn game_time(&self) -> u64 {
        self.time
    }

    fn resolve_material(&self, id: &str) -> Option<MaterialId> {
        self.materials.get(id).copied()
    }

    fn filler_material(&self) -> MaterialId {
        self.filler
    }

    fn set_block(&mut self, pos: IVec3, material: MaterialId) {
        self.blocks.insert(pos, material);
    }

    fn occupants(&self) -> Vec<OccupantId> {
        let mut ids: Vec<OccupantId> = self.occupants.keys().copied().collect();
        ids.sort_by_key(|o| o.0);
        ids
    }

    fn occupant_pos(&self, occupant: OccupantId) -> IVec3 {
        self.occupants
            .get(&occupant)
            .map(|s| s.pos)
            .unwrap_or(IVec3::ZERO)
    }

    fn teleport(&mut self, occupant: OccupantId, pos: IVec3, yaw: f32, pitch: f32) {
        if let Some(state) = self.occupants.get_mut(&occupant) {
            state.pos = pos;
            state.yaw = yaw;
            state.pitch = pitch;
        }
    }

    fn send_message(&mut self, occupant: OccupantId, text: &str) {
        self.messages.push((occupant, text.to_string()));
    }

    fn hide_mine_messages(&self, occupant: OccupantId) -> bool {
        self.occupants
            .get(&occupant)
            .map(|s| s.hide_messages)
            .unwrap_or(false)
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mine::Region;

    #[test]
    fn test_material_registration_and_fallback() {
        let mut world = MemoryWorld::new(1);
        world.set_filler(1);
        world.register_material("stone", 1);
        world.register_material("coal_ore", 21);

        assert_eq!(world.resolve_material("stone"), Some(1));
        assert_eq!(world.resolve_material("coal_ore"), Some(21));
        assert_eq!(world.resolve_material("missing:ore"), None);
        assert_eq!(world.filler_material(), 1);
    }

    #[test]
    fn test_occupants_in_region() {
        let mut world = MemoryWorld::new(1);
        world.add_occupant(OccupantId(1), IVec3::new(2, 2, 2));
        world.add_occupant(OccupantId(2), IVec3::new(50, 2, 2));

        let region = Region::new(IVec3::ZERO, IVec3::new(4, 4, 4));
        let inside = world.occupants_in(&region);
        assert_eq!(inside, vec![OccupantId(1)]);
    }

    #[test]
    fn test_teleport_records_facing() {
        let mut world = MemoryWorld::new(1);
        world.add_occupant(OccupantId(7), IVec3::ZERO);
        world.teleport(OccupantId(7), IVec3::new(1, 2, 3), -45.0, 0.0);

        assert_eq!(world.occupant_pos(OccupantId(7)), IVec3::new(1, 2, 3));
        assert_eq!(world.facing_of(OccupantId(7)), Some((-45.0, 0.0)));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = MemoryWorld::new(42);
        let mut b = MemoryWorld::new(42);
        for _ in 0..32 {
            assert_eq!(a.rng().next_u64(), b.rng().next_u64());
        }
    }
}
