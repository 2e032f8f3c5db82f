//! World collaborator seam - everything the mine subsystem needs from a host
//!
//! The host engine owns blocks, occupants and randomness. Mines only ever
//! touch them through [`MineWorld`], so the subsystem can run against a real
//! server level or against [`MemoryWorld`] in headless tests.

mod memory;

pub use memory::MemoryWorld;

use glam::IVec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::mine::Region;

/// Host simulation rate; warning countdowns are reported in whole seconds
pub const TICKS_PER_SECOND: u64 = 20;

/// Resolved material handle, valid only within the resolving world
pub type MaterialId = u16;

/// Opaque handle to a mobile entity managed by the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantId(pub u64);

/// Interface the mine subsystem consumes from the host world.
///
/// The host guarantees no concurrent mutation of world state while a tick
/// callback runs (single-writer tick model), so none of these methods need
/// internal locking.
pub trait MineWorld {
    /// Current value of the host's discrete tick clock
    fn game_time(&self) -> u64;

    /// Resolve a material id string to the host's material handle
    fn resolve_material(&self, id: &str) -> Option<MaterialId>;

    /// Default filler material substituted for unresolvable ids
    fn filler_material(&self) -> MaterialId;

    /// Write a single block
    fn set_block(&mut self, pos: IVec3, material: MaterialId);

    /// All occupants currently present in this world
    fn occupants(&self) -> Vec<OccupantId>;

    /// Current block position of an occupant
    fn occupant_pos(&self, occupant: OccupantId) -> IVec3;

    /// Relocate an occupant, setting its facing
    fn teleport(&mut self, occupant: OccupantId, pos: IVec3, yaw: f32, pitch: f32);

    /// Send a chat/system message to an occupant
    fn send_message(&mut self, occupant: OccupantId, text: &str);

    /// Per-occupant persistent opt-out from mine reset/warning messages
    fn hide_mine_messages(&self, occupant: OccupantId) -> bool;

    /// Shared random source used for interior fills
    fn rng(&mut self) -> &mut dyn RngCore;

    /// Occupants whose position lies inside `region`
    fn occupants_in(&self, region: &Region) -> Vec<OccupantId> {
        self.occupants()
            .into_iter()
            .filter(|&o| region.contains(self.occupant_pos(o)))
            .collect()
    }
}
