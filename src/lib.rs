//! # Horiba - self-refilling mine regions for persistent voxel worlds
//!
//! Bounded regions ("mines") that are periodically wiped and repopulated with
//! randomly selected materials drawn from a weighted distribution, optionally
//! blended across vertical depth. The host drives everything through a
//! discrete tick clock: once per tick it calls [`mine::MineManager::tick`],
//! which warns occupants ahead of a reset, relocates them to the mine
//! entrance when the reset comes due, refills the interior and reschedules.
//!
//! The crate owns no engine state. Block writes, occupant queries, messaging
//! and randomness all go through the [`world::MineWorld`] seam; a
//! [`world::MemoryWorld`] backend is provided for headless use and tests.

pub mod error;
pub mod mine;
pub mod world;

/// Common imports for downstream hosts
pub mod prelude {
    pub use crate::error::MineError;
    pub use crate::mine::{
        DistributionLayer, Mine, MineManager, MineStore, MineTypeTemplate, MineTypes, Region,
        WeightedEntry,
    };
    pub use crate::world::{MemoryWorld, MineWorld, OccupantId, TICKS_PER_SECOND};
    pub use glam::IVec3;
}
