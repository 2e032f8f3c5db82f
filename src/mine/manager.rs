//! Mine registry and tick scheduler
//!
//! One `MineManager` per world, owned by the host and passed into `tick`
//! once per host tick. All timing state lives in the mines themselves;
//! the manager sweeps them against a single tick snapshot, fires warnings,
//! relocates occupants and regenerates due mines. Every mutation raises the
//! dirty flag so the host knows when to persist.

use std::collections::BTreeMap;

use glam::IVec3;

use super::config::MineTypeTemplate;
use super::mine::Mine;
use crate::error::MineError;
use crate::world::{MineWorld, TICKS_PER_SECOND};

/// Registry of named mines for one world, plus the tick state machine.
///
/// Name-ordered iteration keeps listings and persistence deterministic.
/// Mutation during a tick sweep is disallowed by contract; admin calls are
/// serialized with ticking by the host's single-threaded loop.
#[derive(Debug, Default)]
pub struct MineManager {
    mines: BTreeMap<String, Mine>,
    dirty: bool,
}

impl MineManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mine from a type template and register it.
    ///
    /// Fails with [`MineError::NameTaken`] if the name is in use. The mine
    /// is returned unscheduled; callers typically regenerate it immediately.
    pub fn create(
        &mut self,
        name: &str,
        pos1: IVec3,
        pos2: IVec3,
        entrance: IVec3,
        template: &MineTypeTemplate,
        border_material: impl Into<String>,
    ) -> Result<&mut Mine, MineError> {
        let mine = Mine::new(pos1, pos2, entrance, template, border_material);
        self.insert(name, mine)?;
        Ok(self.mines.get_mut(name).expect("just inserted"))
    }

    /// Register an existing mine under a unique name
    pub fn insert(&mut self, name: &str, mine: Mine) -> Result<(), MineError> {
        if self.mines.contains_key(name) {
            return Err(MineError::NameTaken(name.to_string()));
        }
        self.mines.insert(name.to_string(), mine);
        self.dirty = true;
        Ok(())
    }

    /// Remove and return a mine
    pub fn remove(&mut self, name: &str) -> Result<Mine, MineError> {
        let mine = self
            .mines
            .remove(name)
            .ok_or_else(|| MineError::UnknownMine(name.to_string()))?;
        self.dirty = true;
        Ok(mine)
    }

    /// Move a mine to a new unique name
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), MineError> {
        if !self.mines.contains_key(old) {
            return Err(MineError::UnknownMine(old.to_string()));
        }
        if self.mines.contains_key(new) {
            return Err(MineError::NameTaken(new.to_string()));
        }
        let mine = self.mines.remove(old).expect("checked above");
        self.mines.insert(new.to_string(), mine);
        self.dirty = true;
        Ok(())
    }

    /// Relocate the entrance occupants are reset to
    pub fn set_entrance(&mut self, name: &str, entrance: IVec3) -> Result<(), MineError> {
        let mine = self
            .mines
            .get_mut(name)
            .ok_or_else(|| MineError::UnknownMine(name.to_string()))?;
        mine.entrance = entrance;
        self.dirty = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Mine> {
        self.mines.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Mine> {
        self.mines.get_mut(name)
    }

    /// Mines in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Mine)> {
        self.mines.iter()
    }

    /// Registered names, in order
    pub fn names(&self) -> Vec<&str> {
        self.mines.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.mines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mines.is_empty()
    }

    /// Whether unsaved mutations exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the host after a successful persist
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Raise the dirty flag after mutating a mine through `get_mut`
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Advance every mine against the world's current tick.
    ///
    /// The warning edge fires on exact equality with
    /// `next_reset_tick - warning_ticks`; a tick source that skips values can
    /// therefore miss a warning. The due edge uses `>=` and can never be
    /// missed: a late reset reschedules from the tick it actually ran.
    /// Mines with `next_reset_tick == 0` are idle and untouched.
    pub fn tick<W: MineWorld>(&mut self, world: &mut W) {
        let now = world.game_time();

        for (name, mine) in self.mines.iter_mut() {
            if mine.next_reset_tick == 0 {
                continue;
            }

            if now == mine.next_reset_tick.saturating_sub(mine.warning_ticks) {
                let seconds_left = mine.warning_ticks / TICKS_PER_SECOND;
                let text = format!("Mine resetting in {} seconds!", seconds_left);
                for occupant in world.occupants_in(&mine.region) {
                    if !world.hide_mine_messages(occupant) {
                        world.send_message(occupant, &text);
                    }
                }
            }

            if now >= mine.next_reset_tick {
                let affected = world.occupants_in(&mine.region);
                let yaw = mine.exit_yaw();
                for &occupant in &affected {
                    world.teleport(occupant, mine.entrance, yaw, 0.0);
                }

                mine.regenerate(world, now);

                let text = format!("Mine '{}' has been reset.", name);
                for &occupant in &affected {
                    if !world.hide_mine_messages(occupant) {
                        world.send_message(occupant, &text);
                    }
                }

                log::info!(
                    "[MINE] Reset '{}' at tick {} ({} occupants relocated)",
                    name,
                    now,
                    affected.len()
                );
                self.dirty = true;
            }
        }
    }
}
