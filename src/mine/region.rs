//! Axis-aligned mine regions

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Inclusive axis-aligned box, normalised so `min <= max` on every axis.
///
/// The border shell covers both vertical side faces, both horizontal side
/// faces and the floor; the top face is deliberately left open so the mine
/// can be entered from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min: IVec3,
    pub max: IVec3,
}

impl Region {
    /// Create a region from two opposite corners in any order
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns true if `pos` lies within the region (inclusive on all faces)
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }

    /// Horizontal center of the region in block-center coordinates
    pub fn horizontal_center(&self) -> (f64, f64) {
        (
            (self.min.x + self.max.x) as f64 / 2.0 + 0.5,
            (self.min.z + self.max.z) as f64 / 2.0 + 0.5,
        )
    }

    /// Border shell predicate: side walls and floor, top face excluded
    pub fn is_border(&self, pos: IVec3) -> bool {
        pos.x == self.min.x
            || pos.x == self.max.x
            || pos.y == self.min.y
            || pos.z == self.min.z
            || pos.z == self.max.z
    }

    /// Lowest interior Y slice (one above the floor)
    pub fn interior_bottom_y(&self) -> i32 {
        self.min.y + 1
    }

    /// Highest interior Y slice; equals `max.y` because the top is open
    pub fn interior_top_y(&self) -> i32 {
        self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_normalised_regardless_of_order() {
        let region = Region::new(IVec3::new(10, -5, 3), IVec3::new(-2, 7, 3));
        assert_eq!(region.min, IVec3::new(-2, -5, 3));
        assert_eq!(region.max, IVec3::new(10, 7, 3));

        let same = Region::new(region.max, region.min);
        assert_eq!(same, region);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 4, 4));
        assert!(region.contains(IVec3::ZERO));
        assert!(region.contains(IVec3::new(4, 4, 4)));
        assert!(region.contains(IVec3::new(2, 0, 3)));
        assert!(!region.contains(IVec3::new(5, 2, 2)));
        assert!(!region.contains(IVec3::new(2, -1, 2)));
    }

    #[test]
    fn test_border_excludes_top_face() {
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 4, 4));

        // Floor and walls
        assert!(region.is_border(IVec3::new(2, 0, 2)));
        assert!(region.is_border(IVec3::new(0, 2, 2)));
        assert!(region.is_border(IVec3::new(4, 2, 2)));
        assert!(region.is_border(IVec3::new(2, 2, 0)));
        assert!(region.is_border(IVec3::new(2, 2, 4)));

        // Top face center is open; top edge still belongs to a wall
        assert!(!region.is_border(IVec3::new(2, 4, 2)));
        assert!(region.is_border(IVec3::new(0, 4, 2)));

        // Interior
        assert!(!region.is_border(IVec3::new(2, 2, 2)));
    }

    #[test]
    fn test_horizontal_center() {
        let region = Region::new(IVec3::ZERO, IVec3::new(4, 4, 4));
        assert_eq!(region.horizontal_center(), (2.5, 2.5));
    }
}
