//! Active-crop index so the day tick only visits planted tiles.

use std::collections::HashMap;

use crate::shared::*;

/// Dense list of coordinates whose tile carries a crop, with a position
/// index for O(1) register/unregister (swap-remove).
///
/// Holds coordinates, not crops: the tile stays the sole owner of its
/// `CropInstance`.
#[derive(Debug, Clone, Default)]
pub struct CropGrowthRegistry {
    active: Vec<GridCoordinate>,
    positions: HashMap<GridCoordinate, usize>,
}

impl CropGrowthRegistry {
    /// Returns false if the coordinate was already registered.
    pub fn register(&mut self, coordinate: GridCoordinate) -> bool {
        if self.positions.contains_key(&coordinate) {
            return false;
        }
        self.positions.insert(coordinate, self.active.len());
        self.active.push(coordinate);
        true
    }

    /// Returns false if the coordinate was not registered.
    pub fn unregister(&mut self, coordinate: GridCoordinate) -> bool {
        let Some(index) = self.positions.remove(&coordinate) else {
            return false;
        };
        self.active.swap_remove(index);
        if let Some(&moved) = self.active.get(index) {
            self.positions.insert(moved, index);
        }
        true
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        self.positions.contains_key(&coordinate)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.active.iter().copied()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.positions.clear();
    }
}
