//! Dense in-memory tile map implementing the [`Grid`] contract.

use castle_rooms_core::{
    BlockCategory, BlockConfig, BlockKind, Building, Floor, Grid, Team, TileCoord,
};
use glam::Vec2;

/// Reference tile map used by the headless world and tests.
///
/// Every structure is anchored to a single tile; the footprint a real engine
/// would reserve around it is not modelled.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: u32,
    height: u32,
    floors: Vec<Floor>,
    buildings: Vec<Option<Building>>,
}

impl TileMap {
    /// Creates a map of stone tiles with no structures.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            floors: vec![Floor::default(); capacity],
            buildings: vec![None; capacity],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Floor of a tile, `None` outside the map.
    #[must_use]
    pub fn floor(&self, tile: TileCoord) -> Option<Floor> {
        self.index(tile)
            .and_then(|index| self.floors.get(index).copied())
    }

    /// Removes and returns the structure standing on a tile.
    pub fn remove(&mut self, tile: TileCoord) -> Option<Building> {
        let index = self.index(tile)?;
        self.buildings.get_mut(index).and_then(Option::take)
    }

    /// Iterator over every standing structure in row-major order.
    pub fn buildings(&self) -> impl Iterator<Item = (TileCoord, Building)> + '_ {
        self.buildings
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|building| (self.coord(index), building)))
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.x() < self.width && tile.y() < self.height {
            let row = usize::try_from(tile.y()).ok()?;
            let column = usize::try_from(tile.x()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn coord(&self, index: usize) -> TileCoord {
        let width = usize::try_from(self.width).unwrap_or(usize::MAX).max(1);
        let column = u32::try_from(index % width).unwrap_or(u32::MAX);
        let row = u32::try_from(index / width).unwrap_or(u32::MAX);
        TileCoord::new(column, row)
    }
}

impl Grid for TileMap {
    fn contains(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some()
    }

    fn set_floor(&mut self, tile: TileCoord, floor: Floor) {
        if let Some(index) = self.index(tile) {
            if let Some(slot) = self.floors.get_mut(index) {
                *slot = floor;
            }
        }
    }

    fn place(&mut self, tile: TileCoord, block: BlockKind, team: Team) {
        if let Some(index) = self.index(tile) {
            if let Some(slot) = self.buildings.get_mut(index) {
                *slot = Some(Building {
                    block,
                    team,
                    config: None,
                });
            }
        }
    }

    fn configure(&mut self, tile: TileCoord, config: BlockConfig) {
        if let Some(index) = self.index(tile) {
            if let Some(Some(building)) = self.buildings.get_mut(index) {
                building.config = Some(config);
            }
        }
    }

    fn building_at(&self, tile: TileCoord) -> Option<Building> {
        self.index(tile)
            .and_then(|index| self.buildings.get(index).copied().flatten())
    }

    fn core_position(&self, team: Team) -> Option<Vec2> {
        self.buildings()
            .find(|(_, building)| {
                building.team == team && building.block.category() == BlockCategory::Core
            })
            .map(|(tile, _)| tile.to_world())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_rooms_core::ItemKind;

    #[test]
    fn out_of_bounds_tiles_are_absent() {
        let mut map = TileMap::new(4, 3);
        let outside = TileCoord::new(4, 0);

        map.set_floor(outside, Floor::Plated);
        map.place(outside, BlockKind::Duo, Team::Blue);

        assert!(!map.contains(outside));
        assert_eq!(map.floor(outside), None);
        assert_eq!(map.building_at(outside), None);
        assert_eq!(map.buildings().count(), 0);
    }

    #[test]
    fn configure_requires_a_structure() {
        let mut map = TileMap::new(4, 4);
        let tile = TileCoord::new(1, 2);

        map.configure(tile, BlockConfig::Item(ItemKind::Copper));
        assert!(!map.is_occupied(tile));

        map.place(tile, BlockKind::ItemSource, Team::Sharded);
        map.configure(tile, BlockConfig::Item(ItemKind::Copper));
        assert_eq!(
            map.building_at(tile).and_then(|building| building.config),
            Some(BlockConfig::Item(ItemKind::Copper))
        );
    }

    #[test]
    fn core_position_reports_first_core_of_team() {
        let mut map = TileMap::new(10, 10);
        map.place(TileCoord::new(1, 1), BlockKind::Duo, Team::Blue);
        map.place(TileCoord::new(5, 2), BlockKind::CoreNucleus, Team::Blue);
        map.place(TileCoord::new(2, 7), BlockKind::CoreShard, Team::Sharded);

        assert_eq!(map.core_position(Team::Blue), Some(Vec2::new(40.0, 16.0)));
        assert_eq!(map.core_position(Team::Sharded), Some(Vec2::new(16.0, 56.0)));

        let removed = map.remove(TileCoord::new(5, 2));
        assert_eq!(removed.map(|building| building.block), Some(BlockKind::CoreNucleus));
        assert_eq!(map.core_position(Team::Blue), None);
    }
}
