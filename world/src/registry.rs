//! Arena owning every room of a match.

use std::time::Duration;

use castle_rooms_core::{
    BlockKind, Event, Grid, ItemStack, PlayerData, PurchaseRejection, RoomBlueprint, RoomId,
    RoomRole, RoomView, Team, TileCoord, UnitKind,
};
use glam::Vec2;
use rand::Rng;

use crate::rooms::{PurchaseContext, Room};

/// Ordered collection of rooms addressed by [`RoomId`].
///
/// Identifiers are dense indices handed out in registration order, which is
/// also the order rooms are updated and hit-tested in.
#[derive(Clone, Debug, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a structure room sized one tile larger than the structure.
    pub fn add_block_room(
        &mut self,
        block: BlockKind,
        team: Team,
        origin: TileCoord,
        cost: u32,
    ) -> RoomId {
        self.add_block_room_sized(block, team, origin, cost, block.size() + 1)
    }

    /// Registers a structure room with an explicit footprint.
    pub fn add_block_room_sized(
        &mut self,
        block: BlockKind,
        team: Team,
        origin: TileCoord,
        cost: u32,
        size: u32,
    ) -> RoomId {
        let id = self.next_id();
        self.insert(Room::block(id, block, team, origin, cost, size))
    }

    /// Registers a drill room delivering `output` to the team's core.
    pub fn add_miner_room(
        &mut self,
        output: ItemStack,
        team: Team,
        origin: TileCoord,
        cost: u32,
    ) -> RoomId {
        let id = self.next_id();
        self.insert(Room::miner(id, output, team, origin, cost))
    }

    /// Registers the team's objective core room.
    pub fn add_core_room(&mut self, team: Team, origin: TileCoord, cost: u32) -> RoomId {
        let id = self.next_id();
        self.insert(Room::core(id, team, origin, cost))
    }

    /// Registers a unit room.
    pub fn add_unit_room(
        &mut self,
        unit: UnitKind,
        role: RoomRole,
        income_delta: i32,
        origin: TileCoord,
        cost: u32,
    ) -> RoomId {
        let id = self.next_id();
        self.insert(Room::unit(id, unit, role, income_delta, origin, cost))
    }

    /// Registers the room described by a blueprint.
    pub fn add_blueprint(&mut self, blueprint: &RoomBlueprint) -> RoomId {
        match *blueprint {
            RoomBlueprint::Block {
                block,
                team,
                origin,
                cost,
                size: Some(size),
            } => self.add_block_room_sized(block, team, origin, cost, size),
            RoomBlueprint::Block {
                block,
                team,
                origin,
                cost,
                size: None,
            } => self.add_block_room(block, team, origin, cost),
            RoomBlueprint::Miner {
                output,
                team,
                origin,
                cost,
            } => self.add_miner_room(output, team, origin, cost),
            RoomBlueprint::Core { team, origin, cost } => self.add_core_room(team, origin, cost),
            RoomBlueprint::Unit {
                unit,
                role,
                income,
                origin,
                cost,
            } => self.add_unit_room(unit, role, income, origin, cost),
        }
    }

    /// Room registered under the identifier.
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        let index = usize::try_from(id.get()).ok()?;
        self.rooms.get(index)
    }

    /// Iterator over every room in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of registered rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Reports whether no room is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// First room whose bounds contain the world-space point.
    #[must_use]
    pub fn room_at(&self, point: Vec2) -> Option<RoomId> {
        self.rooms.iter().find(|room| room.check(point)).map(Room::id)
    }

    /// Runs one tick of every room's periodic behaviour.
    pub fn update_all<G: Grid>(&mut self, dt: Duration, grid: &G, out: &mut Vec<Event>) {
        for room in &mut self.rooms {
            room.update(dt, grid, out);
        }
    }

    /// Checks eligibility and buys the room in one step.
    ///
    /// Holding the registry mutably for both halves means no other purchase can
    /// slip between the check and the act.
    pub fn purchase<G: Grid, R: Rng>(
        &mut self,
        id: RoomId,
        player: &mut PlayerData,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) -> Result<(), PurchaseRejection> {
        let room = self.get_mut(id).ok_or(PurchaseRejection::UnknownRoom)?;
        room.eligibility(player, &*ctx.grid)?;

        ctx.events.push(Event::RoomPurchased {
            room: id,
            player: player.id(),
            cost: room.cost(),
        });
        room.buy(player, ctx);
        Ok(())
    }

    /// Captures snapshots of every room.
    #[must_use]
    pub fn view(&self) -> RoomView {
        RoomView::from_snapshots(self.rooms.iter().map(Room::snapshot).collect())
    }

    /// Drops every room at match teardown.
    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        let index = usize::try_from(id.get()).ok()?;
        self.rooms.get_mut(index)
    }

    fn next_id(&self) -> RoomId {
        RoomId::new(u32::try_from(self.rooms.len()).unwrap_or(u32::MAX))
    }

    fn insert(&mut self, room: Room) -> RoomId {
        let id = room.id();
        self.rooms.push(room);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_rooms_core::ItemKind;

    #[test]
    fn identifiers_follow_registration_order() {
        let mut registry = RoomRegistry::new();
        let first = registry.add_block_room(BlockKind::Duo, Team::Blue, TileCoord::new(0, 0), 50);
        let second = registry.add_miner_room(
            ItemStack::new(ItemKind::Titanium, 12),
            Team::Blue,
            TileCoord::new(10, 0),
            400,
        );

        assert_eq!(first, RoomId::new(0));
        assert_eq!(second, RoomId::new(1));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.iter().map(Room::id).collect::<Vec<_>>(),
            vec![first, second]
        );
    }

    #[test]
    fn default_footprints_follow_structure_sizes() {
        let mut registry = RoomRegistry::new();
        let duo = registry.add_block_room(BlockKind::Duo, Team::Blue, TileCoord::new(0, 0), 50);
        let ripple =
            registry.add_block_room(BlockKind::Ripple, Team::Blue, TileCoord::new(4, 0), 900);
        let core = registry.add_core_room(Team::Blue, TileCoord::new(20, 0), 5_000);
        let unit = registry.add_unit_room(
            UnitKind::Dagger,
            RoomRole::Attack,
            -5,
            TileCoord::new(30, 0),
            60,
        );

        let size = |id| registry.get(id).map(|room| room.geometry().size());
        assert_eq!(size(duo), Some(2));
        assert_eq!(size(ripple), Some(4));
        assert_eq!(size(core), Some(4));
        assert_eq!(size(unit), Some(4));
    }

    #[test]
    fn room_at_returns_first_registered_match() {
        let mut registry = RoomRegistry::new();
        let outer =
            registry.add_block_room_sized(BlockKind::Duo, Team::Blue, TileCoord::new(0, 0), 10, 8);
        let _inner =
            registry.add_block_room_sized(BlockKind::Hail, Team::Blue, TileCoord::new(2, 2), 10, 2);

        assert_eq!(registry.room_at(Vec2::new(20.0, 20.0)), Some(outer));
        assert_eq!(registry.room_at(Vec2::new(100.0, 20.0)), None);
    }

    #[test]
    fn unknown_identifiers_resolve_to_nothing() {
        let registry = RoomRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(RoomId::new(3)).is_none());
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = RoomRegistry::new();
        let _ = registry.add_core_room(Team::Sharded, TileCoord::new(0, 0), 100);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.view().into_vec().is_empty());
    }
}
