//! Purchasable rooms and their per-variant behaviour.
//!
//! Every room shares one [`Room`] record holding its footprint, price and
//! label, and carries its variant state in [`RoomKind`]. The purchase contract
//! (`eligibility`/`buy`/`update`/`spawn`) dispatches on the variant with an
//! explicit `match`. Behaviour common to all rooms, such as the funds check and
//! the charge, lives in helpers each dispatch arm relies on.

mod block;
mod miner;
mod objective;
mod unit;

pub use block::BlockRoom;
pub use miner::MinerRoom;
pub use objective::CoreRoom;
pub use unit::UnitRoom;

use std::time::Duration;

use castle_rooms_core::{
    BlockKind, Event, Floor, Grid, ItemStack, PlayerData, PurchaseRejection, RoomGeometry,
    RoomId, RoomRole, RoomSnapshot, RoomTag, SpawnPoints, Team, TileCoord, UnitKind,
    UNIT_ROOM_SIZE,
};
use glam::Vec2;
use rand::Rng;

/// Rich-text label floating above a room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    text: String,
    visible: bool,
}

impl Label {
    fn new(text: String) -> Self {
        Self {
            text,
            visible: true,
        }
    }

    /// Text of the label, possibly empty.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the label is currently displayed.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Collaborators a purchase touches besides the buyer's record.
pub struct PurchaseContext<'a, G, R> {
    /// Map receiving the purchased structure.
    pub grid: &'a mut G,
    /// Randomness for ammunition choice and spawn scatter.
    pub rng: &'a mut R,
    /// Spawn points of both teams.
    pub spawns: &'a SpawnPoints,
    /// Buffer receiving the events emitted by the purchase.
    pub events: &'a mut Vec<Event>,
}

/// Variant state of a room.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomKind {
    /// Room selling an arbitrary structure.
    Block(BlockRoom),
    /// Room selling a drill that feeds the team's core.
    Miner(MinerRoom),
    /// Room selling the objective core.
    Core(CoreRoom),
    /// Room selling a unit and an income adjustment.
    Unit(UnitRoom),
}

/// Purchasable, grid-aligned area of the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    id: RoomId,
    geometry: RoomGeometry,
    cost: u32,
    label: Label,
    kind: RoomKind,
}

impl Room {
    fn new(id: RoomId, geometry: RoomGeometry, cost: u32, label: String, kind: RoomKind) -> Self {
        Self {
            id,
            geometry,
            cost,
            label: Label::new(label),
            kind,
        }
    }

    pub(crate) fn block(
        id: RoomId,
        block: BlockKind,
        team: Team,
        origin: TileCoord,
        cost: u32,
        size: u32,
    ) -> Self {
        Self::new(
            id,
            RoomGeometry::new(origin, size),
            cost,
            block::label(block, cost),
            RoomKind::Block(BlockRoom::new(block, team)),
        )
    }

    pub(crate) fn miner(
        id: RoomId,
        output: ItemStack,
        team: Team,
        origin: TileCoord,
        cost: u32,
    ) -> Self {
        let room = MinerRoom::new(output, team);
        Self::new(
            id,
            RoomGeometry::new(origin, room.placement().block().size() + 1),
            cost,
            miner::label(&room, cost),
            RoomKind::Miner(room),
        )
    }

    pub(crate) fn core(id: RoomId, team: Team, origin: TileCoord, cost: u32) -> Self {
        let room = CoreRoom::new(team);
        Self::new(
            id,
            RoomGeometry::new(origin, objective::room_size()),
            cost,
            block::label(room.placement().block(), cost),
            RoomKind::Core(room),
        )
    }

    pub(crate) fn unit(
        id: RoomId,
        unit: UnitKind,
        role: RoomRole,
        income_delta: i32,
        origin: TileCoord,
        cost: u32,
    ) -> Self {
        Self::new(
            id,
            RoomGeometry::new(origin, UNIT_ROOM_SIZE),
            cost,
            unit::label(unit, role, income_delta, cost),
            RoomKind::Unit(UnitRoom::new(unit, role, income_delta)),
        )
    }

    /// Identifier allocated by the registry.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Footprint of the room.
    #[must_use]
    pub const fn geometry(&self) -> &RoomGeometry {
        &self.geometry
    }

    /// Purchase price.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Label floating above the room.
    #[must_use]
    pub const fn label(&self) -> &Label {
        &self.label
    }

    /// Variant state of the room.
    #[must_use]
    pub const fn kind(&self) -> &RoomKind {
        &self.kind
    }

    /// Variant tag of the room.
    #[must_use]
    pub const fn tag(&self) -> RoomTag {
        match self.kind {
            RoomKind::Block(_) => RoomTag::Block,
            RoomKind::Miner(_) => RoomTag::Miner,
            RoomKind::Core(_) => RoomTag::Core,
            RoomKind::Unit(_) => RoomTag::Unit,
        }
    }

    /// Bought state of structure rooms; unit rooms track none.
    #[must_use]
    pub fn is_bought(&self) -> Option<bool> {
        match &self.kind {
            RoomKind::Block(room) => Some(room.is_bought()),
            RoomKind::Miner(room) => Some(room.placement().is_bought()),
            RoomKind::Core(room) => Some(room.placement().is_bought()),
            RoomKind::Unit(_) => None,
        }
    }

    /// Reports whether the world-space point lies strictly inside the room.
    #[must_use]
    pub fn check(&self, point: Vec2) -> bool {
        self.geometry.contains(point)
    }

    /// Reports whether the player may buy the room right now.
    #[must_use]
    pub fn can_buy<G: Grid>(&self, player: &PlayerData, grid: &G) -> bool {
        self.eligibility(player, grid).is_ok()
    }

    /// Evaluates every purchase policy, returning the first one that refuses.
    pub fn eligibility<G: Grid>(
        &self,
        player: &PlayerData,
        grid: &G,
    ) -> Result<(), PurchaseRejection> {
        funds_available(self.cost, player)?;
        match &self.kind {
            RoomKind::Block(room) => room.eligibility(&self.geometry, grid),
            RoomKind::Miner(room) => room.placement().eligibility(&self.geometry, grid),
            RoomKind::Core(room) => room.eligibility(),
            RoomKind::Unit(room) => room.eligibility(player),
        }
    }

    /// Charges the player and applies the room's purchase side effects.
    ///
    /// No policy is re-evaluated here; callers must have seen
    /// [`Room::eligibility`] succeed for this player and map state.
    pub fn buy<G: Grid, R: Rng>(
        &mut self,
        player: &mut PlayerData,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) {
        charge(self.cost, player);
        match &mut self.kind {
            RoomKind::Block(room) => {
                room.place(self.id, &self.geometry, &mut self.label, player, ctx);
            }
            RoomKind::Miner(room) => {
                room.buy(self.id, &self.geometry, &mut self.label, player, ctx);
            }
            RoomKind::Core(room) => {
                room.buy(self.id, &self.geometry, &mut self.label, player, ctx);
            }
            RoomKind::Unit(room) => room.buy(player, ctx),
        }
    }

    /// Runs the room's per-tick behaviour.
    pub fn update<G: Grid>(&mut self, dt: Duration, grid: &G, out: &mut Vec<Event>) {
        match &mut self.kind {
            RoomKind::Block(room) => {
                room.reconcile(self.id, &self.geometry, &mut self.label, grid, out);
            }
            RoomKind::Miner(room) => {
                room.update(self.id, &self.geometry, &mut self.label, dt, grid, out);
            }
            RoomKind::Core(_) | RoomKind::Unit(_) => {}
        }
    }

    /// Paints the room's floor onto the map.
    pub fn spawn<G: Grid>(&self, grid: &mut G) {
        match &self.kind {
            RoomKind::Core(_) => paint(&self.geometry, grid, |_| Floor::DarkPanel),
            RoomKind::Block(_) | RoomKind::Miner(_) | RoomKind::Unit(_) => {
                paint(&self.geometry, grid, |border| {
                    if border {
                        Floor::PlatedBorder
                    } else {
                        Floor::Plated
                    }
                });
            }
        }
    }

    /// Captures an immutable snapshot of the room.
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            tag: self.tag(),
            geometry: self.geometry,
            cost: self.cost,
            label: self.label.text.clone(),
            label_visible: self.label.visible,
            bought: self.is_bought(),
        }
    }
}

fn funds_available(cost: u32, player: &PlayerData) -> Result<(), PurchaseRejection> {
    if player.money() >= i64::from(cost) {
        Ok(())
    } else {
        Err(PurchaseRejection::InsufficientFunds)
    }
}

fn charge(cost: u32, player: &mut PlayerData) {
    player.spend(cost);
}

/// Paints offsets `0..=size` on both axes, so the outline closes one tile past `end`.
fn paint<G, F>(geometry: &RoomGeometry, grid: &mut G, floor_for: F)
where
    G: Grid,
    F: Fn(bool) -> Floor,
{
    let size = geometry.size();
    let origin = geometry.origin();
    for dx in 0..=size {
        for dy in 0..=size {
            let tile = origin.offset(dx, dy);
            if !grid.contains(tile) {
                continue;
            }
            let border = dx == 0 || dy == 0 || dx == size || dy == size;
            grid.set_floor(tile, floor_for(border));
        }
    }
}
