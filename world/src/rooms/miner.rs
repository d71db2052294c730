//! Drill rooms that deliver a fixed stack of items while their drill stands.

use std::time::Duration;

use castle_rooms_core::{
    BlockKind, Event, Grid, ItemStack, PlayerData, RoomGeometry, RoomId, Team, MINER_INTERVAL,
};
use rand::Rng;

use super::{BlockRoom, Label, PurchaseContext};

const DRILL: BlockKind = BlockKind::LaserDrill;

/// Drill room state: the placement plus its production timer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinerRoom {
    placement: BlockRoom,
    output: ItemStack,
    elapsed: Duration,
}

impl MinerRoom {
    pub(super) const fn new(output: ItemStack, team: Team) -> Self {
        Self {
            placement: BlockRoom::new(DRILL, team),
            output,
            elapsed: Duration::ZERO,
        }
    }

    /// Placement state of the drill.
    #[must_use]
    pub const fn placement(&self) -> &BlockRoom {
        &self.placement
    }

    /// Items delivered every production period.
    #[must_use]
    pub const fn output(&self) -> ItemStack {
        self.output
    }

    /// Time accumulated toward the next delivery.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(super) fn buy<G: Grid, R: Rng>(
        &mut self,
        room: RoomId,
        geometry: &RoomGeometry,
        label: &mut Label,
        buyer: &PlayerData,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) {
        self.placement.place(room, geometry, label, buyer, ctx);
        self.elapsed = Duration::ZERO;
    }

    /// Reconciles the drill, then advances production only while it stands.
    pub(super) fn update<G: Grid>(
        &mut self,
        room: RoomId,
        geometry: &RoomGeometry,
        label: &mut Label,
        dt: Duration,
        grid: &G,
        out: &mut Vec<Event>,
    ) {
        self.placement.reconcile(room, geometry, label, grid, out);
        if !self.placement.is_bought() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed < MINER_INTERVAL {
            return;
        }

        // At most one delivery per tick; time past the period is dropped.
        self.elapsed = Duration::ZERO;
        out.push(Event::ItemsTransferred {
            team: self.placement.team(),
            stack: self.output,
            from: geometry.centre().to_world(),
        });
        tracing::debug!(
            room = room.get(),
            item = self.output.item().name(),
            amount = self.output.amount(),
            "miner delivered items"
        );
    }
}

pub(super) fn label(room: &MinerRoom, cost: u32) -> String {
    format!(
        "{} ({}) :[white] {cost}",
        room.placement.block().name(),
        room.output.item().name()
    )
}
