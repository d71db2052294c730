//! The objective core room.
//!
//! Once bought the core never returns to sale: losing it ends the match, which
//! is handled outside the room economy.

use castle_rooms_core::{BlockKind, Grid, PlayerData, PurchaseRejection, RoomGeometry, RoomId, Team};
use rand::Rng;

use super::{BlockRoom, Label, PurchaseContext};

const CORE: BlockKind = BlockKind::CoreNucleus;

/// Objective room state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreRoom {
    placement: BlockRoom,
}

impl CoreRoom {
    pub(super) const fn new(team: Team) -> Self {
        Self {
            placement: BlockRoom::new(CORE, team),
        }
    }

    /// Placement state of the core.
    #[must_use]
    pub const fn placement(&self) -> &BlockRoom {
        &self.placement
    }

    /// Only refuses a second purchase; the core slot is never checked for occupancy.
    pub(super) fn eligibility(&self) -> Result<(), PurchaseRejection> {
        if self.placement.is_bought() {
            Err(PurchaseRejection::AlreadyBought)
        } else {
            Ok(())
        }
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
    }
}

/// Core rooms are sized after the smallest core, whichever core they sell.
pub(super) const fn room_size() -> u32 {
    BlockKind::CoreShard.size() + 1
}
