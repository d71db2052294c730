//! Rooms that sell a single structure and track whether it still stands.

use castle_rooms_core::{
    BlockCategory, BlockConfig, BlockKind, Event, Grid, LiquidKind, Message, PlayerData,
    PurchaseRejection, Recipient, RoomGeometry, RoomId, Team, TileCoord, ANNOUNCEMENT_DURATION,
};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng};

use super::{Label, PurchaseContext};

const COOLANT: LiquidKind = LiquidKind::Cryofluid;

/// Placement state shared by every structure-selling room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRoom {
    block: BlockKind,
    team: Team,
    bought: bool,
}

impl BlockRoom {
    pub(super) const fn new(block: BlockKind, team: Team) -> Self {
        Self {
            block,
            team,
            bought: false,
        }
    }

    /// Structure placed on purchase.
    #[must_use]
    pub const fn block(&self) -> BlockKind {
        self.block
    }

    /// Team owning the structure.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Whether the structure currently stands on the map.
    #[must_use]
    pub const fn is_bought(&self) -> bool {
        self.bought
    }

    pub(super) fn eligibility<G: Grid>(
        &self,
        geometry: &RoomGeometry,
        grid: &G,
    ) -> Result<(), PurchaseRejection> {
        if self.bought {
            return Err(PurchaseRejection::AlreadyBought);
        }
        if grid.is_occupied(geometry.centre()) {
            return Err(PurchaseRejection::SlotOccupied);
        }
        Ok(())
    }

    /// Places the structure and its feeder, then announces the purchase.
    pub(super) fn place<G: Grid, R: Rng>(
        &mut self,
        room: RoomId,
        geometry: &RoomGeometry,
        label: &mut Label,
        buyer: &PlayerData,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) {
        let centre = geometry.centre();
        ctx.grid.place(centre, self.block, self.team);
        install_feeder(self.block, self.team, geometry.feeder(), ctx);

        self.bought = true;
        label.hide();

        ctx.events.push(Event::Announcement {
            recipient: Recipient::Everyone,
            message: Message::Purchase {
                buyer: buyer.name().to_owned(),
            },
            duration: ANNOUNCEMENT_DURATION,
            position: Vec2::new(centre.to_world().x, geometry.origin().to_world().y),
        });
        tracing::debug!(
            room = room.get(),
            block = self.block.name(),
            buyer = buyer.name(),
            "structure placed"
        );
    }

    /// Marks the room for sale again once its structure has disappeared.
    pub(super) fn reconcile<G: Grid>(
        &mut self,
        room: RoomId,
        geometry: &RoomGeometry,
        label: &mut Label,
        grid: &G,
        out: &mut Vec<Event>,
    ) {
        if !self.bought || grid.is_occupied(geometry.centre()) {
            return;
        }

        self.bought = false;
        label.show();
        out.push(Event::RoomReverted { room });
        tracing::info!(
            room = room.get(),
            block = self.block.name(),
            "structure lost, room is for sale again"
        );
    }
}

/// Supplies the structure next to it with the resource its category consumes.
fn install_feeder<G: Grid, R: Rng>(
    block: BlockKind,
    team: Team,
    tile: TileCoord,
    ctx: &mut PurchaseContext<'_, G, R>,
) {
    match block.category() {
        BlockCategory::ItemTurret { ammo } => {
            ctx.grid.place(tile, BlockKind::ItemSource, team);
            if let Some(item) = ammo.choose(&mut *ctx.rng) {
                ctx.grid.configure(tile, BlockConfig::Item(*item));
            }
        }
        BlockCategory::LiquidTurret { ammo } => {
            ctx.grid.place(tile, BlockKind::LiquidSource, team);
            if let Some(liquid) = ammo.choose(&mut *ctx.rng) {
                ctx.grid.configure(tile, BlockConfig::Liquid(*liquid));
            }
        }
        BlockCategory::LaserTurret | BlockCategory::Support => {
            ctx.grid.place(tile, BlockKind::LiquidSource, team);
            ctx.grid.configure(tile, BlockConfig::Liquid(COOLANT));
        }
        BlockCategory::Core | BlockCategory::Passive => {}
    }
}

pub(super) fn label(block: BlockKind, cost: u32) -> String {
    format!("{} :[white] {cost}", block.name())
}
