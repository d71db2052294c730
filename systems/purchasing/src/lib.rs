#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure purchasing system that turns player interactions into purchase commands.
//!
//! Interactions are resolved against a [`RoomView`] captured before the batch,
//! so every purchase emitted here is re-validated by the world when applied.
//! Rooms that hold a structure are claimed by at most one funded player per
//! batch. Unit rooms track no occupancy and are never claimed, so every
//! interaction with them turns into a purchase.

use std::collections::BTreeSet;

use castle_rooms_core::{Command, PlayerId, RoomId, RoomView};
use glam::Vec2;

/// A player pressing the purchase action while standing at a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    /// Player who interacted.
    pub player: PlayerId,
    /// World-space position of the player.
    pub position: Vec2,
}

impl Interaction {
    /// Creates a new interaction descriptor.
    #[must_use]
    pub const fn new(player: PlayerId, position: Vec2) -> Self {
        Self { player, position }
    }
}

/// Pure system that serialises purchase requests per room.
#[derive(Debug, Default)]
pub struct Purchasing {
    claimed: BTreeSet<RoomId>,
}

impl Purchasing {
    /// Creates a new purchasing system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one batch of interactions and emits purchase commands.
    ///
    /// Interactions are ordered by player identifier before resolution so the
    /// outcome does not depend on input arrival order. Rooms whose structure is
    /// already standing are skipped without emitting anything. `funds` reports
    /// a player's money; a player who cannot cover the cost still has their
    /// request forwarded for the world to reject, but does not claim the room.
    pub fn handle<F>(
        &mut self,
        interactions: &[Interaction],
        rooms: &RoomView,
        mut funds: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(PlayerId) -> Option<i64>,
    {
        self.claimed.clear();

        let mut ordered: Vec<&Interaction> = interactions.iter().collect();
        ordered.sort_by_key(|interaction| interaction.player);

        for interaction in ordered {
            let Some(room) = rooms.room_at(interaction.position) else {
                continue;
            };
            match room.bought {
                Some(true) => continue,
                Some(false) => {
                    if self.claimed.contains(&room.id) {
                        continue;
                    }
                    let affordable = funds(interaction.player)
                        .is_some_and(|money| money >= i64::from(room.cost));
                    if affordable {
                        let _ = self.claimed.insert(room.id);
                    }
                }
                None => {}
            }
            out.push(Command::PurchaseRoom {
                player: interaction.player,
                room: room.id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use castle_rooms_core::{RoomGeometry, RoomSnapshot, RoomTag, TileCoord};

    use super::*;

    fn snapshot(id: u32, origin: TileCoord, bought: Option<bool>) -> RoomSnapshot {
        RoomSnapshot {
            id: RoomId::new(id),
            tag: if bought.is_some() {
                RoomTag::Block
            } else {
                RoomTag::Unit
            },
            geometry: RoomGeometry::new(origin, 4),
            cost: 10,
            label: String::new(),
            label_visible: true,
            bought,
        }
    }

    #[test]
    fn claims_reset_between_batches() {
        let view = RoomView::from_snapshots(vec![snapshot(0, TileCoord::new(0, 0), Some(false))]);
        let interaction = Interaction::new(PlayerId::new(1), Vec2::new(16.0, 16.0));
        let mut purchasing = Purchasing::new();
        let mut commands = Vec::new();

        purchasing.handle(&[interaction], &view, |_| Some(100), &mut commands);
        purchasing.handle(&[interaction], &view, |_| Some(100), &mut commands);

        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn unit_rooms_are_never_claimed() {
        let view = RoomView::from_snapshots(vec![snapshot(0, TileCoord::new(0, 0), None)]);
        let position = Vec2::new(16.0, 16.0);
        let interactions = [
            Interaction::new(PlayerId::new(2), position),
            Interaction::new(PlayerId::new(1), position),
        ];
        let mut purchasing = Purchasing::new();
        let mut commands = Vec::new();

        purchasing.handle(&interactions, &view, |_| Some(100), &mut commands);

        assert_eq!(
            commands,
            vec![
                Command::PurchaseRoom {
                    player: PlayerId::new(1),
                    room: RoomId::new(0),
                },
                Command::PurchaseRoom {
                    player: PlayerId::new(2),
                    room: RoomId::new(0),
                },
            ]
        );
    }

    #[test]
    fn unfunded_players_do_not_claim_rooms() {
        let view = RoomView::from_snapshots(vec![snapshot(0, TileCoord::new(0, 0), Some(false))]);
        let position = Vec2::new(16.0, 16.0);
        let interactions = [
            Interaction::new(PlayerId::new(1), position),
            Interaction::new(PlayerId::new(2), position),
            Interaction::new(PlayerId::new(3), position),
        ];
        let mut purchasing = Purchasing::new();
        let mut commands = Vec::new();

        purchasing.handle(
            &interactions,
            &view,
            |player| (player != PlayerId::new(1)).then_some(10),
            &mut commands,
        );

        let players: Vec<PlayerId> = commands
            .iter()
            .map(|command| match command {
                Command::PurchaseRoom { player, .. } => *player,
                other => panic!("unexpected command: {other:?}"),
            })
            .collect();
        assert_eq!(players, vec![PlayerId::new(1), PlayerId::new(2)]);
    }
}
