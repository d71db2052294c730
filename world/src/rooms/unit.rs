//! Rooms that trade money for a unit and an income adjustment.

use std::cmp::Ordering;

use castle_rooms_core::{
    Event, Grid, PlayerData, PurchaseRejection, RoomRole, Team, UnitKind, DEFENDER_OFFSET,
    SPAWN_SCATTER,
};
use glam::Vec2;
use rand::Rng;

use super::PurchaseContext;

/// Unit room state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitRoom {
    unit: UnitKind,
    role: RoomRole,
    income_delta: i32,
}

impl UnitRoom {
    pub(super) const fn new(unit: UnitKind, role: RoomRole, income_delta: i32) -> Self {
        Self {
            unit,
            role,
            income_delta,
        }
    }

    /// Unit spawned on purchase.
    #[must_use]
    pub const fn unit(&self) -> UnitKind {
        self.unit
    }

    /// Where spawned units appear.
    #[must_use]
    pub const fn role(&self) -> RoomRole {
        self.role
    }

    /// Signed income change applied on purchase.
    #[must_use]
    pub const fn income_delta(&self) -> i32 {
        self.income_delta
    }

    /// Income-raising rooms are always allowed; others must leave income non-negative.
    pub(super) fn eligibility(&self, player: &PlayerData) -> Result<(), PurchaseRejection> {
        let remaining = player.income().saturating_add(i64::from(self.income_delta));
        if self.income_delta > 0 || remaining >= 0 {
            Ok(())
        } else {
            Err(PurchaseRejection::IncomeWouldGoNegative)
        }
    }

    pub(super) fn buy<G: Grid, R: Rng>(
        &self,
        player: &mut PlayerData,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) {
        player.adjust_income(self.income_delta);

        let team = player.team();
        let Some(position) = self.spawn_position(team, ctx) else {
            tracing::debug!(
                unit = self.unit.name(),
                ?team,
                "no core to defend, unit not spawned"
            );
            return;
        };
        ctx.events.push(Event::UnitSpawnRequested {
            team,
            unit: self.unit,
            position,
        });
    }

    fn spawn_position<G: Grid, R: Rng>(
        &self,
        team: Team,
        ctx: &mut PurchaseContext<'_, G, R>,
    ) -> Option<Vec2> {
        match self.role {
            RoomRole::Attack => {
                let spawn = ctx.spawns.for_team(team.opponent()).to_world();
                let dx = scatter(&mut *ctx.rng);
                let dy = scatter(&mut *ctx.rng);
                Some(spawn + Vec2::new(dx, dy))
            }
            RoomRole::Defend => {
                let core = ctx.grid.core_position(team)?;
                let dy = scatter(&mut *ctx.rng);
                Some(Vec2::new(core.x + DEFENDER_OFFSET, core.y + dy))
            }
        }
    }
}

fn scatter<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(-SPAWN_SCATTER..=SPAWN_SCATTER)
}

pub(super) fn label(unit: UnitKind, role: RoomRole, income_delta: i32, cost: u32) -> String {
    let income = income_delta.to_string();
    let price = cost.to_string();
    let padding = " ".repeat((income.len() + price.len() + 2) / 2);
    let marker = match role {
        RoomRole::Attack => "[accent]attack",
        RoomRole::Defend => "[scarlet]defend",
    };
    let colour = match income_delta.cmp(&0) {
        Ordering::Less => "[crimson]",
        Ordering::Equal => "[gray]",
        Ordering::Greater => "[lime]+",
    };
    format!(
        "{padding}{} {marker}\n[gray]{price}\n[white]income : {colour}{income}",
        unit.name()
    )
}

#[cfg(test)]
mod tests {
    use castle_rooms_core::PlayerId;

    use super::*;

    #[test]
    fn label_colours_income_by_sign() {
        assert_eq!(
            label(UnitKind::Dagger, RoomRole::Attack, -5, 60),
            "   dagger [accent]attack\n[gray]60\n[white]income : [crimson]-5"
        );
        assert!(label(UnitKind::Poly, RoomRole::Defend, 0, 80).ends_with("[gray]0"));
        assert!(label(UnitKind::Flare, RoomRole::Attack, 3, 120).ends_with("[lime]+3"));
    }

    #[test]
    fn neutral_rooms_need_non_negative_income() {
        let room = UnitRoom::new(UnitKind::Nova, RoomRole::Defend, 0);
        let indebted = PlayerData::new(PlayerId::new(1), "a", Team::Blue, 0, -10);
        assert_eq!(
            room.eligibility(&indebted),
            Err(PurchaseRejection::IncomeWouldGoNegative)
        );

        let steady = PlayerData::new(PlayerId::new(2), "b", Team::Blue, 0, 0);
        assert!(room.eligibility(&steady).is_ok());
    }
}
