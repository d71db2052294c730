//! Headless match loop driving the world with the purchasing and income systems.

use std::{collections::BTreeMap, time::Duration};

use castle_rooms_core::{Command, Event, ItemKind, PlayerData, PlayerId, RoomId, RoomTag, Team};
use castle_rooms_system_income::{Config as IncomeConfig, Income};
use castle_rooms_system_purchasing::{Interaction, Purchasing};
use castle_rooms_world::{self as world, query, World, WorldConfig};
use serde::Serialize;

use crate::scenario::Scenario;

/// Knobs of a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunOptions {
    pub(crate) ticks: u64,
    pub(crate) tick: Duration,
    pub(crate) seed: u64,
}

/// Outcome of a headless run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) elapsed_ms: u128,
    pub(crate) players: Vec<PlayerSummary>,
    pub(crate) rooms: Vec<RoomSummary>,
    pub(crate) events: EventCounts,
    pub(crate) deliveries: Vec<Delivery>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct PlayerSummary {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) team: Team,
    pub(crate) money: i64,
    pub(crate) income: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct RoomSummary {
    pub(crate) id: u32,
    pub(crate) kind: &'static str,
    pub(crate) cost: u32,
    pub(crate) bought: Option<bool>,
}

/// Number of events of each kind observed during the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct EventCounts {
    pub(crate) purchases: u64,
    pub(crate) rejections: u64,
    pub(crate) reversions: u64,
    pub(crate) announcements: u64,
    pub(crate) unit_spawns: u64,
    pub(crate) payouts: u64,
    pub(crate) destructions: u64,
}

/// Items a team's core received from drill rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Delivery {
    pub(crate) team: Team,
    pub(crate) item: ItemKind,
    pub(crate) amount: u64,
}

#[derive(Debug, Default)]
struct Ledger {
    counts: EventCounts,
    deliveries: BTreeMap<(Team, ItemKind), u64>,
}

impl Ledger {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::RoomPurchased { room, player, cost } => {
                    self.counts.purchases += 1;
                    tracing::info!(
                        room = room.get(),
                        player = player.get(),
                        cost,
                        "room purchased"
                    );
                }
                Event::PurchaseRejected { .. } => self.counts.rejections += 1,
                Event::RoomReverted { .. } => self.counts.reversions += 1,
                Event::Announcement { .. } => self.counts.announcements += 1,
                Event::UnitSpawnRequested {
                    team,
                    unit,
                    position,
                } => {
                    self.counts.unit_spawns += 1;
                    tracing::debug!(
                        ?team,
                        unit = unit.name(),
                        x = position.x,
                        y = position.y,
                        "unit spawned"
                    );
                }
                Event::IncomePaid { .. } => self.counts.payouts += 1,
                Event::StructureDestroyed { .. } => self.counts.destructions += 1,
                Event::ItemsTransferred { team, stack, .. } => {
                    let total = self.deliveries.entry((*team, stack.item())).or_insert(0);
                    *total += u64::from(stack.amount());
                }
                Event::MapConfigured { .. }
                | Event::TimeAdvanced { .. }
                | Event::RoomAdded { .. }
                | Event::PlayerJoined { .. } => {}
            }
        }
    }
}

/// Runs the scenario headlessly and summarises the final state.
pub(crate) fn run(scenario: &Scenario, options: RunOptions) -> Summary {
    let mut world = World::with_config(WorldConfig::new(options.seed));
    let mut purchasing = Purchasing::new();
    let mut income = Income::new(IncomeConfig::default());
    let mut ledger = Ledger::default();

    dispatch(&mut world, &mut income, &mut ledger, scenario.setup_commands());
    tracing::info!(
        rooms = query::rooms(&world).len(),
        players = query::players(&world).count(),
        "scenario loaded"
    );

    for tick in 0..options.ticks {
        let mut commands = Vec::new();

        let interactions: Vec<Interaction> = scenario
            .interactions_at(tick)
            .filter_map(|scripted| {
                let room = query::room(&world, RoomId::new(scripted.room))?;
                let position = room.geometry().centre().to_world();
                Some(Interaction::new(PlayerId::new(scripted.player), position))
            })
            .collect();
        if !interactions.is_empty() {
            purchasing.handle(
                &interactions,
                &query::room_view(&world),
                |player| query::player(&world, player).map(PlayerData::money),
                &mut commands,
            );
        }

        commands.extend(
            scenario
                .destructions_at(tick)
                .map(|destruction| Command::DestroyStructure {
                    tile: destruction.tile,
                }),
        );
        commands.push(Command::Tick { dt: options.tick });

        dispatch(&mut world, &mut income, &mut ledger, commands);
    }

    summarise(&world, &ledger, options)
}

/// Applies commands until the systems stop reacting to the emitted events.
fn dispatch(world: &mut World, income: &mut Income, ledger: &mut Ledger, commands: Vec<Command>) {
    let mut pending = commands;
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending {
            world::apply(world, command, &mut events);
        }
        ledger.record(&events);

        pending = Vec::new();
        income.handle(&events, &mut pending);
    }
}

fn summarise(world: &World, ledger: &Ledger, options: RunOptions) -> Summary {
    let players = query::players(world)
        .map(|player| PlayerSummary {
            id: player.id().get(),
            name: player.name().to_owned(),
            team: player.team(),
            money: player.money(),
            income: player.income(),
        })
        .collect();

    let rooms = query::room_view(world)
        .into_vec()
        .into_iter()
        .map(|room| RoomSummary {
            id: room.id.get(),
            kind: tag_name(room.tag),
            cost: room.cost,
            bought: room.bought,
        })
        .collect();

    let deliveries = ledger
        .deliveries
        .iter()
        .map(|(&(team, item), &amount)| Delivery { team, item, amount })
        .collect();

    Summary {
        ticks: query::tick_index(world),
        elapsed_ms: options.tick.as_millis() * u128::from(options.ticks),
        players,
        rooms,
        events: ledger.counts,
        deliveries,
    }
}

const fn tag_name(tag: RoomTag) -> &'static str {
    match tag {
        RoomTag::Block => "block",
        RoomTag::Miner => "miner",
        RoomTag::Core => "core",
        RoomTag::Unit => "unit",
    }
}
