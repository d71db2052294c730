use std::time::Duration;

use castle_rooms_core::{
    BlockKind, Command, Event, ItemKind, ItemStack, PlayerData, PlayerId, RoomBlueprint, RoomId,
    RoomRole, SpawnPoints, Team, TileCoord, UnitKind,
};
use castle_rooms_world::{self as world, query, World, WorldConfig};

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(0x1234_5678, scripted_commands());
    let second = replay(0x1234_5678, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::ItemsTransferred { .. })),
        "script should exercise the miner"
    );
}

#[test]
fn seed_only_affects_random_choices() {
    let first = replay(1, scripted_commands());
    let second = replay(2, scripted_commands());

    assert_eq!(first.balances, second.balances);
    assert_eq!(
        first.events.len(),
        second.events.len(),
        "randomness never changes which events fire"
    );
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    balances: Vec<(PlayerId, i64, i64)>,
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::with_config(WorldConfig::new(seed));
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events);
    }

    let balances = query::players(&world)
        .map(|player| (player.id(), player.money(), player.income()))
        .collect();

    ReplayOutcome {
        events: log,
        balances,
    }
}

fn scripted_commands() -> Vec<Command> {
    let blue = PlayerId::new(1);
    let sharded = PlayerId::new(2);
    let mut commands = vec![
        Command::ConfigureMap {
            width: 48,
            height: 48,
            spawns: SpawnPoints::new(TileCoord::new(3, 3), TileCoord::new(44, 44)),
        },
        Command::AddRoom {
            blueprint: RoomBlueprint::Block {
                block: BlockKind::Salvo,
                team: Team::Blue,
                origin: TileCoord::new(8, 8),
                cost: 300,
                size: None,
            },
        },
        Command::AddRoom {
            blueprint: RoomBlueprint::Block {
                block: BlockKind::Tsunami,
                team: Team::Sharded,
                origin: TileCoord::new(30, 8),
                cost: 450,
                size: None,
            },
        },
        Command::AddRoom {
            blueprint: RoomBlueprint::Miner {
                output: ItemStack::new(ItemKind::Titanium, 20),
                team: Team::Blue,
                origin: TileCoord::new(8, 20),
                cost: 200,
            },
        },
        Command::AddRoom {
            blueprint: RoomBlueprint::Unit {
                unit: UnitKind::Dagger,
                role: RoomRole::Attack,
                income: -2,
                origin: TileCoord::new(30, 20),
                cost: 60,
            },
        },
        Command::AddPlayer {
            player: PlayerData::new(blue, "blue", Team::Blue, 1_000, 10),
        },
        Command::AddPlayer {
            player: PlayerData::new(sharded, "sharded", Team::Sharded, 1_000, 10),
        },
        Command::PurchaseRoom {
            player: blue,
            room: RoomId::new(0),
        },
        Command::PurchaseRoom {
            player: sharded,
            room: RoomId::new(1),
        },
        Command::PurchaseRoom {
            player: blue,
            room: RoomId::new(2),
        },
    ];

    for step in 0..120 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(50),
        });
        if step % 20 == 0 {
            commands.push(Command::PayIncome);
            commands.push(Command::PurchaseRoom {
                player: sharded,
                room: RoomId::new(3),
            });
        }
    }

    commands
}
