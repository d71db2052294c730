#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for the Castle Rooms economy.
//!
//! The [`World`] owns the tile map, the room registry, every player's economic
//! record and the seeded random source used by purchases. It is only mutated
//! through [`apply`], one [`Command`] at a time, so a purchase's eligibility
//! check and its side effects can never interleave with another mutation.

mod registry;
pub mod rooms;
mod tiles;

pub use registry::RoomRegistry;
pub use tiles::TileMap;

use std::collections::BTreeMap;

use castle_rooms_core::{
    Command, Event, PlayerData, PlayerId, PurchaseRejection, RoomId, SpawnPoints,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::rooms::PurchaseContext;

const DEFAULT_MAP_WIDTH: u32 = 64;
const DEFAULT_MAP_HEIGHT: u32 = 64;
const DEFAULT_RNG_SEED: u64 = 0x6361_7374_6c65_5f72;

/// Configuration parameters required to construct a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    rng_seed: u64,
}

impl WorldConfig {
    /// Creates a configuration seeding purchases' random choices with `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Seed of the random source shared by every purchase.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RNG_SEED)
    }
}

/// Represents the authoritative state of a single match.
#[derive(Debug)]
pub struct World {
    tiles: TileMap,
    spawns: SpawnPoints,
    rooms: RoomRegistry,
    players: BTreeMap<PlayerId, PlayerData>,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates an empty world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world using the provided configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            tiles: TileMap::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT),
            spawns: SpawnPoints::default(),
            rooms: RoomRegistry::new(),
            players: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed()),
            tick_index: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap {
            width,
            height,
            spawns,
        } => {
            world.tiles = TileMap::new(width, height);
            world.spawns = spawns;
            world.rooms.clear();
            out_events.push(Event::MapConfigured { width, height });
        }
        Command::AddRoom { blueprint } => {
            let room = world.rooms.add_blueprint(&blueprint);
            if let Some(added) = world.rooms.get(room) {
                added.spawn(&mut world.tiles);
                out_events.push(Event::RoomAdded {
                    room,
                    geometry: *added.geometry(),
                });
            }
        }
        Command::AddPlayer { player } => {
            let id = player.id();
            let team = player.team();
            tracing::info!(player = id.get(), name = player.name(), ?team, "player joined");
            if world.players.insert(id, player).is_some() {
                tracing::debug!(player = id.get(), "replaced existing player record");
            }
            out_events.push(Event::PlayerJoined { player: id, team });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.rooms.update_all(dt, &world.tiles, out_events);
        }
        Command::PurchaseRoom { player, room } => purchase(world, player, room, out_events),
        Command::PayIncome => {
            for player in world.players.values_mut() {
                let amount = player.income();
                if amount == 0 {
                    continue;
                }
                player.credit(amount);
                out_events.push(Event::IncomePaid {
                    player: player.id(),
                    amount,
                });
            }
        }
        Command::DestroyStructure { tile } => {
            if let Some(building) = world.tiles.remove(tile) {
                out_events.push(Event::StructureDestroyed {
                    tile,
                    block: building.block,
                    team: building.team,
                });
            }
        }
    }
}

fn purchase(world: &mut World, player: PlayerId, room: RoomId, out_events: &mut Vec<Event>) {
    let Some(record) = world.players.get_mut(&player) else {
        reject(room, player, PurchaseRejection::UnknownPlayer, out_events);
        return;
    };

    let mut context = PurchaseContext {
        grid: &mut world.tiles,
        rng: &mut world.rng,
        spawns: &world.spawns,
        events: &mut *out_events,
    };
    if let Err(reason) = world.rooms.purchase(room, record, &mut context) {
        reject(room, player, reason, out_events);
    }
}

fn reject(room: RoomId, player: PlayerId, reason: PurchaseRejection, out_events: &mut Vec<Event>) {
    tracing::warn!(
        room = room.get(),
        player = player.get(),
        %reason,
        "purchase rejected"
    );
    out_events.push(Event::PurchaseRejected {
        room,
        player,
        reason,
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use castle_rooms_core::{PlayerData, PlayerId, RoomId, RoomView, SpawnPoints};
    use glam::Vec2;

    use super::{rooms::Room, RoomRegistry, TileMap, World};

    /// Provides read-only access to the world's tile map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.tiles
    }

    /// Provides read-only access to the room registry.
    #[must_use]
    pub fn rooms(world: &World) -> &RoomRegistry {
        &world.rooms
    }

    /// Room registered under the identifier.
    #[must_use]
    pub fn room(world: &World, id: RoomId) -> Option<&Room> {
        world.rooms.get(id)
    }

    /// Captures a read-only view of every room.
    #[must_use]
    pub fn room_view(world: &World) -> RoomView {
        world.rooms.view()
    }

    /// First room whose bounds contain the world-space point.
    #[must_use]
    pub fn room_at(world: &World, point: Vec2) -> Option<RoomId> {
        world.rooms.room_at(point)
    }

    /// Economic record of a player.
    #[must_use]
    pub fn player(world: &World, id: PlayerId) -> Option<&PlayerData> {
        world.players.get(&id)
    }

    /// Iterator over every player ordered by identifier.
    pub fn players(world: &World) -> impl Iterator<Item = &PlayerData> {
        world.players.values()
    }

    /// Spawn points used by attack rooms.
    #[must_use]
    pub fn spawn_points(world: &World) -> SpawnPoints {
        world.spawns
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
