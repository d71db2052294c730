//! Match scenarios loaded from TOML files.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, Result};
use castle_rooms_core::{
    Command, PlayerData, PlayerId, RoomBlueprint, SpawnPoints, Team, TileCoord,
};
use serde::Deserialize;

/// Scenario bundled with the binary, used when no file is supplied.
pub(crate) const BUILTIN_SKIRMISH: &str = include_str!("../scenarios/skirmish.toml");

/// Map layout, players and scripted actions of one match.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct Scenario {
    pub(crate) map: MapSection,
    #[serde(default)]
    pub(crate) players: Vec<ScenarioPlayer>,
    #[serde(default)]
    pub(crate) rooms: Vec<RoomBlueprint>,
    #[serde(default)]
    pub(crate) interactions: Vec<ScriptedInteraction>,
    #[serde(default)]
    pub(crate) destructions: Vec<ScriptedDestruction>,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct MapSection {
    pub(crate) width: u32,
    pub(crate) height: u32,
    #[serde(default)]
    pub(crate) spawns: SpawnPoints,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct ScenarioPlayer {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) team: Team,
    #[serde(default)]
    pub(crate) money: i64,
    #[serde(default)]
    pub(crate) income: i64,
}

/// Player pressing the purchase action inside a room on a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct ScriptedInteraction {
    pub(crate) tick: u64,
    pub(crate) player: u32,
    pub(crate) room: u32,
}

/// Structure destroyed by something outside the room economy on a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct ScriptedDestruction {
    pub(crate) tick: u64,
    pub(crate) tile: TileCoord,
}

/// Reasons a well-formed scenario file is still unusable.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ScenarioError {
    #[error("map must be at least one tile wide and tall, got {width}x{height}")]
    EmptyMap { width: u32, height: u32 },
    #[error("{team:?} spawn point {tile:?} lies outside the map")]
    SpawnOutsideMap { team: Team, tile: TileCoord },
    #[error("room #{index} starts at {origin:?}, outside the map")]
    RoomOutsideMap { index: usize, origin: TileCoord },
    #[error("player id {0} is declared twice")]
    DuplicatePlayer(u32),
    #[error("interaction #{index} references unknown player {player}")]
    UnknownPlayer { index: usize, player: u32 },
    #[error("interaction #{index} references unknown room {room}")]
    UnknownRoom { index: usize, room: u32 },
}

impl Scenario {
    /// Reads, parses and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates scenario contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        let MapSection {
            width,
            height,
            spawns,
        } = self.map;
        if width == 0 || height == 0 {
            return Err(ScenarioError::EmptyMap { width, height });
        }
        let inside = |tile: TileCoord| tile.x() < width && tile.y() < height;

        for team in [Team::Sharded, Team::Blue] {
            let tile = spawns.for_team(team);
            if !inside(tile) {
                return Err(ScenarioError::SpawnOutsideMap { team, tile });
            }
        }

        for (index, room) in self.rooms.iter().enumerate() {
            let origin = blueprint_origin(room);
            if !inside(origin) {
                return Err(ScenarioError::RoomOutsideMap { index, origin });
            }
        }

        let mut players = BTreeSet::new();
        for player in &self.players {
            if !players.insert(player.id) {
                return Err(ScenarioError::DuplicatePlayer(player.id));
            }
        }

        for (index, interaction) in self.interactions.iter().enumerate() {
            if !players.contains(&interaction.player) {
                return Err(ScenarioError::UnknownPlayer {
                    index,
                    player: interaction.player,
                });
            }
            let known_room = usize::try_from(interaction.room)
                .map(|room| room < self.rooms.len())
                .unwrap_or(false);
            if !known_room {
                return Err(ScenarioError::UnknownRoom {
                    index,
                    room: interaction.room,
                });
            }
        }

        Ok(())
    }

    /// Commands that build the map and seat the players.
    pub(crate) fn setup_commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(1 + self.rooms.len() + self.players.len());
        commands.push(Command::ConfigureMap {
            width: self.map.width,
            height: self.map.height,
            spawns: self.map.spawns,
        });
        commands.extend(
            self.rooms
                .iter()
                .cloned()
                .map(|blueprint| Command::AddRoom { blueprint }),
        );
        commands.extend(self.players.iter().map(|player| Command::AddPlayer {
            player: PlayerData::new(
                PlayerId::new(player.id),
                player.name.clone(),
                player.team,
                player.money,
                player.income,
            ),
        }));
        commands
    }

    /// Interactions scheduled for the tick, in file order.
    pub(crate) fn interactions_at(
        &self,
        tick: u64,
    ) -> impl Iterator<Item = &ScriptedInteraction> {
        self.interactions
            .iter()
            .filter(move |interaction| interaction.tick == tick)
    }

    /// Destructions scheduled for the tick, in file order.
    pub(crate) fn destructions_at(
        &self,
        tick: u64,
    ) -> impl Iterator<Item = &ScriptedDestruction> {
        self.destructions
            .iter()
            .filter(move |destruction| destruction.tick == tick)
    }
}

fn blueprint_origin(blueprint: &RoomBlueprint) -> TileCoord {
    match *blueprint {
        RoomBlueprint::Block { origin, .. }
        | RoomBlueprint::Miner { origin, .. }
        | RoomBlueprint::Core { origin, .. }
        | RoomBlueprint::Unit { origin, .. } => origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_rooms_core::{BlockKind, ItemKind, ItemStack};

    const MINIMAL: &str = r#"
        [map]
        width = 16
        height = 12

        [[players]]
        id = 3
        name = "cy"
        team = "sharded"
        money = 400

        [[rooms]]
        kind = "miner"
        output = { item = "coal", amount = 8 }
        team = "sharded"
        origin = { x = 2, y = 2 }
        cost = 150

        [[interactions]]
        tick = 4
        player = 3
        room = 0
    "#;

    #[test]
    fn bundled_skirmish_is_valid() {
        let scenario = Scenario::parse(BUILTIN_SKIRMISH).expect("bundled scenario parses");
        assert_eq!(scenario.players.len(), 2);
        assert_eq!(
            scenario.rooms.first(),
            Some(&RoomBlueprint::Block {
                block: BlockKind::Duo,
                team: Team::Blue,
                origin: TileCoord::new(6, 6),
                cost: 100,
                size: None,
            })
        );
        assert_eq!(scenario.destructions_at(120).count(), 1);
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let scenario = Scenario::parse(MINIMAL).expect("minimal scenario parses");

        assert_eq!(scenario.map.spawns, SpawnPoints::default());
        assert_eq!(scenario.players[0].income, 0);
        assert_eq!(
            scenario.rooms[0],
            RoomBlueprint::Miner {
                output: ItemStack::new(ItemKind::Coal, 8),
                team: Team::Sharded,
                origin: TileCoord::new(2, 2),
                cost: 150,
            }
        );
        assert_eq!(scenario.interactions_at(4).count(), 1);
        assert_eq!(scenario.interactions_at(5).count(), 0);
    }

    #[test]
    fn setup_configures_map_before_rooms_and_players() {
        let scenario = Scenario::parse(MINIMAL).expect("minimal scenario parses");
        let commands = scenario.setup_commands();

        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], Command::ConfigureMap { width: 16, height: 12, .. }));
        assert!(matches!(commands[1], Command::AddRoom { .. }));
        assert!(matches!(commands[2], Command::AddPlayer { .. }));
    }

    #[test]
    fn interactions_must_reference_known_rooms() {
        let contents = MINIMAL.replace("room = 0", "room = 1");
        let error = Scenario::parse(&contents).expect_err("room 1 does not exist");

        assert_eq!(
            error.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::UnknownRoom { index: 0, room: 1 })
        );
    }

    #[test]
    fn interactions_must_reference_known_players() {
        let contents = MINIMAL.replace("player = 3", "player = 4");
        let error = Scenario::parse(&contents).expect_err("player 4 does not exist");

        assert_eq!(
            error.downcast_ref::<ScenarioError>(),
            Some(&ScenarioError::UnknownPlayer {
                index: 0,
                player: 4
            })
        );
    }

    #[test]
    fn rooms_must_start_inside_the_map() {
        let contents = MINIMAL.replace("origin = { x = 2, y = 2 }", "origin = { x = 16, y = 2 }");
        let error = Scenario::parse(&contents).expect_err("room starts off the map");

        assert!(matches!(
            error.downcast_ref::<ScenarioError>(),
            Some(ScenarioError::RoomOutsideMap { index: 0, .. })
        ));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let error = Scenario::parse("[map]\nwidth = \"wide\"").expect_err("width is not a number");
        assert!(error.to_string().contains("failed to parse scenario toml"));
    }
}
