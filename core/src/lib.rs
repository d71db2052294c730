#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Castle Rooms economy.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! external dispatchers to react to. Rooms never talk to the engine directly:
//! tile access goes through the [`Grid`] trait and every fire-and-forget call
//! (announcements, item transfers, unit spawns) is an [`Event`].

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side length of a single tile expressed in world units.
pub const TILE_SIZE: f32 = 8.0;

/// Production cadence of a bought miner room: 300 frames at the 60 Hz simulation rate.
pub const MINER_INTERVAL: Duration = Duration::from_secs(5);

/// Cadence at which players accrue their recurring income.
pub const INCOME_INTERVAL: Duration = Duration::from_secs(1);

/// How long purchase announcements stay on screen.
pub const ANNOUNCEMENT_DURATION: Duration = Duration::from_secs(4);

/// Footprint of every unit room measured in tiles.
pub const UNIT_ROOM_SIZE: u32 = 4;

/// Maximum scatter, in world units, applied to unit spawn positions.
pub const SPAWN_SCATTER: f32 = 40.0;

/// Horizontal distance, in world units, between a core and freshly spawned defenders.
pub const DEFENDER_OFFSET: f32 = 30.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the tile map and spawn points, clearing every registered room.
    ConfigureMap {
        /// Number of tile columns in the map.
        width: u32,
        /// Number of tile rows in the map.
        height: u32,
        /// Unit spawn points used by attack rooms.
        spawns: SpawnPoints,
    },
    /// Registers a new room built from the provided blueprint and paints its floor.
    AddRoom {
        /// Recipe describing the room to construct.
        blueprint: RoomBlueprint,
    },
    /// Adds a player's economic record to the match, replacing any previous record.
    AddPlayer {
        /// Economic record of the joining player.
        player: PlayerData,
    },
    /// Advances the simulation clock and updates every registered room.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a player buys a room. Eligibility is re-checked by the world.
    PurchaseRoom {
        /// Player paying for the room.
        player: PlayerId,
        /// Room being bought.
        room: RoomId,
    },
    /// Credits every player with their current income.
    PayIncome,
    /// Reports that the structure anchored at the tile was destroyed by gameplay.
    DestroyStructure {
        /// Tile whose structure was destroyed.
        tile: TileCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the tile map was replaced.
    MapConfigured {
        /// Number of tile columns in the new map.
        width: u32,
        /// Number of tile rows in the new map.
        height: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a room was registered.
    RoomAdded {
        /// Identifier allocated to the room.
        room: RoomId,
        /// Footprint of the room.
        geometry: RoomGeometry,
    },
    /// Confirms that a player record joined the match.
    PlayerJoined {
        /// Identifier of the player.
        player: PlayerId,
        /// Team the player fights for.
        team: Team,
    },
    /// Confirms that a room was bought and paid for.
    RoomPurchased {
        /// Room that was bought.
        room: RoomId,
        /// Player who paid.
        player: PlayerId,
        /// Amount deducted from the player's balance.
        cost: u32,
    },
    /// Reports that a purchase request was refused.
    PurchaseRejected {
        /// Room targeted by the request.
        room: RoomId,
        /// Player who issued the request.
        player: PlayerId,
        /// Policy that refused the purchase.
        reason: PurchaseRejection,
    },
    /// Reports that a bought room lost its structure and is for sale again.
    RoomReverted {
        /// Room that became available.
        room: RoomId,
    },
    /// Timed on-screen message for one or more players.
    Announcement {
        /// Who should see the message.
        recipient: Recipient,
        /// Message to localise and display.
        message: Message,
        /// How long the message stays visible.
        duration: Duration,
        /// World position the message is anchored to.
        position: Vec2,
    },
    /// Items produced by a miner that should be moved into the team's core.
    ItemsTransferred {
        /// Team whose core receives the items.
        team: Team,
        /// Items being delivered.
        stack: ItemStack,
        /// World position the transfer originates from.
        from: Vec2,
    },
    /// Request to spawn a mobile unit.
    UnitSpawnRequested {
        /// Team that owns the unit.
        team: Team,
        /// Type of unit to spawn.
        unit: UnitKind,
        /// World position of the spawn.
        position: Vec2,
    },
    /// Confirms that a player's income was paid out.
    IncomePaid {
        /// Player who received the payout.
        player: PlayerId,
        /// Signed amount added to the balance.
        amount: i64,
    },
    /// Confirms that a structure was removed from the map.
    StructureDestroyed {
        /// Tile the structure was anchored to.
        tile: TileCoord,
        /// Structure type that was removed.
        block: BlockKind,
        /// Team that owned the structure.
        team: Team,
    },
}

/// Audience of an [`Event::Announcement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Every connected player.
    Everyone,
}

/// Localisable messages carried by announcements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Message {
    /// A player bought a room.
    Purchase {
        /// Display name of the buyer.
        buyer: String,
    },
}

impl Message {
    /// Bundle key the receiver uses to look up the localised template.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Purchase { .. } => "events.buy",
        }
    }

    /// Positional arguments substituted into the localised template.
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        match self {
            Self::Purchase { buyer } => vec![buyer.as_str()],
        }
    }
}

/// Reasons a purchase may be refused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum PurchaseRejection {
    /// The player's balance is below the room's cost.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The room's structure is still standing.
    #[error("room is already bought")]
    AlreadyBought,
    /// Another structure occupies the room's placement slot.
    #[error("placement slot is occupied")]
    SlotOccupied,
    /// Buying would push the player's income below zero.
    #[error("purchase would make income negative")]
    IncomeWouldGoNegative,
    /// No room with the requested identifier exists.
    #[error("unknown room")]
    UnknownRoom,
    /// No player with the requested identifier exists.
    #[error("unknown player")]
    UnknownPlayer,
}

/// Unique identifier assigned to a room by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: u32,
    y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Returns the tile shifted by the provided offsets, saturating at the numeric bounds.
    #[must_use]
    pub const fn offset(self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// World position of the tile's anchor corner.
    #[must_use]
    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }
}

/// Square, grid-aligned footprint of a room.
///
/// The centre and end tiles are derived once from the origin and size, so the
/// three can never drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoomGeometry {
    origin: TileCoord,
    size: u32,
    centre: TileCoord,
    end: TileCoord,
}

impl RoomGeometry {
    /// Derives the footprint of a room anchored at `origin` spanning `size` tiles.
    #[must_use]
    pub const fn new(origin: TileCoord, size: u32) -> Self {
        Self {
            origin,
            size,
            centre: origin.offset(size / 2, size / 2),
            end: origin.offset(size, size),
        }
    }

    /// Lower corner of the room.
    #[must_use]
    pub const fn origin(&self) -> TileCoord {
        self.origin
    }

    /// Side length of the room in tiles.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Tile holding the room's structure.
    #[must_use]
    pub const fn centre(&self) -> TileCoord {
        self.centre
    }

    /// Exclusive upper corner of the room.
    #[must_use]
    pub const fn end(&self) -> TileCoord {
        self.end
    }

    /// Tile next to the structure reserved for its item or liquid feeder.
    #[must_use]
    pub const fn feeder(&self) -> TileCoord {
        TileCoord::new(self.origin.x, self.centre.y)
    }

    /// Strict bounding-box test against a point in world units.
    ///
    /// Points lying exactly on the room's edges are outside.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let lower = self.origin.to_world();
        let upper = self.end.to_world();
        point.x > lower.x && point.y > lower.y && point.x < upper.x && point.y < upper.y
    }
}

/// Sides competing for the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Team {
    /// The yellow team.
    Sharded,
    /// The blue team.
    Blue,
}

impl Team {
    /// Team fighting against this one.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Sharded => Self::Blue,
            Self::Blue => Self::Sharded,
        }
    }
}

/// Locations where attacking units of each team enter the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoints {
    sharded: TileCoord,
    blue: TileCoord,
}

impl SpawnPoints {
    /// Creates spawn points from the tiles assigned to each team.
    #[must_use]
    pub const fn new(sharded: TileCoord, blue: TileCoord) -> Self {
        Self { sharded, blue }
    }

    /// Spawn tile belonging to `team`.
    #[must_use]
    pub const fn for_team(&self, team: Team) -> TileCoord {
        match team {
            Team::Sharded => self.sharded,
            Team::Blue => self.blue,
        }
    }
}

impl Default for SpawnPoints {
    fn default() -> Self {
        Self::new(TileCoord::new(0, 0), TileCoord::new(0, 0))
    }
}

/// Floor variants painted under rooms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Floor {
    /// Untouched ground.
    #[default]
    Stone,
    /// Interior floor of an ordinary room.
    Plated,
    /// Heavier floor outlining an ordinary room.
    PlatedBorder,
    /// Floor covering an entire core room.
    DarkPanel,
}

/// Items that can be mined, stored and fired as ammunition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ItemKind {
    Copper,
    Lead,
    Metaglass,
    Graphite,
    Sand,
    Coal,
    Titanium,
    Thorium,
    Scrap,
    Silicon,
    Plastanium,
    PhaseFabric,
    SurgeAlloy,
    SporePod,
    BlastCompound,
    Pyratite,
}

impl ItemKind {
    /// Display name used in room labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Copper => "copper",
            Self::Lead => "lead",
            Self::Metaglass => "metaglass",
            Self::Graphite => "graphite",
            Self::Sand => "sand",
            Self::Coal => "coal",
            Self::Titanium => "titanium",
            Self::Thorium => "thorium",
            Self::Scrap => "scrap",
            Self::Silicon => "silicon",
            Self::Plastanium => "plastanium",
            Self::PhaseFabric => "phase-fabric",
            Self::SurgeAlloy => "surge-alloy",
            Self::SporePod => "spore-pod",
            Self::BlastCompound => "blast-compound",
            Self::Pyratite => "pyratite",
        }
    }
}

/// Liquids that can be pumped into turrets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum LiquidKind {
    Water,
    Slag,
    Oil,
    Cryofluid,
}

/// Fixed amount of a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    item: ItemKind,
    amount: u32,
}

impl ItemStack {
    /// Creates a stack of `amount` units of `item`.
    #[must_use]
    pub const fn new(item: ItemKind, amount: u32) -> Self {
        Self { item, amount }
    }

    /// Item carried by the stack.
    #[must_use]
    pub const fn item(&self) -> ItemKind {
        self.item
    }

    /// Number of units in the stack.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }
}

/// Mobile combat units that unit rooms can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum UnitKind {
    Dagger,
    Mace,
    Fortress,
    Scepter,
    Reign,
    Nova,
    Pulsar,
    Quasar,
    Crawler,
    Atrax,
    Spiroct,
    Arkyid,
    Flare,
    Horizon,
    Zenith,
    Poly,
    Mega,
}

impl UnitKind {
    /// Display name used in room labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dagger => "dagger",
            Self::Mace => "mace",
            Self::Fortress => "fortress",
            Self::Scepter => "scepter",
            Self::Reign => "reign",
            Self::Nova => "nova",
            Self::Pulsar => "pulsar",
            Self::Quasar => "quasar",
            Self::Crawler => "crawler",
            Self::Atrax => "atrax",
            Self::Spiroct => "spiroct",
            Self::Arkyid => "arkyid",
            Self::Flare => "flare",
            Self::Horizon => "horizon",
            Self::Zenith => "zenith",
            Self::Poly => "poly",
            Self::Mega => "mega",
        }
    }
}

/// Where a unit room sends the units it spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomRole {
    /// Units appear at the opposing team's spawn point.
    Attack,
    /// Units appear beside the buyer's own core.
    Defend,
}

/// Structures that block rooms can place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum BlockKind {
    Duo,
    Scatter,
    Hail,
    Wave,
    Salvo,
    Swarmer,
    Ripple,
    Fuse,
    Cyclone,
    Tsunami,
    Spectre,
    Foreshadow,
    Meltdown,
    RepairPoint,
    RepairTurret,
    LaserDrill,
    CoreShard,
    CoreFoundation,
    CoreNucleus,
    ItemSource,
    LiquidSource,
}

const CONVENTIONAL_LIQUIDS: &[LiquidKind] = &[
    LiquidKind::Water,
    LiquidKind::Slag,
    LiquidKind::Cryofluid,
    LiquidKind::Oil,
];

impl BlockKind {
    /// Side length of the structure in tiles.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Duo | Self::Hail | Self::RepairPoint | Self::ItemSource | Self::LiquidSource => 1,
            Self::Scatter | Self::Wave | Self::Salvo | Self::Swarmer | Self::RepairTurret => 2,
            Self::Ripple | Self::Fuse | Self::Cyclone | Self::Tsunami | Self::LaserDrill => 3,
            Self::CoreShard => 3,
            Self::Spectre | Self::Foreshadow | Self::Meltdown | Self::CoreFoundation => 4,
            Self::CoreNucleus => 5,
        }
    }

    /// Category deciding which feeder, if any, accompanies the structure.
    #[must_use]
    pub const fn category(self) -> BlockCategory {
        use ItemKind::*;

        match self {
            Self::Duo => BlockCategory::ItemTurret {
                ammo: &[Copper, Graphite, Silicon],
            },
            Self::Scatter => BlockCategory::ItemTurret {
                ammo: &[Scrap, Lead, Metaglass],
            },
            Self::Hail => BlockCategory::ItemTurret {
                ammo: &[Graphite, Silicon, Pyratite],
            },
            Self::Salvo => BlockCategory::ItemTurret {
                ammo: &[Copper, Graphite, Pyratite, Silicon, BlastCompound, Thorium],
            },
            Self::Swarmer => BlockCategory::ItemTurret {
                ammo: &[BlastCompound, Pyratite, SurgeAlloy],
            },
            Self::Ripple => BlockCategory::ItemTurret {
                ammo: &[Graphite, Silicon, Pyratite, BlastCompound, Plastanium],
            },
            Self::Fuse => BlockCategory::ItemTurret {
                ammo: &[Copper, Thorium],
            },
            Self::Cyclone => BlockCategory::ItemTurret {
                ammo: &[Metaglass, BlastCompound, Plastanium, SurgeAlloy],
            },
            Self::Spectre => BlockCategory::ItemTurret {
                ammo: &[Graphite, Thorium, Pyratite],
            },
            Self::Foreshadow => BlockCategory::ItemTurret {
                ammo: &[SurgeAlloy],
            },
            Self::Wave | Self::Tsunami => BlockCategory::LiquidTurret {
                ammo: CONVENTIONAL_LIQUIDS,
            },
            Self::Meltdown => BlockCategory::LaserTurret,
            Self::RepairPoint | Self::RepairTurret => BlockCategory::Support,
            Self::CoreShard | Self::CoreFoundation | Self::CoreNucleus => BlockCategory::Core,
            Self::LaserDrill | Self::ItemSource | Self::LiquidSource => BlockCategory::Passive,
        }
    }

    /// Display name used in room labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Duo => "duo",
            Self::Scatter => "scatter",
            Self::Hail => "hail",
            Self::Wave => "wave",
            Self::Salvo => "salvo",
            Self::Swarmer => "swarmer",
            Self::Ripple => "ripple",
            Self::Fuse => "fuse",
            Self::Cyclone => "cyclone",
            Self::Tsunami => "tsunami",
            Self::Spectre => "spectre",
            Self::Foreshadow => "foreshadow",
            Self::Meltdown => "meltdown",
            Self::RepairPoint => "repair-point",
            Self::RepairTurret => "repair-turret",
            Self::LaserDrill => "laser-drill",
            Self::CoreShard => "core-shard",
            Self::CoreFoundation => "core-foundation",
            Self::CoreNucleus => "core-nucleus",
            Self::ItemSource => "item-source",
            Self::LiquidSource => "liquid-source",
        }
    }
}

/// Behavioural family of a [`BlockKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockCategory {
    /// Turret fed with items from an adjacent item source.
    ItemTurret {
        /// Items the turret accepts as ammunition.
        ammo: &'static [ItemKind],
    },
    /// Turret fed with liquid from an adjacent liquid source.
    LiquidTurret {
        /// Liquids the turret accepts as ammunition.
        ammo: &'static [LiquidKind],
    },
    /// Laser turret cooled from an adjacent liquid source.
    LaserTurret,
    /// Repair structure cooled from an adjacent liquid source.
    Support,
    /// Core objective structure.
    Core,
    /// Structure that needs no feeder.
    Passive,
}

/// Configuration applied to a placed structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockConfig {
    /// Item emitted by an item source.
    Item(ItemKind),
    /// Liquid emitted by a liquid source.
    Liquid(LiquidKind),
}

/// Structure standing on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Building {
    /// Type of the structure.
    pub block: BlockKind,
    /// Team owning the structure.
    pub team: Team,
    /// Configuration applied after placement, if any.
    pub config: Option<BlockConfig>,
}

/// Tile map operations rooms depend on.
///
/// Coordinates outside the map are absent: writes to them are ignored and
/// reads report nothing, so callers never fail on them.
pub trait Grid {
    /// Reports whether the tile exists on the map.
    fn contains(&self, tile: TileCoord) -> bool;

    /// Assigns the floor of a tile.
    fn set_floor(&mut self, tile: TileCoord, floor: Floor);

    /// Places a structure owned by `team` on a tile, replacing whatever stood there.
    fn place(&mut self, tile: TileCoord, block: BlockKind, team: Team);

    /// Configures the structure on a tile. Ignored when the tile is empty.
    fn configure(&mut self, tile: TileCoord, config: BlockConfig);

    /// Structure currently standing on a tile.
    fn building_at(&self, tile: TileCoord) -> Option<Building>;

    /// World position of the first core owned by `team`.
    fn core_position(&self, team: Team) -> Option<Vec2>;

    /// Reports whether a structure stands on the tile.
    fn is_occupied(&self, tile: TileCoord) -> bool {
        self.building_at(tile).is_some()
    }
}

/// Economic record of a single player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    id: PlayerId,
    name: String,
    team: Team,
    money: i64,
    income: i64,
}

impl PlayerData {
    /// Creates a player record with the provided balance and income.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, team: Team, money: i64, income: i64) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            money,
            income,
        }
    }

    /// Identifier of the player.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Team the player fights for.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Current balance.
    #[must_use]
    pub const fn money(&self) -> i64 {
        self.money
    }

    /// Recurring amount credited every income period.
    #[must_use]
    pub const fn income(&self) -> i64 {
        self.income
    }

    /// Deducts `amount` from the balance, saturating at the `i64` bounds.
    pub fn spend(&mut self, amount: u32) {
        self.money = self.money.saturating_sub(i64::from(amount));
    }

    /// Adds a signed amount to the balance.
    pub fn credit(&mut self, amount: i64) {
        self.money = self.money.saturating_add(amount);
    }

    /// Shifts the recurring income by a signed delta.
    pub fn adjust_income(&mut self, delta: i32) {
        self.income = self.income.saturating_add(i64::from(delta));
    }
}

/// Serializable recipe for constructing a room during map setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RoomBlueprint {
    /// Room selling an arbitrary structure.
    Block {
        /// Structure placed on purchase.
        block: BlockKind,
        /// Team owning the structure.
        team: Team,
        /// Lower corner of the room.
        origin: TileCoord,
        /// Purchase price.
        cost: u32,
        /// Footprint override; defaults to one more than the structure size.
        #[serde(default)]
        size: Option<u32>,
    },
    /// Room selling a drill that delivers items to the team's core.
    Miner {
        /// Items delivered every production period.
        output: ItemStack,
        /// Team receiving the items.
        team: Team,
        /// Lower corner of the room.
        origin: TileCoord,
        /// Purchase price.
        cost: u32,
    },
    /// Room selling the team's objective core.
    Core {
        /// Team owning the core.
        team: Team,
        /// Lower corner of the room.
        origin: TileCoord,
        /// Purchase price.
        cost: u32,
    },
    /// Room selling a unit and an income adjustment.
    Unit {
        /// Unit spawned on purchase.
        unit: UnitKind,
        /// Where the unit spawns.
        role: RoomRole,
        /// Signed income change applied on purchase.
        income: i32,
        /// Lower corner of the room.
        origin: TileCoord,
        /// Purchase price.
        cost: u32,
    },
}

/// Variant tag of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomTag {
    /// Room selling an arbitrary structure.
    Block,
    /// Room selling a drill.
    Miner,
    /// Room selling the objective core.
    Core,
    /// Room selling a unit.
    Unit,
}

/// Immutable representation of a single room used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    /// Identifier allocated by the registry.
    pub id: RoomId,
    /// Variant of the room.
    pub tag: RoomTag,
    /// Footprint of the room.
    pub geometry: RoomGeometry,
    /// Purchase price.
    pub cost: u32,
    /// Rich-text label shown above the room.
    pub label: String,
    /// Whether the label is currently displayed.
    pub label_visible: bool,
    /// Bought state for structure rooms, `None` for unit rooms.
    pub bought: Option<bool>,
}

/// Read-only snapshot describing every registered room.
#[derive(Clone, Debug, Default)]
pub struct RoomView {
    snapshots: Vec<RoomSnapshot>,
}

impl RoomView {
    /// Creates a new room view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RoomSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured room snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RoomSnapshot> {
        self.snapshots.iter()
    }

    /// First room whose bounds contain the world-space point.
    #[must_use]
    pub fn room_at(&self, point: Vec2) -> Option<&RoomSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.geometry.contains(point))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RoomSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_derives_centre_and_end() {
        let geometry = RoomGeometry::new(TileCoord::new(10, 10), 8);
        assert_eq!(geometry.centre(), TileCoord::new(14, 14));
        assert_eq!(geometry.end(), TileCoord::new(18, 18));
        assert_eq!(geometry.feeder(), TileCoord::new(10, 14));
    }

    #[test]
    fn odd_sizes_round_centre_down() {
        let geometry = RoomGeometry::new(TileCoord::new(3, 5), 3);
        assert_eq!(geometry.centre(), TileCoord::new(4, 6));
        assert_eq!(geometry.end(), TileCoord::new(6, 8));
    }

    #[test]
    fn contains_excludes_edges() {
        let geometry = RoomGeometry::new(TileCoord::new(10, 10), 8);
        assert!(geometry.contains(Vec2::new(81.0, 81.0)));
        assert!(!geometry.contains(Vec2::new(79.0, 79.0)));
        assert!(!geometry.contains(Vec2::new(80.0, 81.0)));
        assert!(!geometry.contains(Vec2::new(144.0, 100.0)));
        assert!(geometry.contains(Vec2::new(143.9, 143.9)));
    }

    #[test]
    fn opponent_is_symmetric() {
        assert_eq!(Team::Sharded.opponent(), Team::Blue);
        assert_eq!(Team::Blue.opponent().opponent(), Team::Blue);
    }

    #[test]
    fn turrets_declare_their_feeders() {
        assert!(matches!(
            BlockKind::Duo.category(),
            BlockCategory::ItemTurret { ammo } if ammo.contains(&ItemKind::Graphite)
        ));
        assert!(matches!(
            BlockKind::Tsunami.category(),
            BlockCategory::LiquidTurret { .. }
        ));
        assert_eq!(BlockKind::Meltdown.category(), BlockCategory::LaserTurret);
        assert_eq!(BlockKind::RepairTurret.category(), BlockCategory::Support);
        assert_eq!(BlockKind::LaserDrill.category(), BlockCategory::Passive);
        assert_eq!(BlockKind::CoreNucleus.category(), BlockCategory::Core);
    }

    #[test]
    fn player_bookkeeping_adjusts_balances() {
        let mut player = PlayerData::new(PlayerId::new(1), "ada", Team::Blue, 100, 30);
        player.spend(40);
        player.adjust_income(-20);
        player.credit(player.income());
        assert_eq!(player.money(), 70);
        assert_eq!(player.income(), 10);
    }

    #[test]
    fn player_bookkeeping_saturates() {
        let mut player =
            PlayerData::new(PlayerId::new(1), "ada", Team::Blue, i64::MAX - 5, i64::MAX);
        player.credit(player.income());
        player.adjust_income(1);
        assert_eq!(player.money(), i64::MAX);
        assert_eq!(player.income(), i64::MAX);

        let mut player =
            PlayerData::new(PlayerId::new(2), "bo", Team::Sharded, i64::MIN + 1, i64::MIN);
        player.spend(10);
        player.adjust_income(-1);
        assert_eq!(player.money(), i64::MIN);
        assert_eq!(player.income(), i64::MIN);
    }

    #[test]
    fn purchase_message_exposes_bundle_key() {
        let message = Message::Purchase {
            buyer: "ada".to_owned(),
        };
        assert_eq!(message.key(), "events.buy");
        assert_eq!(message.args(), vec!["ada"]);
    }

    #[test]
    fn player_data_round_trips_through_bincode() {
        let player = PlayerData::new(PlayerId::new(7), "grace", Team::Sharded, -5, 12);
        let bytes = bincode::serialize(&player).expect("serialize");
        let restored: PlayerData = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, player);
    }

    #[test]
    fn view_hit_tests_in_registration_order() {
        let snapshot = |id: u32, x: u32| RoomSnapshot {
            id: RoomId::new(id),
            tag: RoomTag::Block,
            geometry: RoomGeometry::new(TileCoord::new(x, 0), 4),
            cost: 10,
            label: String::new(),
            label_visible: true,
            bought: Some(false),
        };
        let view = RoomView::from_snapshots(vec![snapshot(1, 2), snapshot(0, 0)]);
        let hit = view.room_at(Vec2::new(20.0, 4.0)).expect("room under point");
        assert_eq!(hit.id, RoomId::new(0));
        assert!(view.room_at(Vec2::new(200.0, 4.0)).is_none());
    }
}
