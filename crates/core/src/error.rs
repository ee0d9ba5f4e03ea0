//! Error taxonomy for snapshot validation and profile loading.
//!
//! Unreachable targets and "nothing to do" outcomes are not errors; they are
//! represented in `PathResult` and `VpDecision`. The enums here cover states a
//! caller must log and abort on instead of executing a corrupted plan.

use std::io;
use std::path::PathBuf;

use crate::types::{ObjectKind, PlayerId, Pos};

/// Inconsistent session snapshot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("grid row {row} has {actual} tiles, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("grid row {row} column {column} holds unknown tile symbol {symbol:?}")]
    UnknownTile { row: usize, column: usize, symbol: char },

    #[error("grid has no rows")]
    EmptyGrid,

    #[error("grid is {width}x{height} but holds {tiles} tiles")]
    GridSize { width: usize, height: usize, tiles: usize },

    #[error("player {0:?} appears more than once in the roster")]
    DuplicatePlayer(PlayerId),

    #[error("player {player:?} stands at {position:?}, outside the grid")]
    PlayerOutOfBounds { player: PlayerId, position: Pos },

    #[error("player {player:?} stands on an impassable tile at {position:?}")]
    PlayerOnImpassableTile { player: PlayerId, position: Pos },

    #[error("{kind:?} at {position:?} lies outside the grid")]
    ObjectOutOfBounds { kind: ObjectKind, position: Pos },

    #[error("start point at {0:?} has no matching walkable tile")]
    StartPointWithoutTile(Pos),

    #[error("boat at {0:?} is not on a water tile")]
    BoatOffWater(Pos),

    #[error("teleport channel {channel} has {count} pads, expected exactly 2")]
    UnpairedTeleport { channel: u8, count: usize },
}

/// Failure to load or accept a behaviour profile.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read profile {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse profile")]
    Parse(#[from] toml::de::Error),

    #[error("profile field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("critical health threshold {critical} exceeds heal threshold {heal}")]
    ThresholdOrder { heal: f64, critical: f64 },
}

/// Why a decision could not be planned at all.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("behaviour profile rejected")]
    Config(#[from] ConfigError),
}

/// A planned action that can no longer be executed against the current snapshot.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("action {index} targets {to:?}, which is not reachable from {from:?} in one step")]
    NotAdjacent { index: usize, from: Pos, to: Pos },

    #[error("action {index} enters impassable tile at {at:?}")]
    Impassable { index: usize, at: Pos },

    #[error("action {index} moves into {at:?}, occupied by another player")]
    Occupied { index: usize, at: Pos },

    #[error("action {index} walks through the closed door at {at:?}")]
    DoorClosed { index: usize, at: Pos },

    #[error("action {index} opens {at:?}, which is not a closed door")]
    NotADoor { index: usize, at: Pos },

    #[error("action {index} boards at {at:?}, where no free boat is moored")]
    NoBoat { index: usize, at: Pos },

    #[error("action {index} needs the mover to be {expected}")]
    BoatState { index: usize, expected: &'static str },

    #[error("action {index} teleports to {to:?}, which is not the exit of the pad at {from:?}")]
    BadTeleport { index: usize, from: Pos, to: Pos },

    #[error("action {index} should jump away from the teleport pad at {at:?}")]
    MissedTeleport { index: usize, at: Pos },
}
