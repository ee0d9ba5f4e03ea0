pub mod config;
pub mod error;
pub mod hash;
pub mod mapgen;
pub mod pathfinding;
pub mod state;
pub mod types;
pub mod vp;

#[cfg(test)]
mod test_support;

pub use config::{VpConfig, VpProfile};
pub use error::{ConfigError, DecisionError, ReplayError, SessionError};
pub use mapgen::{ArenaSpec, generate_arena};
pub use pathfinding::{
    PathAction, PathActionType, PathResult, find_path, find_path_adjacent, reachable_destinations, replay_actions,
};
pub use state::{Grid, PlacedObject, Player, Session, Tile};
pub use types::*;
pub use vp::{VpDecision, decide, decide_with_rng};
