//! Cost-optimal path search over a session snapshot.
//! This module exists so the decision engine and the action executor derive routes the same way.
//! It does not own target selection or the execution of the returned actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::Session;
use crate::types::*;

mod replay;
mod search;

pub use replay::{Replay, ReplayStep, replay_actions};
pub use search::manhattan;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathActionType {
    Move,
    OpenDoor,
    BoardBoat,
    Disembark,
    Teleport,
}

impl PathActionType {
    /// Whether the action draws from the per-turn action budget.
    pub const fn uses_action(self) -> bool {
        matches!(self, PathActionType::OpenDoor | PathActionType::BoardBoat | PathActionType::Disembark)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathAction {
    pub kind: PathActionType,
    pub orientation: Option<Orientation>,
    /// Cell the mover ends up on, or the door being opened.
    pub position: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    pub reachable: bool,
    pub total_cost: u32,
    pub actions_required: u32,
    pub actions: Vec<PathAction>,
    pub destination: Pos,
}

impl PathResult {
    pub fn unreachable(destination: Pos) -> Self {
        Self { reachable: false, total_cost: 0, actions_required: 0, actions: Vec::new(), destination }
    }

    /// Path for a mover already standing where it wants to be.
    pub fn stay(origin: Pos) -> Self {
        Self { reachable: true, total_cost: 0, actions_required: 0, actions: Vec::new(), destination: origin }
    }
}

/// Runs a best-first search from `origin` to `goal` within the given budgets.
///
/// Movement spends tile costs from `movement_budget`; opening a door, boarding
/// and disembarking each spend one unit of `action_budget`.
///
/// # Panics
///
/// Panics when `origin` lies outside the session grid.
pub fn find_path(
    session: &Session,
    origin: Pos,
    goal: Pos,
    movement_budget: u32,
    action_budget: u32,
) -> PathResult {
    search::run(session, origin, search::Goal::Cell(goal), movement_budget, action_budget)
        .into_path()
        .unwrap_or_else(|| PathResult::unreachable(goal))
}

/// Like [`find_path`], but any free cell orthogonally adjacent to `target` is accepted.
///
/// Used for targets the mover interacts with from next door: enemies,
/// sanctuaries and carried flags. A mover already adjacent gets an empty path.
pub fn find_path_adjacent(
    session: &Session,
    origin: Pos,
    target: Pos,
    movement_budget: u32,
    action_budget: u32,
) -> PathResult {
    search::run(session, origin, search::Goal::Adjacent(target), movement_budget, action_budget)
        .into_path()
        .unwrap_or_else(|| PathResult::unreachable(target))
}

/// Every cell the mover can end its movement on within the budgets, with the
/// cheapest path to each. The origin maps to an empty path.
pub fn reachable_destinations(
    session: &Session,
    origin: Pos,
    movement_budget: u32,
    action_budget: u32,
) -> BTreeMap<Pos, PathResult> {
    search::run(session, origin, search::Goal::Exhaustive, movement_budget, action_budget)
        .into_destinations()
}
