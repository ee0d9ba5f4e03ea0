//! Re-execution of planned actions against a (possibly newer) snapshot.
//! The action executor uses it to check a plan before each step and to find
//! out how much of a plan fits into the current turn.

use std::collections::BTreeSet;

use super::search::manhattan;
use super::{PathAction, PathActionType};
use crate::error::ReplayError;
use crate::state::Session;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayStep {
    pub action: PathAction,
    pub cost: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replay {
    pub position: Pos,
    pub on_boat: bool,
    pub movement_spent: u32,
    pub actions_spent: u32,
    pub steps: Vec<ReplayStep>,
}

impl Replay {
    /// Number of leading steps payable within `movement_budget` and `action_budget`.
    pub fn affordable_prefix(&self, movement_budget: u32, action_budget: u32) -> usize {
        let mut movement = 0u32;
        let mut actions = 0u32;
        for (idx, step) in self.steps.iter().enumerate() {
            movement = movement.saturating_add(step.cost);
            actions += u32::from(step.action.kind.uses_action());
            if movement > movement_budget || actions > action_budget {
                return idx;
            }
        }
        self.steps.len()
    }
}

/// Replays `actions` from `origin`, failing on the first step the snapshot no longer allows.
pub fn replay_actions(
    session: &Session,
    origin: Pos,
    actions: &[PathAction],
) -> Result<Replay, ReplayError> {
    let mut on_boat = session.player_at(origin).is_some_and(|player| player.on_boat);
    let occupied = session.occupied_cells(origin);
    let mut free_boats = session.free_boats();
    if on_boat {
        free_boats.remove(&origin);
    }
    let mut opened = BTreeSet::new();

    let mut replay = Replay {
        position: origin,
        on_boat,
        movement_spent: 0,
        actions_spent: 0,
        steps: Vec::with_capacity(actions.len()),
    };

    let mut pending_jump = None;
    for (index, &action) in actions.iter().enumerate() {
        if let Some(at) = pending_jump.take()
            && action.kind != PathActionType::Teleport
        {
            return Err(ReplayError::MissedTeleport { index, at });
        }
        let from = replay.position;
        let to = action.position;
        let cost = match action.kind {
            PathActionType::OpenDoor => {
                if manhattan(from, to) != 1 {
                    return Err(ReplayError::NotAdjacent { index, from, to });
                }
                if !session.grid.tile(to).is_closed_door() || !opened.insert(to) {
                    return Err(ReplayError::NotADoor { index, at: to });
                }
                0
            }
            PathActionType::Teleport => {
                if session.grid.teleport_exit(from) != Some(to) {
                    return Err(ReplayError::BadTeleport { index, from, to });
                }
                if occupied.contains(&to) {
                    return Err(ReplayError::Occupied { index, at: to });
                }
                replay.position = to;
                0
            }
            kind => {
                if manhattan(from, to) != 1 {
                    return Err(ReplayError::NotAdjacent { index, from, to });
                }
                if occupied.contains(&to) {
                    return Err(ReplayError::Occupied { index, at: to });
                }
                if !session.grid.in_bounds(to) || session.is_blocked_by_object(to) {
                    return Err(ReplayError::Impassable { index, at: to });
                }
                let tile = session.grid.tile(to);
                let cost = match kind {
                    PathActionType::BoardBoat => {
                        if on_boat {
                            return Err(ReplayError::BoatState { index, expected: "on foot" });
                        }
                        if !free_boats.contains(&to) {
                            return Err(ReplayError::NoBoat { index, at: to });
                        }
                        on_boat = true;
                        WATER_BOAT_COST
                    }
                    PathActionType::Disembark => {
                        if !on_boat {
                            return Err(ReplayError::BoatState { index, expected: "on a boat" });
                        }
                        on_boat = false;
                        foot_cost(tile.kind, tile.open || opened.contains(&to))
                            .ok_or(ReplayError::Impassable { index, at: to })?
                    }
                    _ if on_boat => {
                        if tile.kind != TileKind::Water || free_boats.contains(&to) {
                            return Err(ReplayError::Impassable { index, at: to });
                        }
                        WATER_BOAT_COST
                    }
                    _ => {
                        if tile.is_closed_door() && !opened.contains(&to) {
                            return Err(ReplayError::DoorClosed { index, at: to });
                        }
                        foot_cost(tile.kind, true).ok_or(ReplayError::Impassable { index, at: to })?
                    }
                };
                if tile.kind == TileKind::Teleport {
                    pending_jump = Some(to);
                }
                replay.position = to;
                cost
            }
        };

        replay.movement_spent = replay.movement_spent.saturating_add(cost);
        replay.actions_spent += u32::from(action.kind.uses_action());
        replay.steps.push(ReplayStep { action, cost });
    }

    if let Some(at) = pending_jump {
        return Err(ReplayError::MissedTeleport { index: actions.len(), at });
    }
    replay.on_boat = on_boat;
    Ok(replay)
}

fn foot_cost(kind: TileKind, door_open: bool) -> Option<u32> {
    match kind {
        TileKind::Door if !door_open => None,
        kind => kind.foot_cost(),
    }
}
