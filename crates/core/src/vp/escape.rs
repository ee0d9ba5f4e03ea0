//! Escape point discovery for cautious profiles.

use serde::{Deserialize, Serialize};

use crate::pathfinding::{PathResult, manhattan, reachable_destinations};
use crate::state::{Player, Session};
use crate::types::Pos;

/// Best cell to retreat to this turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeCandidate {
    pub position: Pos,
    /// Manhattan distance from `position` to the closest enemy.
    pub nearest_enemy_distance: u32,
    pub path: PathResult,
}

pub fn nearest_enemy_distance(from: Pos, enemies: &[Pos]) -> Option<u32> {
    enemies.iter().map(|&enemy| manhattan(from, enemy)).min()
}

/// The reachable cell that puts the most distance between the VP and the
/// nearest enemy, using only this turn's movement points and actions.
///
/// Ties prefer the cheaper path, then the lower `(y, x)` cell. Returns `None`
/// when there are no enemies or when no cell improves on standing still.
pub fn find_escape(session: &Session, vp: &Player, enemies: &[Pos]) -> Option<EscapeCandidate> {
    let current = nearest_enemy_distance(vp.position, enemies)?;

    let mut best: Option<EscapeCandidate> = None;
    for (position, path) in reachable_destinations(session, vp.position, vp.movement_points, vp.actions_remaining) {
        if position == vp.position {
            continue;
        }
        let Some(distance) = nearest_enemy_distance(position, enemies) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(best) => {
                distance > best.nearest_enemy_distance
                    || (distance == best.nearest_enemy_distance && path.total_cost < best.path.total_cost)
            }
        };
        if better {
            best = Some(EscapeCandidate { position, nearest_enemy_distance: distance, path });
        }
    }

    let best = best.filter(|candidate| candidate.nearest_enemy_distance > current);
    tracing::trace!(
        vp = ?vp.id,
        current,
        escape = ?best.as_ref().map(|candidate| (candidate.position, candidate.nearest_enemy_distance)),
        "escape search"
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn escape_moves_away_from_the_nearest_enemy() {
        let mut session = open_arena(9, 1);
        let vp = add_player(&mut session, 1, Pos::new(0, 4));
        player_mut(&mut session, vp).movement_points = 2;
        add_player(&mut session, 2, Pos::new(0, 2));

        let player = session.player(vp).expect("vp exists").clone();
        let escape = find_escape(&session, &player, &[Pos::new(0, 2)]).expect("an escape should exist");
        assert_eq!(escape.position, Pos::new(0, 6));
        assert_eq!(escape.nearest_enemy_distance, 4);
        assert_eq!(escape.path.total_cost, 2);
    }

    #[test]
    fn equal_distance_prefers_the_cheaper_cell() {
        let mut session = open_arena(5, 5);
        let vp = add_player(&mut session, 1, Pos::new(2, 2));
        player_mut(&mut session, vp).movement_points = 3;
        let player = session.player(vp).expect("vp exists").clone();

        // Four cells end up five tiles from the enemy, all at cost 3.
        let escape = find_escape(&session, &player, &[Pos::new(0, 2)]).expect("an escape should exist");
        assert_eq!(escape.nearest_enemy_distance, 5);
        assert_eq!(escape.path.total_cost, 3);
        assert_eq!(escape.position, Pos::new(3, 0));
    }

    #[test]
    fn cornered_vp_has_no_escape() {
        let mut session = session_from_rows(&["#.#", "#.#"]);
        let vp = add_player(&mut session, 1, Pos::new(1, 1));
        add_player(&mut session, 2, Pos::new(0, 1));
        let player = session.player(vp).expect("vp exists").clone();
        assert_eq!(find_escape(&session, &player, &[Pos::new(0, 1)]), None);
    }

    #[test]
    fn no_enemies_means_no_escape() {
        let mut session = open_arena(3, 3);
        let vp = add_player(&mut session, 1, Pos::new(1, 1));
        let player = session.player(vp).expect("vp exists").clone();
        assert_eq!(find_escape(&session, &player, &[]), None);
    }
}
