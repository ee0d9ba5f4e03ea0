//! Shared test fixtures for the crate's unit test suites.
//! This module exists to avoid repeating grid and roster setup across many tests.
//! It does not own production engine logic.

use crate::state::{Grid, PlacedObject, Player, Session};
use crate::types::*;

pub(crate) fn session_from_rows(rows: &[&str]) -> Session {
    Session::new(Grid::from_rows(rows).expect("fixture rows should parse"))
}

pub(crate) fn open_arena(width: usize, height: usize) -> Session {
    Session::new(Grid::new(width, height))
}

pub(crate) fn add_player(session: &mut Session, id: u32, pos: Pos) -> PlayerId {
    let id = PlayerId(id);
    session.players.push(Player::new(id, pos));
    id
}

pub(crate) fn add_object(session: &mut Session, kind: ObjectKind, position: Pos) {
    session.objects.push(PlacedObject { kind, position, held_by: None });
}

pub(crate) fn player_mut(session: &mut Session, id: PlayerId) -> &mut Player {
    session.players.iter_mut().find(|player| player.id == id).expect("fixture player should exist")
}

/// Corridor along row 1 of a walled 3-row strip, with `door` (if any) at column `door_x`.
pub(crate) fn corridor_fixture(length: usize, door: Option<(usize, bool)>) -> Session {
    let wall = "#".repeat(length);
    let mut middle: Vec<char> = ".".repeat(length).chars().collect();
    if let Some((door_x, open)) = door {
        middle[door_x] = if open { 'd' } else { 'D' };
    }
    let middle: String = middle.into_iter().collect();
    session_from_rows(&[wall.as_str(), middle.as_str(), wall.as_str()])
}

/// A lake separating two shores, with a free boat moored against the west shore.
///
/// ```text
/// ..~~~..
/// ..~~~..
/// ```
pub(crate) fn lake_fixture() -> (Session, Pos, Pos) {
    let mut session = session_from_rows(&["..~~~..", "..~~~.."]);
    let boat = Pos::new(0, 2);
    add_object(&mut session, ObjectKind::Boat, boat);
    (session, Pos::new(0, 0), Pos::new(0, 6))
}
