//! Stable snapshot hashing for deterministic decisions.
//! This module exists so the decision seed depends only on what the snapshot contains.
//! It does not own randomness or any persistence of hashes.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::state::{Player, Session};
use crate::types::*;

impl Session {
    /// Canonical hash over every field that can influence a decision.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u32(self.turn);
        hasher.write_u8(match self.mode {
            GameMode::Classic => 0,
            GameMode::CaptureTheFlag => 1,
        });

        hasher.write_usize(self.grid.width);
        hasher.write_usize(self.grid.height);
        for tile in &self.grid.tiles {
            hasher.write_u8(tile.kind as u8);
            hasher.write_u8(u8::from(tile.open));
            hasher.write_u8(tile.channel.unwrap_or(u8::MAX));
        }

        hasher.write_usize(self.objects.len());
        for object in &self.objects {
            hasher.write_u8(object.kind as u8);
            write_pos(&mut hasher, object.position);
            hasher.write_u32(object.held_by.map_or(u32::MAX, |id| id.0));
        }

        hasher.write_usize(self.players.len());
        for player in &self.players {
            write_player(&mut hasher, player);
        }
        hasher.finish()
    }
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.y);
    hasher.write_i32(pos.x);
}

fn write_player(hasher: &mut Xxh3, player: &Player) {
    hasher.write_u32(player.id.0);
    write_pos(hasher, player.position);
    match player.start_position {
        Some(start) => {
            hasher.write_u8(1);
            write_pos(hasher, start);
        }
        None => hasher.write_u8(0),
    }
    hasher.write_i32(player.health);
    hasher.write_i32(player.max_health);
    hasher.write_u32(player.movement_points);
    hasher.write_u32(player.actions_remaining);
    hasher.write_u8(u8::from(player.combat_bonus.attack));
    hasher.write_u8(u8::from(player.combat_bonus.defense));
    hasher.write_u8(u8::from(player.on_boat));
    hasher.write_u8(u8::from(player.eliminated));
    hasher.write_u8(player.team.map_or(u8::MAX, |team| team.0));
}

#[cfg(test)]
mod tests {
    use crate::state::Tile;
    use crate::test_support::*;
    use crate::types::*;

    #[test]
    fn identical_snapshots_hash_identically() {
        let mut a = open_arena(4, 4);
        add_player(&mut a, 1, Pos::new(0, 0));
        let b = a.clone();
        assert_eq!(a.snapshot_hash(), b.snapshot_hash());
    }

    #[test]
    fn hash_tracks_positions_and_tiles() {
        let mut session = open_arena(4, 4);
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        let baseline = session.snapshot_hash();

        player_mut(&mut session, vp).position = Pos::new(0, 1);
        assert_ne!(baseline, session.snapshot_hash());
        player_mut(&mut session, vp).position = Pos::new(0, 0);
        assert_eq!(baseline, session.snapshot_hash());

        session.grid.set_tile(Pos::new(3, 3), Tile::door(false));
        assert_ne!(baseline, session.snapshot_hash());
    }

    #[test]
    fn player_names_do_not_affect_the_hash() {
        let mut session = open_arena(2, 2);
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        let baseline = session.snapshot_hash();
        player_mut(&mut session, vp).name = "Bot Alpha".to_owned();
        assert_eq!(baseline, session.snapshot_hash());
    }
}
