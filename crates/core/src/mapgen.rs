//! Seeded arena generation for fuzzing and property tests.
//! This module exists so harnesses can produce many valid, varied snapshots from a single seed.
//! It does not own map editing or any persistence of generated arenas.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::VpProfile;
use crate::state::{Grid, PlacedObject, Player, Session, Tile};
use crate::types::*;

/// Shape of a generated arena. Counts are upper bounds; crowded arenas place fewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaSpec {
    pub width: usize,
    pub height: usize,
    pub mode: GameMode,
    pub players: u32,
    /// Chance in percent that an interior cell becomes a wall.
    pub wall_percent: u32,
    pub lakes: u32,
    pub ice_tiles: u32,
    pub doors: u32,
    pub teleport_pairs: u8,
    pub heal_sanctuaries: u32,
    pub fight_sanctuaries: u32,
    pub flags: u32,
}

impl Default for ArenaSpec {
    fn default() -> Self {
        Self {
            width: 16,
            height: 12,
            mode: GameMode::Classic,
            players: 4,
            wall_percent: 12,
            lakes: 1,
            ice_tiles: 6,
            doors: 3,
            teleport_pairs: 1,
            heal_sanctuaries: 1,
            fight_sanctuaries: 1,
            flags: 0,
        }
    }
}

const LAKE_WIDTH: usize = 3;
const LAKE_HEIGHT: usize = 2;

/// Builds a walled arena whose snapshot always passes [`Session::validate`].
///
/// # Panics
///
/// Panics when the arena is smaller than 5x5 or asks for more than ten teleport channels.
pub fn generate_arena(seed: u64, spec: ArenaSpec) -> Session {
    assert!(spec.width >= 5 && spec.height >= 5, "arena must be at least 5x5, got {}x{}", spec.width, spec.height);
    assert!(spec.teleport_pairs <= 10, "at most ten teleport channels exist, got {}", spec.teleport_pairs);

    let mut builder = ArenaBuilder {
        rng: ChaCha8Rng::seed_from_u64(seed),
        width: spec.width,
        height: spec.height,
        session: Session::new(Grid::new(spec.width, spec.height)),
        used: BTreeSet::new(),
    };
    builder.session.seed = seed;
    builder.session.mode = spec.mode;

    builder.walls(spec.wall_percent);
    for _ in 0..spec.lakes {
        builder.lake();
    }
    for _ in 0..spec.doors {
        let open = builder.roll(3) == 0;
        builder.stamp(Tile::door(open));
    }
    for _ in 0..spec.ice_tiles {
        builder.stamp(Tile::new(TileKind::Ice));
    }
    for channel in 0..spec.teleport_pairs {
        builder.teleport_pair(channel);
    }
    for _ in 0..spec.heal_sanctuaries {
        builder.object(ObjectKind::HealSanctuary);
    }
    for _ in 0..spec.fight_sanctuaries {
        builder.object(ObjectKind::FightSanctuary);
    }
    if spec.mode == GameMode::CaptureTheFlag {
        for _ in 0..spec.flags {
            builder.object(ObjectKind::Flag);
        }
    }
    for id in 1..=spec.players {
        builder.player(PlayerId(id), spec.mode);
    }

    let session = builder.session;
    tracing::debug!(
        seed,
        width = spec.width,
        height = spec.height,
        players = session.players.len(),
        objects = session.objects.len(),
        "generated arena"
    );
    session
}

struct ArenaBuilder {
    rng: ChaCha8Rng,
    width: usize,
    height: usize,
    session: Session,
    /// Cells already carrying a feature, object or player.
    used: BTreeSet<Pos>,
}

impl ArenaBuilder {
    fn roll(&mut self, bound: usize) -> usize {
        (self.rng.next_u64() % bound as u64) as usize
    }

    fn interior(&self) -> impl Iterator<Item = Pos> + use<> {
        let (width, height) = (self.width, self.height);
        (1..height - 1).flat_map(move |y| (1..width - 1).map(move |x| Pos::new(y as i32, x as i32)))
    }

    fn free_cell(&mut self) -> Option<Pos> {
        let candidates: Vec<Pos> = self
            .interior()
            .filter(|pos| !self.used.contains(pos) && self.session.grid.tile(*pos).kind == TileKind::Base)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = candidates[self.roll(candidates.len())];
        self.used.insert(pick);
        Some(pick)
    }

    fn walls(&mut self, wall_percent: u32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos::new(y as i32, x as i32);
                let border = y == 0 || x == 0 || y + 1 == self.height || x + 1 == self.width;
                if border || self.roll(100) < wall_percent as usize {
                    self.session.grid.set_tile(pos, Tile::new(TileKind::Wall));
                }
            }
        }
    }

    fn lake(&mut self) {
        if self.width < LAKE_WIDTH + 2 || self.height < LAKE_HEIGHT + 2 {
            return;
        }
        let left = 1 + self.roll(self.width - LAKE_WIDTH - 1);
        let top = 1 + self.roll(self.height - LAKE_HEIGHT - 1);
        let cells: Vec<Pos> = (top..top + LAKE_HEIGHT)
            .flat_map(|y| (left..left + LAKE_WIDTH).map(move |x| Pos::new(y as i32, x as i32)))
            .filter(|pos| !self.used.contains(pos))
            .collect();
        if cells.is_empty() {
            return;
        }
        for &pos in &cells {
            self.session.grid.set_tile(pos, Tile::new(TileKind::Water));
            self.used.insert(pos);
        }
        let boat = cells[self.roll(cells.len())];
        self.session.objects.push(PlacedObject { kind: ObjectKind::Boat, position: boat, held_by: None });
    }

    fn stamp(&mut self, tile: Tile) -> Option<Pos> {
        let pos = self.free_cell()?;
        self.session.grid.set_tile(pos, tile);
        Some(pos)
    }

    fn teleport_pair(&mut self, channel: u8) {
        let Some(first) = self.stamp(Tile::teleport(channel)) else {
            return;
        };
        if self.stamp(Tile::teleport(channel)).is_none() {
            self.session.grid.set_tile(first, Tile::new(TileKind::Base));
        }
    }

    fn object(&mut self, kind: ObjectKind) {
        if let Some(position) = self.free_cell() {
            self.session.objects.push(PlacedObject { kind, position, held_by: None });
        }
    }

    fn player(&mut self, id: PlayerId, mode: GameMode) {
        let Some(position) = self.free_cell() else {
            return;
        };
        let mut player = Player::new(id, position);
        player.name = format!("Player {}", id.0);
        player.health = 1 + self.roll(player.max_health as usize) as i32;
        player.movement_points = 3 + self.roll(5) as u32;
        player.combat_bonus.attack = self.roll(4) == 0;
        player.profile = Some(if id.0 % 2 == 1 { VpProfile::Offensive } else { VpProfile::Defensive });
        if mode == GameMode::CaptureTheFlag {
            player.team = Some(Team((id.0 % 2) as u8));
        }
        self.session.objects.push(PlacedObject { kind: ObjectKind::StartPoint, position, held_by: None });
        self.session.players.push(player);
    }
}
