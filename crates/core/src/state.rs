//! Session snapshot and read-only grid model.
//! This module exists so every engine stage reads tiles, objects, and players through one view.
//! It does not own turn sequencing or any mutation of game state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::VpProfile;
use crate::error::SessionError;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub kind: TileKind,
    /// Door state. Ignored for every other kind.
    pub open: bool,
    /// Teleport channel. Ignored for every other kind.
    pub channel: Option<u8>,
}

impl Tile {
    pub const fn new(kind: TileKind) -> Self {
        Self { kind, open: false, channel: None }
    }

    pub const fn door(open: bool) -> Self {
        Self { kind: TileKind::Door, open, channel: None }
    }

    pub const fn teleport(channel: u8) -> Self {
        Self { kind: TileKind::Teleport, open: false, channel: Some(channel) }
    }

    pub const fn is_closed_door(self) -> bool {
        matches!(self.kind, TileKind::Door) && !self.open
    }

    /// Whether a player may stand on this tile outside of a boat.
    pub const fn holds_player_on_foot(self) -> bool {
        match self.kind {
            TileKind::Wall | TileKind::Water => false,
            TileKind::Door => self.open,
            TileKind::Base | TileKind::Ice | TileKind::Teleport => true,
        }
    }

    fn symbol(self) -> char {
        match (self.kind, self.open, self.channel) {
            (TileKind::Base, _, _) => '.',
            (TileKind::Wall, _, _) => '#',
            (TileKind::Water, _, _) => '~',
            (TileKind::Ice, _, _) => '*',
            (TileKind::Door, true, _) => 'd',
            (TileKind::Door, false, _) => 'D',
            (TileKind::Teleport, _, Some(channel)) => char::from(b'0' + channel.min(9)),
            (TileKind::Teleport, _, None) => '0',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            '.' => Tile::new(TileKind::Base),
            '#' => Tile::new(TileKind::Wall),
            '~' => Tile::new(TileKind::Water),
            '*' => Tile::new(TileKind::Ice),
            'D' => Tile::door(false),
            'd' => Tile::door(true),
            '0'..='9' => Tile::teleport(symbol as u8 - b'0'),
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridLayout", into = "GridLayout")]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
}

/// Row-per-line layout used on the wire: `.` base, `#` wall, `~` water, `*` ice,
/// `D`/`d` closed/open door, `0`-`9` teleport pad on that channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GridLayout {
    rows: Vec<String>,
}

impl Grid {
    /// All-base grid.
    ///
    /// # Panics
    ///
    /// Panics when either dimension is zero; a grid without cells is a caller bug.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive, got {width}x{height}");
        Self { width, height, tiles: vec![Tile::new(TileKind::Base); width * height] }
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, SessionError> {
        let Some(first) = rows.first() else {
            return Err(SessionError::EmptyGrid);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(SessionError::EmptyGrid);
        }
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let actual = line.chars().count();
            if actual != width {
                return Err(SessionError::RaggedRow { row, expected: width, actual });
            }
            for (column, symbol) in line.chars().enumerate() {
                let tile = Tile::from_symbol(symbol)
                    .ok_or(SessionError::UnknownTile { row, column, symbol })?;
                tiles.push(tile);
            }
        }
        Ok(Self { width, height: rows.len(), tiles })
    }

    pub fn rows(&self) -> Vec<String> {
        self.tiles.chunks(self.width).map(|row| row.iter().map(|tile| tile.symbol()).collect()).collect()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Tile at `pos`; everything outside the grid reads as wall.
    pub fn tile(&self, pos: Pos) -> Tile {
        if !self.in_bounds(pos) {
            return Tile::new(TileKind::Wall);
        }
        self.tiles[self.index(pos)]
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos::new(y as i32, x as i32)))
    }

    pub fn has_ice(&self) -> bool {
        self.tiles.iter().any(|tile| tile.kind == TileKind::Ice)
    }

    /// Teleport pads grouped by channel, each group in row-major order.
    pub fn teleport_pads(&self) -> BTreeMap<u8, Vec<Pos>> {
        let mut pads: BTreeMap<u8, Vec<Pos>> = BTreeMap::new();
        for pos in self.positions() {
            let tile = self.tile(pos);
            if tile.kind == TileKind::Teleport {
                pads.entry(tile.channel.unwrap_or(0)).or_default().push(pos);
            }
        }
        pads
    }

    /// The paired pad of the teleport at `pos`.
    pub fn teleport_exit(&self, pos: Pos) -> Option<Pos> {
        let tile = self.tile(pos);
        if tile.kind != TileKind::Teleport {
            return None;
        }
        let channel = tile.channel.unwrap_or(0);
        self.positions().find(|&other| {
            other != pos && {
                let candidate = self.tile(other);
                candidate.kind == TileKind::Teleport && candidate.channel.unwrap_or(0) == channel
            }
        })
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

impl TryFrom<GridLayout> for Grid {
    type Error = SessionError;

    fn try_from(layout: GridLayout) -> Result<Self, Self::Error> {
        Grid::from_rows(&layout.rows)
    }
}

impl From<Grid> for GridLayout {
    fn from(grid: Grid) -> Self {
        Self { rows: grid.rows() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    pub kind: ObjectKind,
    pub position: Pos,
    #[serde(default)]
    pub held_by: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    pub position: Pos,
    #[serde(default)]
    pub start_position: Option<Pos>,
    pub health: i32,
    pub max_health: i32,
    pub movement_points: u32,
    pub actions_remaining: u32,
    #[serde(default)]
    pub combat_bonus: CombatBonus,
    #[serde(default)]
    pub on_boat: bool,
    #[serde(default)]
    pub eliminated: bool,
    #[serde(default)]
    pub team: Option<Team>,
    /// Behaviour profile for virtual players; `None` for humans.
    #[serde(default)]
    pub profile: Option<VpProfile>,
}

impl Player {
    pub fn new(id: PlayerId, position: Pos) -> Self {
        Self {
            id,
            name: String::new(),
            position,
            start_position: Some(position),
            health: 10,
            max_health: 10,
            movement_points: 6,
            actions_remaining: 1,
            combat_bonus: CombatBonus::default(),
            on_boat: false,
            eliminated: false,
            team: None,
            profile: None,
        }
    }

    pub fn health_ratio(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        f64::from(self.health.max(0)) / f64::from(self.max_health)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub mode: GameMode,
    pub grid: Grid,
    #[serde(default)]
    pub objects: Vec<PlacedObject>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Session {
    pub fn new(grid: Grid) -> Self {
        Self { seed: 0, turn: 0, mode: GameMode::Classic, grid, objects: Vec::new(), players: Vec::new() }
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Players that still occupy a cell on the grid.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| !player.eliminated && self.grid.in_bounds(player.position))
    }

    /// The active player standing on `pos`, if any.
    pub fn player_at(&self, pos: Pos) -> Option<&Player> {
        self.active_players().find(|player| player.position == pos)
    }

    /// Cells occupied by active players other than whoever stands on `mover_origin`.
    pub fn occupied_cells(&self, mover_origin: Pos) -> BTreeSet<Pos> {
        self.active_players().map(|player| player.position).filter(|&pos| pos != mover_origin).collect()
    }

    pub fn objects_of(&self, kind: ObjectKind) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter().filter(move |object| object.kind == kind)
    }

    pub fn is_blocked_by_object(&self, pos: Pos) -> bool {
        self.objects.iter().any(|object| object.position == pos && object.kind.blocks_movement())
    }

    /// Water cells holding a boat nobody occupies.
    pub fn free_boats(&self) -> BTreeSet<Pos> {
        self.objects_of(ObjectKind::Boat)
            .filter(|boat| boat.held_by.is_none())
            .map(|boat| boat.position)
            .collect()
    }

    /// Checks that the snapshot is internally consistent.
    pub fn validate(&self) -> Result<(), SessionError> {
        let Grid { width, height, ref tiles } = self.grid;
        if width == 0 || height == 0 {
            return Err(SessionError::EmptyGrid);
        }
        if width.checked_mul(height) != Some(tiles.len()) {
            return Err(SessionError::GridSize { width, height, tiles: tiles.len() });
        }

        let mut seen = BTreeSet::new();
        for player in &self.players {
            if !seen.insert(player.id) {
                return Err(SessionError::DuplicatePlayer(player.id));
            }
            if player.eliminated {
                continue;
            }
            if !self.grid.in_bounds(player.position) {
                return Err(SessionError::PlayerOutOfBounds {
                    player: player.id,
                    position: player.position,
                });
            }
            let tile = self.grid.tile(player.position);
            let standable = if player.on_boat {
                tile.kind == TileKind::Water
            } else {
                tile.holds_player_on_foot()
            };
            if !standable {
                return Err(SessionError::PlayerOnImpassableTile {
                    player: player.id,
                    position: player.position,
                });
            }
        }

        for object in &self.objects {
            if !self.grid.in_bounds(object.position) {
                return Err(SessionError::ObjectOutOfBounds {
                    kind: object.kind,
                    position: object.position,
                });
            }
            match object.kind {
                ObjectKind::StartPoint if !self.grid.tile(object.position).holds_player_on_foot() => {
                    return Err(SessionError::StartPointWithoutTile(object.position));
                }
                ObjectKind::Boat if self.grid.tile(object.position).kind != TileKind::Water => {
                    return Err(SessionError::BoatOffWater(object.position));
                }
                _ => {}
            }
        }

        for (channel, pads) in self.grid.teleport_pads() {
            if pads.len() != 2 {
                return Err(SessionError::UnpairedTeleport { channel, count: pads.len() });
            }
        }
        Ok(())
    }
}
