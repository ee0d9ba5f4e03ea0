use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    pub const fn step(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::N => Self { y: self.y - 1, x: self.x },
            Orientation::E => Self { y: self.y, x: self.x + 1 },
            Orientation::S => Self { y: self.y + 1, x: self.x },
            Orientation::W => Self { y: self.y, x: self.x - 1 },
        }
    }

    /// Direction of a single orthogonal step from `self` to `to`, if they are adjacent.
    pub fn orientation_to(self, to: Pos) -> Option<Orientation> {
        Orientation::ALL.into_iter().find(|&dir| self.step(dir) == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Orientation {
    N,
    E,
    S,
    W,
}

impl Orientation {
    /// Neighbour expansion order. Search tie-breaks depend on it staying fixed.
    pub const ALL: [Orientation; 4] = [Orientation::N, Orientation::E, Orientation::S, Orientation::W];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Base,
    Wall,
    Water,
    Ice,
    Door,
    Teleport,
}

pub const BASE_COST: u32 = 1;
pub const ICE_COST: u32 = 0;
pub const DOOR_COST: u32 = 1;
pub const TELEPORT_PAD_COST: u32 = 1;
pub const WATER_BOAT_COST: u32 = 1;

impl TileKind {
    /// Cost of stepping onto this tile on foot, ignoring door state.
    /// `None` means the tile can never be entered on foot.
    pub const fn foot_cost(self) -> Option<u32> {
        match self {
            TileKind::Base => Some(BASE_COST),
            TileKind::Ice => Some(ICE_COST),
            TileKind::Door => Some(DOOR_COST),
            TileKind::Teleport => Some(TELEPORT_PAD_COST),
            TileKind::Wall | TileKind::Water => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    HealSanctuary,
    FightSanctuary,
    Boat,
    Flag,
    StartPoint,
}

impl ObjectKind {
    pub const fn blocks_movement(self) -> bool {
        matches!(self, ObjectKind::HealSanctuary | ObjectKind::FightSanctuary)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Classic,
    CaptureTheFlag,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatBonus {
    pub attack: bool,
    pub defense: bool,
}

impl CombatBonus {
    pub const fn any(self) -> bool {
        self.attack || self.defense
    }
}
