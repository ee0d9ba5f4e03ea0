//! Weighted scoring of path-annotated candidates.
//! This module exists so both behaviour profiles share one scoring formula.
//! It does not own ranking, tie-breaks or the double-action draw.

use serde::{Deserialize, Serialize};

use super::escape::{EscapeCandidate, nearest_enemy_distance};
use super::scanner::{MapScanResult, PoiCategory, PointOfInterest};
use crate::config::VpConfig;
use crate::pathfinding::PathResult;
use crate::state::Player;
use crate::types::*;

/// Decision categories in tie-break rank order, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetCategory {
    Enemy,
    Flag,
    FightSanctuary,
    HealSanctuary,
    Boat,
    Escape,
}

impl From<PoiCategory> for TargetCategory {
    fn from(category: PoiCategory) -> Self {
        match category {
            PoiCategory::Enemy => TargetCategory::Enemy,
            PoiCategory::HealSanctuary => TargetCategory::HealSanctuary,
            PoiCategory::FightSanctuary => TargetCategory::FightSanctuary,
            PoiCategory::Boat => TargetCategory::Boat,
            PoiCategory::Flag => TargetCategory::Flag,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    Point(PointOfInterest),
    Escape { position: Pos, nearest_enemy_distance: u32 },
}

impl Objective {
    pub fn category(&self) -> TargetCategory {
        match self {
            Objective::Point(point) => point.category.into(),
            Objective::Escape { .. } => TargetCategory::Escape,
        }
    }

    pub fn position(&self) -> Pos {
        match self {
            Objective::Point(point) => point.position,
            Objective::Escape { position, .. } => *position,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedTarget {
    pub objective: Objective,
    pub path: PathResult,
    pub priority_score: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfInterestWithPath {
    pub poi: PointOfInterest,
    pub path: PathResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapScanWithDistances {
    pub points: Vec<PointOfInterestWithPath>,
    pub escape: Option<EscapeCandidate>,
}

/// The slice of the VP's own state the scoring formula reads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VpState {
    pub health_ratio: f64,
    pub combat_bonus: CombatBonus,
    /// Manhattan distance from the VP to its closest enemy.
    pub nearest_enemy_distance: Option<u32>,
}

impl VpState {
    pub fn new(vp: &Player, scan: &MapScanResult) -> Self {
        let enemies: Vec<Pos> = scan.enemies().map(|enemy| enemy.position).collect();
        Self {
            health_ratio: vp.health_ratio(),
            combat_bonus: vp.combat_bonus,
            nearest_enemy_distance: nearest_enemy_distance(vp.position, &enemies),
        }
    }
}

/// Scores every viable candidate. Output follows input order with the escape
/// pseudo-target last; it is neither sorted nor clamped.
pub fn evaluate(scan: &MapScanWithDistances, vp: &VpState, config: &VpConfig) -> Vec<EvaluatedTarget> {
    let mut targets = Vec::with_capacity(scan.points.len() + 1);

    for PointOfInterestWithPath { poi, path } in &scan.points {
        if !path.reachable {
            continue;
        }
        let exclusive = matches!(
            poi.category,
            PoiCategory::HealSanctuary | PoiCategory::FightSanctuary | PoiCategory::Boat
        );
        if exclusive && poi.is_held {
            continue;
        }
        if max_distance(poi.category, config).is_some_and(|cap| path.total_cost > cap) {
            continue;
        }
        let priority_score = point_score(poi.category, path.total_cost, vp, config);
        tracing::trace!(category = ?poi.category, position = ?poi.position, cost = path.total_cost, priority_score, "scored");
        targets.push(EvaluatedTarget { objective: Objective::Point(*poi), path: path.clone(), priority_score });
    }

    if config.escape_enabled()
        && let Some(escape) = &scan.escape
    {
        let priority_score = escape_score(escape, vp, config);
        tracing::trace!(position = ?escape.position, priority_score, "scored escape");
        targets.push(EvaluatedTarget {
            objective: Objective::Escape {
                position: escape.position,
                nearest_enemy_distance: escape.nearest_enemy_distance,
            },
            path: escape.path.clone(),
            priority_score,
        });
    }
    targets
}

fn max_distance(category: PoiCategory, config: &VpConfig) -> Option<u32> {
    let caps = &config.max_distances;
    match category {
        PoiCategory::Enemy => None,
        PoiCategory::HealSanctuary => Some(caps.heal),
        PoiCategory::FightSanctuary => Some(caps.fight_sanctuary),
        PoiCategory::Boat => Some(caps.boat),
        PoiCategory::Flag => Some(caps.flag),
    }
}

fn point_score(category: PoiCategory, cost: u32, vp: &VpState, config: &VpConfig) -> f64 {
    let priorities = &config.priorities;
    let weights = &config.distance_weights;
    let bonuses = &config.bonuses;
    let cost = f64::from(cost);

    match category {
        PoiCategory::Enemy => {
            let adjacent = if cost == 0.0 { bonuses.adjacent_attack } else { 0.0 };
            priorities.attack - weights.enemy * cost + adjacent
        }
        PoiCategory::HealSanctuary => {
            let urgency = if vp.health_ratio < config.health.critical {
                bonuses.critical_health_heal
            } else if vp.health_ratio < config.health.heal {
                bonuses.low_health_heal
            } else {
                0.0
            };
            priorities.heal - weights.heal * cost + urgency
        }
        PoiCategory::FightSanctuary => {
            let unbuffed = if vp.combat_bonus.any() { 0.0 } else { bonuses.no_bonus_fight_sanctuary };
            priorities.fight_sanctuary - weights.fight_sanctuary * cost + unbuffed
        }
        PoiCategory::Boat => priorities.boat - weights.boat * cost,
        PoiCategory::Flag => priorities.flag - weights.flag * cost,
    }
}

fn escape_score(escape: &EscapeCandidate, vp: &VpState, config: &VpConfig) -> f64 {
    let threatened =
        vp.nearest_enemy_distance.is_some_and(|distance| distance <= config.escape.enemy_proximity_tiles);
    let mut score = config.priorities.escape;
    if threatened {
        score += config.bonuses.escape_when_enemy_close
            + config.escape.distance_bonus_per_tile * f64::from(escape.nearest_enemy_distance);
    }
    score
}
