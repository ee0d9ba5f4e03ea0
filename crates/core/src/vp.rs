//! Virtual player turn planning.
//! This module exists so a VP's whole decision comes from one pure call over a snapshot.
//! It does not own executing actions, combat resolution or turn sequencing.

use std::cmp::Ordering;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::VpConfig;
use crate::error::{DecisionError, ReplayError};
use crate::pathfinding::{PathAction, find_path, find_path_adjacent, replay_actions};
use crate::state::{Player, Session};
use crate::types::*;

pub mod escape;
pub mod evaluator;
pub mod scanner;

pub use escape::{EscapeCandidate, find_escape};
pub use evaluator::{
    EvaluatedTarget, MapScanWithDistances, Objective, PointOfInterestWithPath, TargetCategory, VpState, evaluate,
};
pub use scanner::{Approach, MapScanResult, PoiCategory, PointOfInterest, scan};

/// Movement allowance used when planning routes to targets. Targets further
/// away than one turn are still worth heading for; the executor trims the
/// plan to what the VP can pay for this turn.
pub const PLANNING_MOVEMENT_BUDGET: u32 = u32::MAX;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VpDecision {
    pub target: Option<EvaluatedTarget>,
    /// Every viable target, best first.
    pub all_evaluated_targets: Vec<EvaluatedTarget>,
    pub use_double_action: bool,
}

impl VpDecision {
    /// The full planned route to the winning target; empty when there is none.
    pub fn actions(&self) -> &[PathAction] {
        match &self.target {
            Some(target) => &target.path.actions,
            None => &[],
        }
    }

    /// The leading part of the plan the VP can pay for this turn, checked
    /// against `session` (which may be newer than the one the plan came from).
    ///
    /// # Panics
    ///
    /// Panics when `vp_id` is not in the session roster.
    pub fn turn_actions(&self, session: &Session, vp_id: PlayerId) -> Result<Vec<PathAction>, ReplayError> {
        let vp = roster_entry(session, vp_id);
        let actions = self.actions();
        let replay = replay_actions(session, vp.position, actions)?;
        let affordable = replay.affordable_prefix(vp.movement_points, vp.actions_remaining);
        Ok(actions[..affordable].to_vec())
    }
}

/// Plans `vp_id`'s turn with a draw seeded from the snapshot, so an identical
/// snapshot always yields an identical decision.
///
/// # Panics
///
/// Panics when `vp_id` is not in the session roster.
pub fn decide(session: &Session, vp_id: PlayerId, config: &VpConfig) -> Result<VpDecision, DecisionError> {
    let mut rng = decision_rng(session, vp_id);
    decide_with_rng(session, vp_id, config, &mut rng)
}

/// Like [`decide`], drawing the double-action gamble from a caller-owned generator.
pub fn decide_with_rng<R: Rng + ?Sized>(
    session: &Session,
    vp_id: PlayerId,
    config: &VpConfig,
    rng: &mut R,
) -> Result<VpDecision, DecisionError> {
    session.validate()?;
    config.validate()?;
    let vp = roster_entry(session, vp_id);
    if vp.eliminated {
        tracing::debug!(?vp_id, "eliminated virtual player has nothing to decide");
        return Ok(VpDecision::default());
    }

    let scan = scan(session, vp_id);
    let annotated = annotate(session, vp, &scan, config);
    let state = VpState::new(vp, &scan);
    tracing::debug!(
        ?vp_id,
        points = scan.points.len(),
        reachable = annotated.points.iter().filter(|point| point.path.reachable).count(),
        escape = annotated.escape.is_some(),
        health_ratio = state.health_ratio,
        "candidates collected"
    );

    let mut ranked = evaluate(&annotated, &state, config);
    ranked.sort_by(compare_targets);
    for target in &ranked {
        tracing::debug!(
            category = ?target.objective.category(),
            position = ?target.objective.position(),
            cost = target.path.total_cost,
            score = target.priority_score,
            "candidate"
        );
    }

    let Some(winner) = ranked.first().cloned() else {
        tracing::debug!(?vp_id, "no viable target");
        return Ok(VpDecision { target: None, all_evaluated_targets: ranked, use_double_action: false });
    };

    let use_double_action = winner.objective.category() == TargetCategory::FightSanctuary && {
        let draw = unit_draw(rng);
        let gamble = draw < config.fight_sanctuary.double_action_rate;
        tracing::debug!(?vp_id, draw, rate = config.fight_sanctuary.double_action_rate, gamble, "double action draw");
        gamble
    };
    tracing::debug!(
        ?vp_id,
        category = ?winner.objective.category(),
        position = ?winner.objective.position(),
        score = winner.priority_score,
        use_double_action,
        "target selected"
    );

    Ok(VpDecision { target: Some(winner), all_evaluated_targets: ranked, use_double_action })
}

/// Generator `decide` draws from: seeded from the snapshot hash and the VP id.
pub fn decision_rng(session: &Session, vp_id: PlayerId) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(session.snapshot_hash() ^ u64::from(vp_id.0).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn roster_entry(session: &Session, vp_id: PlayerId) -> &Player {
    let Some(vp) = session.player(vp_id) else {
        panic!("virtual player {vp_id:?} is not in the session roster");
    };
    vp
}

fn annotate(session: &Session, vp: &Player, scan: &MapScanResult, config: &VpConfig) -> MapScanWithDistances {
    let points = scan
        .points
        .iter()
        .map(|&poi| {
            let path = match poi.approach {
                Approach::Onto => {
                    find_path(session, vp.position, poi.position, PLANNING_MOVEMENT_BUDGET, vp.actions_remaining)
                }
                Approach::Adjacent => find_path_adjacent(
                    session,
                    vp.position,
                    poi.position,
                    PLANNING_MOVEMENT_BUDGET,
                    vp.actions_remaining,
                ),
            };
            if !path.reachable {
                tracing::trace!(category = ?poi.category, position = ?poi.position, "unreachable");
            }
            PointOfInterestWithPath { poi, path }
        })
        .collect();

    let escape = if config.escape_enabled() {
        let enemies: Vec<Pos> = scan.enemies().map(|enemy| enemy.position).collect();
        find_escape(session, vp, &enemies)
    } else {
        None
    };
    MapScanWithDistances { points, escape }
}

/// Best first: higher score, then category rank, then cheaper path. Equal
/// entries keep their scan order since the sort is stable.
fn compare_targets(a: &EvaluatedTarget, b: &EvaluatedTarget) -> Ordering {
    b.priority_score
        .total_cmp(&a.priority_score)
        .then_with(|| a.objective.category().cmp(&b.objective.category()))
        .then_with(|| a.path.total_cost.cmp(&b.path.total_cost))
}

/// Uniform draw in `[0, 1)` from the top 53 bits of one output word.
fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests;
