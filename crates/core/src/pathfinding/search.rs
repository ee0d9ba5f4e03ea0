//! Arena-backed best-first search shared by every pathfinding entry point.

use std::collections::{BTreeMap, BTreeSet};

use super::{PathAction, PathActionType, PathResult};
use crate::state::{Session, Tile};
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Goal {
    Cell(Pos),
    Adjacent(Pos),
    Exhaustive,
}

impl Goal {
    fn is_reached(self, pos: Pos) -> bool {
        match self {
            Goal::Cell(goal) => pos == goal,
            Goal::Adjacent(target) => manhattan(pos, target) == 1,
            Goal::Exhaustive => false,
        }
    }

    fn distance(self, pos: Pos) -> Option<u32> {
        match self {
            Goal::Cell(goal) => Some(manhattan(pos, goal)),
            Goal::Adjacent(target) => Some(manhattan(pos, target).saturating_sub(1)),
            Goal::Exhaustive => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PathNode {
    position: Pos,
    cost_from_start: u32,
    estimated_cost_to_goal: u32,
    total_cost: u32,
    /// Arena index of the node this one was expanded from.
    parent: Option<usize>,
    action_to_reach: Option<PathAction>,
    /// Action that has to happen before `action_to_reach` (door opening, pad step).
    prelude: Option<PathAction>,
    on_boat: bool,
    actions_used: u32,
}

/// Frontier entry. Equal totals pop in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    total_cost: u32,
    seq: u64,
    node: usize,
}

type StateKey = (Pos, bool, u32);

struct Step {
    position: Pos,
    cost: u32,
    uses_action: bool,
    on_boat: bool,
    prelude: Option<PathAction>,
    action: PathAction,
}

/// Lower bound on the remaining cost. Manhattan distance scaled by the cheapest
/// step the grid offers, and capped by the best route through any teleport pad.
struct Heuristic {
    goal: Goal,
    step_floor: u32,
    pads: Vec<Pos>,
    exit_to_goal: u32,
}

impl Heuristic {
    fn new(session: &Session, goal: Goal) -> Self {
        let step_floor = if session.grid.has_ice() { ICE_COST } else { BASE_COST };
        let pads: Vec<Pos> = session.grid.teleport_pads().into_values().flatten().collect();
        let exit_to_goal =
            pads.iter().filter_map(|&pad| goal.distance(pad)).min().unwrap_or(u32::MAX);
        Self { goal, step_floor, pads, exit_to_goal }
    }

    fn estimate(&self, pos: Pos) -> u32 {
        let Some(direct) = self.goal.distance(pos) else {
            return 0;
        };
        let via_pad = self
            .pads
            .iter()
            .map(|&pad| manhattan(pos, pad))
            .min()
            .map_or(u32::MAX, |to_pad| to_pad.saturating_add(self.exit_to_goal));
        direct.min(via_pad).saturating_mul(self.step_floor)
    }
}

struct Search<'a> {
    session: &'a Session,
    goal: Goal,
    movement_budget: u32,
    action_budget: u32,
    occupied: BTreeSet<Pos>,
    free_boats: BTreeSet<Pos>,
    heuristic: Heuristic,
    nodes: Vec<PathNode>,
    best: BTreeMap<StateKey, u32>,
    open: BTreeSet<OpenEntry>,
    next_seq: u64,
}

pub(super) struct Outcome {
    nodes: Vec<PathNode>,
    found: Option<usize>,
    settled: BTreeMap<Pos, usize>,
}

pub(super) fn run(
    session: &Session,
    origin: Pos,
    goal: Goal,
    movement_budget: u32,
    action_budget: u32,
) -> Outcome {
    assert!(
        session.grid.in_bounds(origin),
        "path origin {origin:?} lies outside the {}x{} grid",
        session.grid.width,
        session.grid.height
    );

    let on_boat = session.player_at(origin).is_some_and(|player| player.on_boat);
    let mut free_boats = session.free_boats();
    if on_boat {
        free_boats.remove(&origin);
    }

    let mut search = Search {
        session,
        goal,
        movement_budget,
        action_budget,
        occupied: session.occupied_cells(origin),
        free_boats,
        heuristic: Heuristic::new(session, goal),
        nodes: Vec::new(),
        best: BTreeMap::new(),
        open: BTreeSet::new(),
        next_seq: 0,
    };
    search.push(PathNode {
        position: origin,
        cost_from_start: 0,
        estimated_cost_to_goal: 0,
        total_cost: 0,
        parent: None,
        action_to_reach: None,
        prelude: None,
        on_boat,
        actions_used: 0,
    });

    let mut settled = BTreeMap::new();
    let mut expanded = 0usize;
    while let Some(entry) = search.open.pop_first() {
        let node = search.nodes[entry.node];
        if search.superseded(&node) {
            continue;
        }
        if goal.is_reached(node.position) {
            tracing::trace!(?origin, ?goal, expanded, cost = node.cost_from_start, "path found");
            return Outcome { nodes: search.nodes, found: Some(entry.node), settled };
        }
        settled.entry(node.position).or_insert(entry.node);
        expanded += 1;

        for step in search.steps_from(&node) {
            let cost = node.cost_from_start.saturating_add(step.cost);
            let actions_used = node.actions_used + u32::from(step.uses_action);
            if cost > search.movement_budget || actions_used > search.action_budget {
                continue;
            }
            search.push(PathNode {
                position: step.position,
                cost_from_start: cost,
                estimated_cost_to_goal: 0,
                total_cost: 0,
                parent: Some(entry.node),
                action_to_reach: Some(step.action),
                prelude: step.prelude,
                on_boat: step.on_boat,
                actions_used,
            });
        }
    }

    if goal != Goal::Exhaustive {
        tracing::trace!(?origin, ?goal, expanded, "frontier exhausted without reaching goal");
    }
    Outcome { nodes: search.nodes, found: None, settled }
}

impl Search<'_> {
    fn push(&mut self, mut node: PathNode) {
        if self.dominated(&node) {
            return;
        }
        node.estimated_cost_to_goal = self.heuristic.estimate(node.position);
        node.total_cost = node.cost_from_start.saturating_add(node.estimated_cost_to_goal);
        self.best.insert((node.position, node.on_boat, node.actions_used), node.cost_from_start);

        let idx = self.nodes.len();
        self.open.insert(OpenEntry { total_cost: node.total_cost, seq: self.next_seq, node: idx });
        self.next_seq += 1;
        self.nodes.push(node);
    }

    /// An equal-or-cheaper arrival with no more actions spent already exists.
    fn dominated(&self, node: &PathNode) -> bool {
        self.best
            .range((node.position, node.on_boat, 0)..=(node.position, node.on_boat, node.actions_used))
            .any(|(_, &cost)| cost <= node.cost_from_start)
    }

    /// A strictly better arrival was recorded after this node entered the frontier.
    fn superseded(&self, node: &PathNode) -> bool {
        self.best
            .range((node.position, node.on_boat, 0)..=(node.position, node.on_boat, node.actions_used))
            .any(|(&(_, _, actions), &cost)| {
                cost < node.cost_from_start
                    || (cost == node.cost_from_start && actions < node.actions_used)
            })
    }

    fn steps_from(&self, node: &PathNode) -> Vec<Step> {
        let mut steps = Vec::with_capacity(4);
        for dir in Orientation::ALL {
            let next = node.position.step(dir);
            if !self.session.grid.in_bounds(next)
                || self.occupied.contains(&next)
                || self.session.is_blocked_by_object(next)
            {
                continue;
            }
            let tile = self.session.grid.tile(next);
            let step = if node.on_boat {
                self.boat_step(next, tile, dir)
            } else {
                self.foot_step(next, tile, dir)
            };
            steps.extend(step);
        }
        steps
    }

    fn boat_step(&self, next: Pos, tile: Tile, dir: Orientation) -> Option<Step> {
        if tile.kind == TileKind::Water {
            if self.free_boats.contains(&next) {
                return None;
            }
            return Some(Step {
                position: next,
                cost: WATER_BOAT_COST,
                uses_action: false,
                on_boat: true,
                prelude: None,
                action: action(PathActionType::Move, Some(dir), next),
            });
        }
        if tile.kind == TileKind::Teleport || !tile.holds_player_on_foot() {
            return None;
        }
        Some(Step {
            position: next,
            cost: tile.kind.foot_cost()?,
            uses_action: true,
            on_boat: false,
            prelude: None,
            action: action(PathActionType::Disembark, Some(dir), next),
        })
    }

    fn foot_step(&self, next: Pos, tile: Tile, dir: Orientation) -> Option<Step> {
        match tile.kind {
            TileKind::Wall => None,
            TileKind::Water => self.free_boats.contains(&next).then(|| Step {
                position: next,
                cost: WATER_BOAT_COST,
                uses_action: true,
                on_boat: true,
                prelude: None,
                action: action(PathActionType::BoardBoat, Some(dir), next),
            }),
            TileKind::Door if !tile.open => Some(Step {
                position: next,
                cost: DOOR_COST,
                uses_action: true,
                on_boat: false,
                prelude: Some(action(PathActionType::OpenDoor, Some(dir), next)),
                action: action(PathActionType::Move, Some(dir), next),
            }),
            TileKind::Teleport => {
                let exit = self.session.grid.teleport_exit(next)?;
                if self.occupied.contains(&exit) || self.session.is_blocked_by_object(exit) {
                    return None;
                }
                Some(Step {
                    position: exit,
                    cost: TELEPORT_PAD_COST,
                    uses_action: false,
                    on_boat: false,
                    prelude: Some(action(PathActionType::Move, Some(dir), next)),
                    action: action(PathActionType::Teleport, None, exit),
                })
            }
            kind => Some(Step {
                position: next,
                cost: kind.foot_cost()?,
                uses_action: false,
                on_boat: false,
                prelude: None,
                action: action(PathActionType::Move, Some(dir), next),
            }),
        }
    }
}

impl Outcome {
    pub(super) fn into_path(self) -> Option<PathResult> {
        self.found.map(|idx| self.path_to(idx))
    }

    pub(super) fn into_destinations(self) -> BTreeMap<Pos, PathResult> {
        self.settled.iter().map(|(&pos, &idx)| (pos, self.path_to(idx))).collect()
    }

    fn path_to(&self, idx: usize) -> PathResult {
        let mut actions = Vec::new();
        let mut cursor = Some(idx);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            actions.extend(node.action_to_reach);
            actions.extend(node.prelude);
            cursor = node.parent;
        }
        actions.reverse();

        let node = &self.nodes[idx];
        PathResult {
            reachable: true,
            total_cost: node.cost_from_start,
            actions_required: node.actions_used,
            actions,
            destination: node.position,
        }
    }
}

const fn action(kind: PathActionType, orientation: Option<Orientation>, position: Pos) -> PathAction {
    PathAction { kind, orientation, position }
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[cfg(test)]
mod tests {
    use std::iter;

    use super::*;
    use crate::state::Grid;

    #[test]
    fn frontier_pops_equal_totals_in_insertion_order() {
        let mut open = BTreeSet::new();
        open.insert(OpenEntry { total_cost: 4, seq: 2, node: 0 });
        open.insert(OpenEntry { total_cost: 4, seq: 1, node: 9 });
        open.insert(OpenEntry { total_cost: 3, seq: 7, node: 5 });
        let order: Vec<usize> = iter::from_fn(|| open.pop_first()).map(|e| e.node).collect();
        assert_eq!(order, vec![5, 9, 0]);
    }

    #[test]
    fn heuristic_drops_to_zero_on_icy_grids() {
        let grid = Grid::from_rows(&["..*", "..."]).expect("rows should parse");
        let session = Session::new(grid);
        let heuristic = Heuristic::new(&session, Goal::Cell(Pos::new(1, 2)));
        assert_eq!(heuristic.estimate(Pos::new(0, 0)), 0);
    }

    #[test]
    fn heuristic_never_overestimates_through_teleports() {
        let grid = Grid::from_rows(&["1.........1."]).expect("rows should parse");
        let session = Session::new(grid);
        let goal = Pos::new(0, 11);
        let heuristic = Heuristic::new(&session, Goal::Cell(goal));
        // Step onto the pad at x=0 from x=1 (cost 1), jump to x=10, walk one tile.
        assert!(heuristic.estimate(Pos::new(0, 1)) <= 2);
        assert_eq!(heuristic.estimate(Pos::new(0, 10)), 1);
    }

    #[test]
    fn search_nodes_record_their_estimates() {
        let session = Session::new(Grid::new(5, 1));
        let outcome = run(&session, Pos::new(0, 0), Goal::Cell(Pos::new(0, 4)), 10, 0);
        let found = outcome.found.expect("goal should be found");
        let node = &outcome.nodes[found];
        assert_eq!(node.estimated_cost_to_goal, 0);
        assert_eq!(node.total_cost, node.cost_from_start);
        assert!(outcome.nodes.iter().all(|n| n.total_cost == n.cost_from_start + n.estimated_cost_to_goal));
    }
}
