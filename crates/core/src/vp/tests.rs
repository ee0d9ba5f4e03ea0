use super::*;
use crate::error::{ConfigError, SessionError};
use crate::pathfinding::{PathActionType, PathResult};
use crate::test_support::*;

fn target(category: PoiCategory, cost: u32, score: f64, x: i32) -> EvaluatedTarget {
    let position = Pos::new(0, x);
    EvaluatedTarget {
        objective: Objective::Point(PointOfInterest {
            category,
            position,
            player_id: None,
            is_held: false,
            approach: Approach::Adjacent,
        }),
        path: PathResult { reachable: true, total_cost: cost, actions_required: 0, actions: Vec::new(), destination: position },
        priority_score: score,
    }
}

fn sanctuary_session() -> (Session, PlayerId) {
    let mut session = open_arena(5, 5);
    let vp = add_player(&mut session, 1, Pos::new(0, 0));
    add_object(&mut session, ObjectKind::FightSanctuary, Pos::new(0, 2));
    (session, vp)
}

#[test]
fn ties_fall_back_to_category_then_cost_then_scan_order() {
    let mut ranked = vec![
        target(PoiCategory::Boat, 1, 50.0, 0),
        target(PoiCategory::Flag, 3, 50.0, 1),
        target(PoiCategory::Enemy, 5, 50.0, 2),
        target(PoiCategory::Flag, 2, 50.0, 3),
        target(PoiCategory::Flag, 2, 50.0, 4),
        target(PoiCategory::HealSanctuary, 9, 51.0, 5),
    ];
    ranked.sort_by(compare_targets);
    let order: Vec<i32> = ranked.iter().map(|target| target.objective.position().x).collect();
    assert_eq!(order, vec![5, 2, 3, 4, 1, 0]);
}

#[test]
fn escape_loses_every_exact_tie() {
    let escape = EvaluatedTarget {
        objective: Objective::Escape { position: Pos::new(1, 1), nearest_enemy_distance: 3 },
        path: PathResult::stay(Pos::new(1, 1)),
        priority_score: 20.0,
    };
    let boat = target(PoiCategory::Boat, 4, 20.0, 0);
    assert_eq!(compare_targets(&boat, &escape), Ordering::Less);
}

#[test]
fn lone_vp_has_nothing_to_do() {
    let mut session = open_arena(4, 4);
    let vp = add_player(&mut session, 1, Pos::new(1, 1));
    for config in [VpConfig::offensive(), VpConfig::defensive()] {
        let decision = decide(&session, vp, &config).expect("snapshot is valid");
        assert_eq!(decision, VpDecision::default());
        assert!(decision.actions().is_empty());
    }
}

#[test]
fn unreachable_points_are_excluded() {
    let mut session = session_from_rows(&["..#..", "..#.."]);
    let vp = add_player(&mut session, 1, Pos::new(0, 0));
    add_player(&mut session, 2, Pos::new(1, 4));
    add_object(&mut session, ObjectKind::HealSanctuary, Pos::new(0, 4));

    let decision = decide(&session, vp, &VpConfig::offensive()).expect("snapshot is valid");
    assert!(decision.target.is_none());
    assert!(decision.all_evaluated_targets.is_empty());
    assert!(!decision.use_double_action);
}

#[test]
fn fight_sanctuary_winner_draws_the_double_action() {
    let (session, vp) = sanctuary_session();

    let mut config = VpConfig::offensive();
    config.fight_sanctuary.double_action_rate = 1.0;
    let decision = decide(&session, vp, &config).expect("snapshot is valid");
    let winner = decision.target.as_ref().expect("sanctuary should win");
    assert_eq!(winner.objective.category(), TargetCategory::FightSanctuary);
    assert_eq!(winner.path.total_cost, 1);
    assert_eq!(winner.priority_score, 77.0);
    assert!(decision.use_double_action);

    config.fight_sanctuary.double_action_rate = 0.0;
    assert!(!decide(&session, vp, &config).expect("snapshot is valid").use_double_action);
}

#[test]
fn other_winners_never_gamble() {
    let (mut session, vp) = sanctuary_session();
    add_player(&mut session, 2, Pos::new(1, 0));
    let mut config = VpConfig::offensive();
    config.fight_sanctuary.double_action_rate = 1.0;

    let decision = decide(&session, vp, &config).expect("snapshot is valid");
    assert_eq!(decision.target.as_ref().map(|t| t.objective.category()), Some(TargetCategory::Enemy));
    assert!(!decision.use_double_action);
    assert_eq!(decision.all_evaluated_targets.len(), 2);
}

#[test]
fn decisions_are_repeatable_and_leave_the_snapshot_alone() {
    let (mut session, vp) = sanctuary_session();
    add_player(&mut session, 2, Pos::new(4, 4));
    let before = session.clone();
    let first = decide(&session, vp, &VpConfig::defensive()).expect("snapshot is valid");
    let second = decide(&session, vp, &VpConfig::defensive()).expect("snapshot is valid");
    assert_eq!(first, second);
    assert_eq!(session, before);
}

#[test]
fn turn_actions_trim_the_plan_to_this_turn() {
    let mut session = open_arena(8, 1);
    let vp = add_player(&mut session, 1, Pos::new(0, 0));
    player_mut(&mut session, vp).movement_points = 2;
    add_player(&mut session, 2, Pos::new(0, 7));

    let decision = decide(&session, vp, &VpConfig::offensive()).expect("snapshot is valid");
    assert_eq!(decision.actions().len(), 6);
    let now = decision.turn_actions(&session, vp).expect("plan is still valid");
    assert_eq!(now.len(), 2);
    assert!(now.iter().all(|action| action.kind == PathActionType::Move));

    add_player(&mut session, 3, Pos::new(0, 3));
    assert!(matches!(decision.turn_actions(&session, vp), Err(ReplayError::Occupied { index: 2, .. })));
}

#[test]
fn inconsistent_snapshots_are_reported() {
    let mut session = open_arena(4, 4);
    let vp = add_player(&mut session, 1, Pos::new(0, 0));
    add_player(&mut session, 1, Pos::new(2, 2));
    assert!(matches!(
        decide(&session, vp, &VpConfig::offensive()),
        Err(DecisionError::Session(SessionError::DuplicatePlayer(PlayerId(1))))
    ));
}

#[test]
fn malformed_profiles_are_reported() {
    let (session, vp) = sanctuary_session();
    let mut config = VpConfig::offensive();
    config.priorities.fight_sanctuary = f64::NAN;
    assert!(matches!(
        decide(&session, vp, &config),
        Err(DecisionError::Config(ConfigError::OutOfRange { field: "priorities.fight_sanctuary", .. }))
    ));
}

#[test]
fn eliminated_vp_passes() {
    let (mut session, vp) = sanctuary_session();
    player_mut(&mut session, vp).eliminated = true;
    let decision = decide(&session, vp, &VpConfig::offensive()).expect("eliminated VP still decides");
    assert_eq!(decision, VpDecision::default());
}

#[test]
#[should_panic(expected = "not in the session roster")]
fn missing_vp_panics() {
    let session = open_arena(3, 3);
    let _ = decide(&session, PlayerId(42), &VpConfig::offensive());
}

#[test]
fn unit_draw_stays_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..1_000 {
        let draw = unit_draw(&mut rng);
        assert!((0.0..1.0).contains(&draw));
    }
}
