//! Points-of-interest classification for one virtual player.
//! This module exists so candidate discovery stays a pure pass over the snapshot.
//! It does not own path computation or scoring.

use serde::{Deserialize, Serialize};

use crate::state::{Player, Session};
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PoiCategory {
    Enemy,
    HealSanctuary,
    FightSanctuary,
    Boat,
    Flag,
}

/// Where the VP has to stand to interact with a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Approach {
    Onto,
    Adjacent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub category: PoiCategory,
    pub position: Pos,
    /// Enemy player, or the carrier of a flag.
    pub player_id: Option<PlayerId>,
    pub is_held: bool,
    pub approach: Approach,
}

/// Scan output in classification order: enemies, heal sanctuaries, fight
/// sanctuaries, boats, flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapScanResult {
    pub points: Vec<PointOfInterest>,
}

impl MapScanResult {
    pub fn of(&self, category: PoiCategory) -> impl Iterator<Item = &PointOfInterest> {
        self.points.iter().filter(move |point| point.category == category)
    }

    pub fn enemies(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.of(PoiCategory::Enemy)
    }

    pub fn heal_sanctuaries(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.of(PoiCategory::HealSanctuary)
    }

    pub fn fight_sanctuaries(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.of(PoiCategory::FightSanctuary)
    }

    pub fn boats(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.of(PoiCategory::Boat)
    }

    pub fn flags(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.of(PoiCategory::Flag)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Classifies everything `vp_id` might want to reach.
///
/// # Panics
///
/// Panics when `vp_id` is not in the session roster.
pub fn scan(session: &Session, vp_id: PlayerId) -> MapScanResult {
    let Some(vp) = session.player(vp_id) else {
        panic!("virtual player {vp_id:?} is not in the session roster");
    };
    let capture_the_flag = session.mode == GameMode::CaptureTheFlag;

    let mut points: Vec<PointOfInterest> = session
        .active_players()
        .filter(|other| other.id != vp.id && !(capture_the_flag && are_allies(vp, other)))
        .map(|enemy| PointOfInterest {
            category: PoiCategory::Enemy,
            position: enemy.position,
            player_id: Some(enemy.id),
            is_held: false,
            approach: Approach::Adjacent,
        })
        .collect();

    for (kind, category, approach) in [
        (ObjectKind::HealSanctuary, PoiCategory::HealSanctuary, Approach::Adjacent),
        (ObjectKind::FightSanctuary, PoiCategory::FightSanctuary, Approach::Adjacent),
        (ObjectKind::Boat, PoiCategory::Boat, Approach::Onto),
    ] {
        points.extend(session.objects_of(kind).map(|object| PointOfInterest {
            category,
            position: object.position,
            player_id: None,
            is_held: object.held_by.is_some(),
            approach,
        }));
    }

    if capture_the_flag {
        for flag in session.objects_of(ObjectKind::Flag) {
            let point = match flag.held_by {
                None => Some(ground_flag(flag.position)),
                Some(carrier) if carrier == vp.id => vp.start_position.map(|base| PointOfInterest {
                    category: PoiCategory::Flag,
                    position: base,
                    player_id: Some(vp.id),
                    is_held: true,
                    approach: Approach::Onto,
                }),
                Some(carrier) => match session.active_players().find(|player| player.id == carrier) {
                    Some(carrier) if are_allies(vp, carrier) => None,
                    Some(carrier) => Some(PointOfInterest {
                        category: PoiCategory::Flag,
                        position: carrier.position,
                        player_id: Some(carrier.id),
                        is_held: true,
                        approach: Approach::Adjacent,
                    }),
                    // Carrier left the board; the flag lies where it was dropped.
                    None => Some(ground_flag(flag.position)),
                },
            };
            points.extend(point);
        }
    }

    tracing::trace!(?vp_id, points = points.len(), "map scanned");
    MapScanResult { points }
}

fn ground_flag(position: Pos) -> PointOfInterest {
    PointOfInterest { category: PoiCategory::Flag, position, player_id: None, is_held: false, approach: Approach::Onto }
}

fn are_allies(a: &Player, b: &Player) -> bool {
    a.team.is_some() && a.team == b.team
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PlacedObject;
    use crate::test_support::*;

    #[test]
    fn classification_follows_category_order() {
        let mut session = open_arena(6, 6);
        add_object(&mut session, ObjectKind::Boat, Pos::new(5, 5));
        add_object(&mut session, ObjectKind::FightSanctuary, Pos::new(0, 5));
        add_object(&mut session, ObjectKind::HealSanctuary, Pos::new(0, 3));
        let vp = add_player(&mut session, 1, Pos::new(2, 2));
        add_player(&mut session, 2, Pos::new(4, 4));

        let scan = scan(&session, vp);
        let categories: Vec<_> = scan.points.iter().map(|point| point.category).collect();
        assert_eq!(
            categories,
            vec![PoiCategory::Enemy, PoiCategory::HealSanctuary, PoiCategory::FightSanctuary, PoiCategory::Boat]
        );
        assert_eq!(scan.enemies().next().and_then(|enemy| enemy.player_id), Some(PlayerId(2)));
        assert_eq!(scan.boats().next().map(|boat| boat.approach), Some(Approach::Onto));
    }

    #[test]
    fn eliminated_and_off_grid_players_are_not_enemies() {
        let mut session = open_arena(4, 4);
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        let gone = add_player(&mut session, 2, Pos::new(1, 1));
        player_mut(&mut session, gone).eliminated = true;
        let lost = add_player(&mut session, 3, Pos::new(2, 2));
        player_mut(&mut session, lost).position = Pos::new(9, 9);

        assert!(scan(&session, vp).is_empty());
    }

    #[test]
    fn flags_are_ignored_outside_capture_the_flag() {
        let mut session = open_arena(4, 4);
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        add_object(&mut session, ObjectKind::Flag, Pos::new(3, 3));
        assert_eq!(scan(&session, vp).flags().count(), 0);

        session.mode = GameMode::CaptureTheFlag;
        let flags: Vec<_> = scan(&session, vp).flags().copied().collect();
        assert_eq!(flags, vec![ground_flag(Pos::new(3, 3))]);
    }

    #[test]
    fn capture_the_flag_excludes_allies_and_tracks_carriers() {
        let mut session = open_arena(6, 6);
        session.mode = GameMode::CaptureTheFlag;
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        let ally = add_player(&mut session, 2, Pos::new(1, 0));
        let rival = add_player(&mut session, 3, Pos::new(4, 4));
        player_mut(&mut session, vp).team = Some(Team(0));
        player_mut(&mut session, ally).team = Some(Team(0));
        player_mut(&mut session, rival).team = Some(Team(1));

        session.objects.push(PlacedObject { kind: ObjectKind::Flag, position: Pos::new(4, 4), held_by: Some(rival) });
        session.objects.push(PlacedObject { kind: ObjectKind::Flag, position: Pos::new(1, 0), held_by: Some(ally) });

        let scan = scan(&session, vp);
        let enemies: Vec<_> = scan.enemies().filter_map(|enemy| enemy.player_id).collect();
        assert_eq!(enemies, vec![rival]);

        let flags: Vec<_> = scan.flags().collect();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].player_id, Some(rival));
        assert!(flags[0].is_held);
        assert_eq!(flags[0].approach, Approach::Adjacent);
    }

    #[test]
    fn carried_flag_points_back_to_base() {
        let mut session = open_arena(6, 6);
        session.mode = GameMode::CaptureTheFlag;
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        player_mut(&mut session, vp).position = Pos::new(5, 5);
        session.objects.push(PlacedObject { kind: ObjectKind::Flag, position: Pos::new(5, 5), held_by: Some(vp) });

        let flag = *scan(&session, vp).flags().next().expect("carried flag should be scanned");
        assert_eq!(flag.position, Pos::new(0, 0));
        assert_eq!(flag.approach, Approach::Onto);
        assert!(flag.is_held);
    }

    #[test]
    fn held_objects_keep_their_flag() {
        let mut session = open_arena(4, 4);
        let vp = add_player(&mut session, 1, Pos::new(0, 0));
        session.objects.push(PlacedObject {
            kind: ObjectKind::HealSanctuary,
            position: Pos::new(3, 3),
            held_by: Some(PlayerId(8)),
        });
        assert!(scan(&session, vp).heal_sanctuaries().all(|point| point.is_held));
    }

    #[test]
    #[should_panic(expected = "not in the session roster")]
    fn unknown_vp_panics() {
        let session = open_arena(3, 3);
        let _ = scan(&session, PlayerId(4));
    }
}
