// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end planning and show file round trips.

use cueplan_timeline::document::{from_json_str, to_json_string};
use cueplan_timeline::lanes::{conflicts, max_concurrency};
use cueplan_timeline::{
    plan, Activation, Cue, CueId, CueKey, CueType, FirstCuePolicy, PlayBehaviour, Project, ResolveError, Room,
    RoomId, Trigger,
};

fn installation() -> Project {
    let reception = Room::named("Reception")
        .with_cue(Cue::new("welcome", "Welcome", Trigger::AtTime(0.0), 45.0).with_notes("doors open"))
        .with_cue(
            Cue::new("briefing", "Briefing", Trigger::AfterPrevious, 120.0)
                .with_type(CueType::FacilitatorAction)
                .with_activation(Activation::Manual),
        )
        .with_cue(
            Cue::new("hum", "Room hum", Trigger::AtTime(0.0), 165.0)
                .with_play(PlayBehaviour::HoldUntilStopped),
        );

    let path = Room::named("Aljuhfa Path")
        .with_cue(Cue::new("steps", "Footsteps", Trigger::AtTime(0.0), 30.0))
        .with_cue(Cue::new("lights", "Path lights", Trigger::AtTime(10.0), 20.0).with_type(CueType::Lighting))
        .with_cue(Cue::new("door", "Door", Trigger::AfterCue(CueId::new("briefing")), 0.0).with_type(CueType::Mechanical));

    let immersive = Room::named("Immersive Room")
        .with_cue(Cue::new("film", "Film", Trigger::AtTime(0.0), 300.0).with_type(CueType::Projection))
        .with_cue(Cue::new("score", "Score", Trigger::AtTime(0.0), 300.0))
        .with_cue(Cue::new("sting", "Sting", Trigger::AfterCue(CueId::new("film")), 3.0));

    let rest = ["Road to Yemen", "Yemen Market", "Road to North", "Levant Souq", "Fabric Room", "Mecca"]
        .iter()
        .map(|name| Room::named(*name).with_cue(Cue::new("walk", "Walk", Trigger::AtTime(0.0), 60.0)));

    let mut rooms = vec![reception, path, immersive];
    rooms.extend(rest);
    Project::new(rooms).unwrap()
}

#[test]
fn test_installation_plan() {
    let project = installation();
    let plan = plan(&project).unwrap();

    assert_eq!(plan.rooms.len(), 9);
    let reception = plan.room(&RoomId::new("reception")).unwrap();
    assert_eq!(reception.span(), 165.0);
    assert_eq!(reception.lane_count, 2);

    // The door is timed from the reception briefing, in path-local time
    let path = plan.room(&RoomId::new("aljuhfa-path")).unwrap();
    let door = path.cue(&CueId::new("door")).unwrap();
    assert_eq!((door.start, door.end), (165.0, 165.0));
    assert_eq!(path.span(), 165.0);

    let offsets: Vec<f64> = plan.global.rooms.iter().map(|room| room.offset).collect();
    assert_eq!(offsets, vec![0.0, 165.0, 330.0, 633.0, 693.0, 753.0, 813.0, 873.0, 933.0]);
    assert_eq!(plan.total_duration(), 993.0);

    let mecca = plan.global.room(&RoomId::new("mecca")).unwrap();
    assert_eq!(mecca.cues[0].start, 933.0);
}

#[test]
fn test_lanes_never_overlap() {
    let plan = plan(&installation()).unwrap();

    for schedule in &plan.rooms {
        assert_eq!(schedule.lane_count, max_concurrency(&schedule.cues));
        for (i, a) in schedule.cues.iter().enumerate() {
            for b in &schedule.cues[i + 1..] {
                if a.lane == b.lane {
                    assert!(!conflicts(a, b), "{} overlaps {}", a.key(), b.key());
                }
            }
        }
    }
}

#[test]
fn test_cross_room_cycle() {
    let project = Project::new(vec![
        Room::new("a", "A").with_cue(Cue::new("x", "X", Trigger::AfterCue(CueId::new("y")), 1.0)),
        Room::new("b", "B").with_cue(Cue::new("y", "Y", Trigger::AfterCue(CueId::new("x")), 1.0)),
    ])
    .unwrap();

    match plan(&project) {
        Err(ResolveError::Cycle { path }) => {
            assert_eq!(path, vec![CueKey::new("a", "x"), CueKey::new("b", "y")]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_long_chain_resolves() {
    let mut room = Room::new("hall", "Hall").with_cue(Cue::new("c0", "C0", Trigger::AtTime(0.0), 1.0));
    for i in 1..5_000 {
        room = room.with_cue(Cue::new(format!("c{i}"), "C", Trigger::AfterPrevious, 1.0));
    }
    let project = Project::new(vec![room]).unwrap();

    let plan = plan(&project).unwrap();
    assert_eq!(plan.total_duration(), 5_000.0);
    assert_eq!(plan.rooms[0].lane_count, 1);
}

#[test]
fn test_show_file_round_trip() {
    let project = installation();
    let json = to_json_string(&project).unwrap();
    let loaded = from_json_str(&json, FirstCuePolicy::Reject).unwrap();

    assert_eq!(loaded, project);
    assert_eq!(to_json_string(&loaded).unwrap(), json);
}

#[test]
fn test_first_cue_policy_on_load() {
    let json = r#"{ "version": 1, "rooms": [ { "id": "r", "name": "R",
        "cues": [ { "id": "x", "name": "X", "start_mode": "After previous cue", "duration_s": 4.0 } ] } ] }"#;

    assert!(from_json_str(json, FirstCuePolicy::Reject).is_err());

    let project = from_json_str(json, FirstCuePolicy::AnchorAtZero).unwrap();
    let plan = plan(&project).unwrap();
    assert_eq!(plan.rooms[0].cues[0].start, 0.0);
}
