// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plain-text show reports.

use crate::settings::{ReportSettings, TimeFormat};
use cueplan_timeline::summary::{Breakdown, Tally};
use cueplan_timeline::{
    Activation, CueType, PlayBehaviour, ResolvedCue, RoomSchedule, ShowSummary, TimelinePlan, Trigger, TriggerKind,
};
use std::fmt::Write as _;

const RULE_WIDTH: usize = 72;

/// Clock reading for a number of seconds: `H:MM:SS` from one hour, else `MM:SS`
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// A time as configured for reports
pub fn format_time(seconds: f64, format: TimeFormat) -> String {
    match format {
        TimeFormat::Seconds => format!("{seconds:.1} s"),
        TimeFormat::Clock => format!("{seconds:.1} s ({})", format_seconds(seconds)),
    }
}

fn start_rule(cue: &ResolvedCue) -> String {
    match &cue.cue.trigger {
        Trigger::AtTime(_) => "fixed time".to_string(),
        Trigger::AfterPrevious => "after the previous cue".to_string(),
        Trigger::AfterCue(target) => format!("after cue {target}"),
    }
}

fn push_tallies<K>(out: &mut String, title: &str, tallies: impl Iterator<Item = (K, Tally)>, name: fn(&K) -> &'static str) {
    let _ = writeln!(out, "{title}");
    let mut any = false;
    for (key, tally) in tallies {
        any = true;
        let _ = writeln!(
            out,
            "  - {}: {} cue(s), total {:.1} s, average {:.1} s",
            name(&key),
            tally.count,
            tally.total_duration,
            tally.average()
        );
    }
    if !any {
        let _ = writeln!(out, "  (none)");
    }
}

fn push_breakdown(out: &mut String, breakdown: &Breakdown) {
    push_tallies(
        out,
        "By cue type:",
        breakdown.by_type.iter().map(|(k, v)| (*k, *v)),
        CueType::name,
    );
    push_tallies(
        out,
        "By activation:",
        breakdown.by_activation.iter().map(|(k, v)| (*k, *v)),
        Activation::name,
    );
    push_tallies(
        out,
        "By playback:",
        breakdown.by_play.iter().map(|(k, v)| (*k, *v)),
        PlayBehaviour::name,
    );
    push_tallies(
        out,
        "By start rule:",
        breakdown.by_trigger.iter().map(|(k, v)| (*k, *v)),
        TriggerKind::name,
    );
}

/// Per-room cue table with lanes
pub fn schedule_table(schedule: &RoomSchedule, format: TimeFormat) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}]: span {}, {} lane(s)",
        schedule.name,
        schedule.room,
        format_time(schedule.span(), format),
        schedule.lane_count
    );
    for cue in schedule.by_start() {
        let _ = writeln!(
            out,
            "  lane {:>2}  {:>10.1} -> {:>10.1}  {} ({}, {})",
            cue.lane.map_or_else(|| "-".to_string(), |lane| lane.to_string()),
            cue.start,
            cue.end,
            cue.cue.name,
            cue.cue.cue_type,
            start_rule(cue)
        );
    }
    out
}

/// Full show report
pub fn build_report(plan: &TimelinePlan, settings: &ReportSettings) -> String {
    let summary = ShowSummary::from_plan(plan);
    let format = settings.time_format;
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "SHOW SUMMARY\n{rule}\n");
    let _ = writeln!(out, "Rooms: {}", summary.room_count);
    let _ = writeln!(out, "Cues:  {}", summary.cue_count);
    let _ = writeln!(out, "Cue time, all rooms: {}", format_time(summary.total_cue_time, format));
    let _ = writeln!(out, "Show length:         {}\n", format_time(summary.show_duration, format));
    push_breakdown(&mut out, &summary.breakdown);

    let _ = writeln!(out, "\nROOMS\n{rule}");
    for room in &summary.rooms {
        let _ = writeln!(out, "\n{} [{}]\n{thin}", room.name, room.room);
        let _ = writeln!(out, "Cues: {}, lanes: {}", room.cue_count, room.lane_count);
        let _ = writeln!(out, "Span: {}", format_time(room.span, format));
        push_breakdown(&mut out, &room.breakdown);

        let _ = writeln!(out, "Notes:");
        if room.notes.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for note in &room.notes {
            let _ = writeln!(out, "  - at {}, {}: {}", format_time(note.start, format), note.cue_name, note.note);
        }

        let _ = writeln!(out, "Timeline (room time):");
        if room.timeline.is_empty() {
            let _ = writeln!(out, "  (no cues)");
        }
        for cue in &room.timeline {
            let _ = writeln!(
                out,
                "  - {} for {}: {} [{}], {}, {}, {}",
                format_time(cue.start, format),
                format_time(cue.duration(), format),
                cue.cue.name,
                cue.cue.cue_type,
                cue.cue.activation.name(),
                cue.cue.play.name(),
                start_rule(cue)
            );
        }
    }

    if settings.include_global_timeline {
        let _ = writeln!(out, "\nGLOBAL TIMELINE\n{rule}");
        let mut cues: Vec<(&str, &ResolvedCue)> = plan
            .global
            .rooms
            .iter()
            .flat_map(|room| room.cues.iter().map(move |cue| (room.name.as_str(), cue)))
            .collect();
        cues.sort_by(|a, b| a.1.start.total_cmp(&b.1.start));

        if cues.is_empty() {
            let _ = writeln!(out, "No cues in any room.");
        }
        for (room, cue) in cues {
            let _ = writeln!(
                out,
                "- {}  {}: {} for {}",
                format_time(cue.start, format),
                room,
                cue.cue.name,
                format_time(cue.duration(), format)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cueplan_timeline::{plan, Cue, Project, Room};

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00");
        assert_eq!(format_seconds(95.4), "01:35");
        assert_eq!(format_seconds(3599.6), "1:00:00");
        assert_eq!(format_seconds(3725.0), "1:02:05");
        assert_eq!(format_time(95.0, TimeFormat::Seconds), "95.0 s");
        assert_eq!(format_time(95.0, TimeFormat::Clock), "95.0 s (01:35)");
    }

    #[test]
    fn test_report_sections() {
        let project = Project::new(vec![
            Room::named("Reception")
                .with_cue(Cue::new("hi", "Welcome", Trigger::AtTime(0.0), 30.0).with_notes("smile")),
            Room::named("Mecca"),
        ])
        .unwrap();
        let plan = plan(&project).unwrap();

        let report = build_report(&plan, &ReportSettings::default());
        assert!(report.contains("Rooms: 2"));
        assert!(report.contains("Show length:         30.0 s (00:30)"));
        assert!(report.contains("  - at 0.0 s (00:00), Welcome: smile"));
        assert!(report.contains("GLOBAL TIMELINE"));

        let settings = ReportSettings {
            time_format: TimeFormat::Seconds,
            include_global_timeline: false,
        };
        let report = build_report(&plan, &settings);
        assert!(!report.contains("GLOBAL TIMELINE"));
        assert!(report.contains("Span: 0.0 s"));
    }

    #[test]
    fn test_schedule_table_lists_lanes() {
        let project = Project::new(vec![Room::new("hall", "Hall")
            .with_cue(Cue::new("a", "A", Trigger::AtTime(0.0), 10.0))
            .with_cue(Cue::new("b", "B", Trigger::AtTime(5.0), 10.0))])
        .unwrap();
        let plan = plan(&project).unwrap();

        let table = schedule_table(&plan.rooms[0], TimeFormat::Seconds);
        assert!(table.starts_with("Hall [hall]: span 15.0 s, 2 lane(s)"));
        assert!(table.contains("lane  1"));
    }
}
