//! Avoidance pipeline integration tests — G-code text → rewriter → G-code text.

use assert_approx_eq::assert_approx_eq;
use yband::gcode::parse_line;
use yband::kinematics::{feed_to_speed, y_speed};
use yband::rewrite::ChangeKind;
use yband::{AvoidanceConfig, Rewriter};

const SLICED: &str = "\
; generated by a slicer
G90
M83
G28
G1 Z0.2 F1200
G1 X10 Y10 F6000
G1 X10 Y20 E0.42
G1 X20 Y20 E0.42
G1 X20 Y30 E0.42 ; wall
G1 X25 Y40 E0.5
G0 X0 Y0 F9000
G1 X0 Y5.5 F5700
M84
";

fn rewriter(min: f64, max: f64) -> Rewriter {
    Rewriter::new(&AvoidanceConfig {
        min,
        max,
        ..Default::default()
    })
    .expect("valid config")
}

/// Y-speed of every G0/G1 move in `source`, computed independently.
fn move_y_speeds(source: &str) -> Vec<(usize, f64)> {
    let (mut x, mut y, mut feed) = (0.0, 0.0, 0.0);
    let mut speeds = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        let line = parse_line(text, idx + 1);
        if line.command() != Some(yband::gcode::Command::Linear) {
            continue;
        }
        if let Some(f) = line.fields.f {
            feed = f;
        }
        let nx = line.fields.x.unwrap_or(x);
        let ny = line.fields.y.unwrap_or(y);
        if feed > 0.0 && (nx != x || ny != y) {
            speeds.push((idx + 1, y_speed(nx - x, ny - y, feed_to_speed(feed))));
        }
        x = nx;
        y = ny;
    }
    speeds
}

#[test]
fn no_move_stays_in_window() {
    let rw = rewriter(90.0, 110.0);
    let (out, report) = rw.rewrite_str(SLICED);
    assert!(report.avoided() > 0);

    for (line, speed) in move_y_speeds(&out) {
        assert!(
            !rw.window().contains(speed),
            "line {line} still at {speed:.3} mm/s"
        );
    }
}

#[test]
fn rewriting_twice_changes_nothing() {
    let rw = rewriter(90.0, 110.0);
    let (first, _) = rw.rewrite_str(SLICED);
    let (second, report) = rw.rewrite_str(&first);
    assert!(report.is_unchanged(), "{:?}", report.changes);
    assert_eq!(first, second);
}

#[test]
fn untouched_lines_pass_through() {
    let (out, report) = rewriter(90.0, 110.0).rewrite_str(SLICED);
    let changed: Vec<usize> = report.changes.iter().map(|c| c.line).collect();
    for (idx, (before, after)) in SLICED.lines().zip(out.lines()).enumerate() {
        if !changed.contains(&(idx + 1)) {
            assert_eq!(before, after, "line {}", idx + 1);
        }
    }
    assert_eq!(SLICED.lines().count(), out.lines().count());
}

#[test]
fn extrusion_rate_is_conserved() {
    let (_, report) = rewriter(90.0, 110.0).rewrite_str(SLICED);
    let with_e: Vec<_> = report
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Avoided && c.old_extrusion.is_some())
        .collect();
    assert!(!with_e.is_empty());
    for change in with_e {
        let old = change.old_extrusion.unwrap() * change.old_feed_rate;
        let new = change.new_extrusion.unwrap() * change.new_feed_rate;
        assert_approx_eq!(old, new, 0.05);
    }
}

#[test]
fn concrete_diagonal_scenario() {
    let src = "G1 X10 Y10 F6000\n";
    let (out, report) = rewriter(90.0, 100.0).rewrite_str(src);
    assert_eq!(out, src);
    assert!(report.is_unchanged());
}

#[test]
fn concrete_pure_y_scenario() {
    let (out, report) = rewriter(90.0, 100.0).rewrite_str("G1 X0 Y10 E1.0 F6000\n");
    assert_eq!(report.avoided(), 1);
    let change = &report.changes[0];
    assert_approx_eq!(change.original_y_speed.unwrap(), 100.0, 1e-9);
    assert!(change.corrected_y_speed.unwrap() > 100.0);
    assert!(change.new_extrusion.unwrap() < 1.0);
    assert!(out.contains("; Y-speed adjusted from 100.00 to 101.00 mm/s"));
}

#[test]
fn comments_and_other_commands_pass_through() {
    let src = "; layer 1\nG28\n";
    let (out, report) = rewriter(0.0, 1000.0).rewrite_str(src);
    assert_eq!(out, src);
    assert_eq!(report.motion_lines, 0);
    assert_eq!(report.lines, 2);
}

#[test]
fn anomalies_are_reported_not_fatal() {
    let src = "G1 F6000\nG1 X0 Y10 E--1\nG1 Y20\n";
    let (out, report) = rewriter(90.0, 110.0).rewrite_str(src);
    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].line, 2);
    assert!(out.contains("G1 X0 Y10 E--1\n"));
    assert_eq!(report.avoided(), 1);
    assert_eq!(report.changes[0].line, 3);
}
