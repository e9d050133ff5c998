//! Per-run results — what was changed and what could not be read.

use std::fmt;

use serde::Serialize;

use crate::gcode::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Feed rate rescaled to push the Y-speed out of the window.
    Avoided,
    /// Intended feed rate put back after an earlier avoided move.
    FeedRestored,
}

/// One rewritten line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChange {
    /// 1-based line number.
    pub line: usize,
    pub kind: ChangeKind,
    pub original_y_speed: Option<f64>,
    pub corrected_y_speed: Option<f64>,
    pub old_feed_rate: f64,
    pub new_feed_rate: f64,
    pub old_extrusion: Option<f64>,
    pub new_extrusion: Option<f64>,
}

impl fmt::Display for LineChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.original_y_speed, self.corrected_y_speed) {
            (ChangeKind::Avoided, Some(from), Some(to)) => write!(
                f,
                "line {}: Y-speed {:.2} -> {:.2} mm/s (F{:.1} -> F{:.1})",
                self.line, from, to, self.old_feed_rate, self.new_feed_rate
            ),
            _ => write!(
                f,
                "line {}: feed rate restored F{:.1} -> F{:.1}",
                self.line, self.old_feed_rate, self.new_feed_rate
            ),
        }
    }
}

/// Everything one rewrite pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewriteReport {
    pub lines: usize,
    pub motion_lines: usize,
    pub changes: Vec<LineChange>,
    pub anomalies: Vec<FieldError>,
}

impl RewriteReport {
    pub fn avoided(&self) -> usize {
        self.count(ChangeKind::Avoided)
    }

    pub fn restored(&self) -> usize {
        self.count(ChangeKind::FeedRestored)
    }

    /// True when the program came through byte-for-byte.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} lines, {} moves: {} Y-speed adjustments, {} feed restores, {} field anomalies",
            self.lines,
            self.motion_lines,
            self.avoided(),
            self.restored(),
            self.anomalies.len()
        )
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}
