//! Resonance-avoidance rewriter — one forward pass over a program.
//!
//! Each move's Y-speed is derived from its displacement and the modal feed
//! rate. Moves whose Y-speed falls in the avoidance window get their feed
//! rate rescaled so the Y-speed lands just outside it, and their extrusion
//! scaled by the inverse factor. Everything else passes through untouched.

pub mod edit;
pub mod report;
pub mod state;

pub use edit::LineEdit;
pub use report::{ChangeKind, LineChange, RewriteReport};
pub use state::MachineState;

use tracing::{debug, info, warn};

use crate::config::AvoidanceConfig;
use crate::error::Result;
use crate::gcode::{parse_line, Command, ParsedLine};
use crate::kinematics::{feed_to_speed, y_speed, AvoidanceWindow};
use crate::program::Program;

/// Rewrites programs against one avoidance window.
#[derive(Debug, Clone)]
pub struct Rewriter {
    window: AvoidanceWindow,
    restore_feed_rate: bool,
    feed_decimals: usize,
    extrusion_decimals: usize,
}

impl Rewriter {
    pub fn new(config: &AvoidanceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: config.window(),
            restore_feed_rate: config.restore_feed_rate,
            feed_decimals: config.feed_decimals,
            extrusion_decimals: config.extrusion_decimals,
        })
    }

    pub fn window(&self) -> &AvoidanceWindow {
        &self.window
    }

    /// Rewrite `program` in place and report what changed.
    pub fn rewrite(&self, program: &mut Program) -> RewriteReport {
        let mut state = MachineState::new();
        let mut report = RewriteReport {
            lines: program.len(),
            ..Default::default()
        };

        for (idx, line) in program.lines_mut().iter_mut().enumerate() {
            let line_no = idx + 1;
            let parsed = parse_line(&line.text, line_no);

            for anomaly in &parsed.anomalies {
                warn!("{anomaly}");
            }
            report.anomalies.extend(parsed.anomalies.iter().cloned());

            let Some(command) = parsed.command() else {
                continue;
            };

            match command {
                Command::Absolute => state.relative = false,
                Command::Relative => state.relative = true,
                Command::SetPosition => state.set_position(&parsed.fields),
                Command::Other => {}
                Command::Linear | Command::Arc => {
                    report.motion_lines += 1;
                    if let Some(text) =
                        self.process_move(command, &parsed, &line.text, &mut state, &mut report)
                    {
                        line.text = text;
                    }
                }
            }
        }

        info!("{}", report.summary());
        report
    }

    /// Convenience for callers holding the program as text.
    pub fn rewrite_str(&self, source: &str) -> (String, RewriteReport) {
        let mut program = Program::parse(source);
        let report = self.rewrite(&mut program);
        (program.to_string(), report)
    }

    fn process_move(
        &self,
        command: Command,
        parsed: &ParsedLine,
        text: &str,
        state: &mut MachineState,
        report: &mut RewriteReport,
    ) -> Option<String> {
        let fields = &parsed.fields;
        if let Some(f) = fields.f {
            state.set_feed_rate(f);
        }

        let target = state.target(fields);
        let (dx, dy) = (target.0 - state.x, target.1 - state.y);
        state.move_to(target);

        if !parsed.anomalies.is_empty() {
            debug!(line = parsed.number, "malformed fields, line left as is");
            return None;
        }

        if command == Command::Linear {
            if let Some(rewritten) = self.avoid(parsed, text, dx, dy, state, report) {
                return Some(rewritten);
            }
        }

        if self.restore_feed_rate && fields.f.is_none() && state.feed_diverged() {
            return Some(self.restore(parsed, text, state, report));
        }

        None
    }

    fn avoid(
        &self,
        parsed: &ParsedLine,
        text: &str,
        dx: f64,
        dy: f64,
        state: &mut MachineState,
        report: &mut RewriteReport,
    ) -> Option<String> {
        let speed = feed_to_speed(state.feed_rate);
        if speed <= 0.0 || (dx == 0.0 && dy == 0.0) {
            return None;
        }

        let original = y_speed(dx, dy, speed);
        let mut ratio = self.window.scale_ratio(original)?;

        let old_feed = state.feed_rate;
        let mut new_feed = round_to(old_feed * ratio, self.feed_decimals);
        if new_feed <= 0.0 {
            // Lower target rounds to a zero feed; go past the upper boundary.
            ratio = (self.window.max + self.window.margin) / original;
            new_feed = round_to(old_feed * ratio, self.feed_decimals);
        }
        if !(new_feed.is_finite() && new_feed > 0.0) {
            debug!(line = parsed.number, "no usable feed rate for Y-speed {original:.4} mm/s");
            return None;
        }
        let corrected = original * ratio;

        let mut edit = LineEdit::new(text, parsed);
        edit.set_word('F', &format!("{:.*}", self.feed_decimals, new_feed));

        let old_extrusion = parsed.fields.e;
        let new_extrusion = old_extrusion.map(|e| {
            let scaled = round_to(e * old_feed / new_feed, self.extrusion_decimals);
            edit.set_word('E', &format!("{:.*}", self.extrusion_decimals, scaled));
            scaled
        });

        edit.annotate(format!(
            "Y-speed adjusted from {original:.2} to {corrected:.2} mm/s"
        ));

        state.emitted_feed_rate = new_feed;

        let line = parsed.number;
        debug!(line, "Y-speed {original:.2} -> {corrected:.2} mm/s");
        report.changes.push(LineChange {
            line,
            kind: ChangeKind::Avoided,
            original_y_speed: Some(original),
            corrected_y_speed: Some(corrected),
            old_feed_rate: old_feed,
            new_feed_rate: new_feed,
            old_extrusion,
            new_extrusion,
        });

        Some(edit.finish())
    }

    fn restore(
        &self,
        parsed: &ParsedLine,
        text: &str,
        state: &mut MachineState,
        report: &mut RewriteReport,
    ) -> String {
        let mut edit = LineEdit::new(text, parsed);
        edit.set_word('F', &format!("{:.*}", self.feed_decimals, state.feed_rate))
            .annotate("feed restored");

        let line = parsed.number;
        debug!(line, "feed rate restored to F{:.1}", state.feed_rate);
        report.changes.push(LineChange {
            line,
            kind: ChangeKind::FeedRestored,
            original_y_speed: None,
            corrected_y_speed: None,
            old_feed_rate: state.emitted_feed_rate,
            new_feed_rate: state.feed_rate,
            old_extrusion: None,
            new_extrusion: None,
        });

        state.emitted_feed_rate = state.feed_rate;
        edit.finish()
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(15) as i32);
    (value * scale).round() / scale
}
