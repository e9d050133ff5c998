//! Machine state carried from line to line during a scan.

use crate::gcode::Fields;

/// Running position and feed rate. Starts at the origin with no feed rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MachineState {
    pub x: f64,
    pub y: f64,
    /// Feed rate the program intends (units/min), as written before any rewrite.
    pub feed_rate: f64,
    /// Feed rate the machine will actually run at after our rewrites.
    pub emitted_feed_rate: f64,
    /// `G91` relative positioning.
    pub relative: bool,
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where a move with these fields ends. Missing axes stay put.
    pub fn target(&self, fields: &Fields) -> (f64, f64) {
        if self.relative {
            (
                self.x + fields.x.unwrap_or(0.0),
                self.y + fields.y.unwrap_or(0.0),
            )
        } else {
            (fields.x.unwrap_or(self.x), fields.y.unwrap_or(self.y))
        }
    }

    pub fn move_to(&mut self, (x, y): (f64, f64)) {
        self.x = x;
        self.y = y;
    }

    /// An F word on the current line: both intent and output follow it.
    pub fn set_feed_rate(&mut self, feed_rate: f64) {
        self.feed_rate = feed_rate;
        self.emitted_feed_rate = feed_rate;
    }

    /// `G92`: redefine the current position without moving.
    ///
    /// A bare `G92` zeroes every axis.
    pub fn set_position(&mut self, fields: &Fields) {
        if fields.x.is_none() && fields.y.is_none() && fields.z.is_none() && fields.e.is_none() {
            self.x = 0.0;
            self.y = 0.0;
            return;
        }
        if let Some(x) = fields.x {
            self.x = x;
        }
        if let Some(y) = fields.y {
            self.y = y;
        }
    }

    /// True when an earlier rewrite left the machine at a different feed rate
    /// than the program expects.
    pub fn feed_diverged(&self) -> bool {
        (self.emitted_feed_rate - self.feed_rate).abs() > 1e-9
    }
}
