//! Avoidance window — the Y-speed band that moves are pushed out of.

use serde::{Deserialize, Serialize};

/// Which boundary wins when a speed sits exactly in the middle of the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    #[default]
    Lower,
    Upper,
}

/// Inclusive `[min, max]` band of forbidden Y-speeds (units/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceWindow {
    pub min: f64,
    pub max: f64,
    /// How far past the chosen boundary a corrected speed lands.
    pub margin: f64,
    pub tie_break: TieBreak,
}

impl AvoidanceWindow {
    pub fn new(min: f64, max: f64, margin: f64, tie_break: TieBreak) -> Self {
        Self {
            min,
            max,
            margin,
            tie_break,
        }
    }

    pub fn contains(&self, speed: f64) -> bool {
        self.min <= speed && speed <= self.max
    }

    /// The corrected Y-speed for `speed`, or `None` when it is already outside.
    ///
    /// The nearer boundary is chosen and the result lands `margin` past it. A
    /// lower target that would not be a positive speed falls back to the
    /// upper boundary.
    pub fn resolve(&self, speed: f64) -> Option<f64> {
        if !self.contains(speed) {
            return None;
        }

        let to_min = speed - self.min;
        let to_max = self.max - speed;
        let go_lower = match self.tie_break {
            TieBreak::Lower => to_min <= to_max,
            TieBreak::Upper => to_min < to_max,
        };

        let below = self.min - self.margin;
        let above = self.max + self.margin;
        if go_lower && below > 0.0 {
            Some(below)
        } else {
            Some(above)
        }
    }

    /// Factor to apply to the whole feed rate so the Y-speed leaves the band.
    ///
    /// `None` when no correction applies, including a zero Y-speed which
    /// cannot be scaled.
    pub fn scale_ratio(&self, speed: f64) -> Option<f64> {
        if speed <= 0.0 {
            return None;
        }
        self.resolve(speed).map(|target| target / speed)
    }
}

impl Default for AvoidanceWindow {
    fn default() -> Self {
        Self::new(90.0, 110.0, 1.0, TieBreak::Lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn window(min: f64, max: f64) -> AvoidanceWindow {
        AvoidanceWindow::new(min, max, 1.0, TieBreak::Lower)
    }

    #[test]
    fn outside_speeds_are_untouched() {
        let w = window(90.0, 110.0);
        assert_eq!(w.resolve(89.99), None);
        assert_eq!(w.resolve(110.01), None);
        assert_eq!(w.resolve(0.0), None);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let w = window(90.0, 110.0);
        assert_eq!(w.resolve(90.0), Some(89.0));
        assert_eq!(w.resolve(110.0), Some(111.0));
    }

    #[test]
    fn nearer_boundary_wins() {
        let w = window(90.0, 110.0);
        assert_eq!(w.resolve(95.0), Some(89.0));
        assert_eq!(w.resolve(105.0), Some(111.0));
    }

    #[test]
    fn tie_goes_lower_by_default() {
        let w = window(90.0, 110.0);
        let corrected = w.resolve(100.0).unwrap();
        assert!(corrected < 90.0);
    }

    #[test]
    fn tie_goes_upper_when_configured() {
        let w = AvoidanceWindow::new(90.0, 110.0, 1.0, TieBreak::Upper);
        assert_eq!(w.resolve(100.0), Some(111.0));
        assert_eq!(w.resolve(99.0), Some(89.0));
    }

    #[test]
    fn custom_margin() {
        let w = AvoidanceWindow::new(90.0, 110.0, 0.1, TieBreak::Lower);
        assert_approx_eq!(w.resolve(91.0).unwrap(), 89.9, 1e-12);
        assert_approx_eq!(w.resolve(109.0).unwrap(), 110.1, 1e-12);
    }

    #[test]
    fn non_positive_lower_target_falls_back_up() {
        let w = window(0.5, 20.0);
        assert_eq!(w.resolve(1.0), Some(21.0));
    }

    #[test]
    fn corrected_speed_is_outside() {
        let w = window(90.0, 110.0);
        let mut s = 90.0;
        while s <= 110.0 {
            let corrected = w.resolve(s).unwrap();
            assert!(!w.contains(corrected), "{s} -> {corrected}");
            s += 0.25;
        }
    }

    #[test]
    fn ratio_scales_to_target() {
        let w = window(90.0, 100.0);
        assert_approx_eq!(w.scale_ratio(100.0).unwrap(), 1.01, 1e-12);
        assert_approx_eq!(w.scale_ratio(92.0).unwrap(), 89.0 / 92.0, 1e-12);
        assert_eq!(w.scale_ratio(80.0), None);
    }

    #[test]
    fn zero_speed_has_no_ratio() {
        let w = window(0.0, 10.0);
        assert_eq!(w.scale_ratio(0.0), None);
    }
}
