//! Move kinematics — speed decomposition and the avoidance window.

pub mod window;

pub use window::{AvoidanceWindow, TieBreak};

/// Feed rates are written per minute; speeds are compared per second.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a G-code feed rate (units/min) to a speed (units/s).
pub fn feed_to_speed(feed_rate: f64) -> f64 {
    feed_rate / SECONDS_PER_MINUTE
}

/// Convert a speed (units/s) to a G-code feed rate (units/min).
pub fn speed_to_feed(speed: f64) -> f64 {
    speed * SECONDS_PER_MINUTE
}

/// Y component of a straight move traversed at uniform vector `speed`.
///
/// Returns 0 for a zero-length move.
pub fn y_speed(dx: f64, dy: f64, speed: f64) -> f64 {
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return 0.0;
    }
    speed * (dy.abs() / distance)
}
