//! Planets Arcade - entity, path and collision core for a 2D arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paths, collisions, entity lifecycle)
//! - `settings`: Injected immutable configuration
//! - `telemetry`: Fire-and-forget background event logging
//! - `error`: Startup/configuration errors

pub mod error;
pub mod settings;
pub mod sim;
pub mod telemetry;

pub use error::{Result, SimError};
pub use settings::Settings;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Milliseconds before the first UFO may appear
    pub const FIRST_UFO_TICK_MS: i64 = 1500;
    /// Base delay between UFO spawns
    pub const UFO_SPAWN_BASE_MS: i64 = 5000;
    /// Random extra delay added to the base spawn delay, `[0, jitter)`
    pub const UFO_SPAWN_JITTER_MS: i64 = 5000;
    /// Fraction of the field edge a UFO may start from
    pub const UFO_EDGE_SCALE: f64 = 0.8;
    /// UFO axis speed is `UFO_MIN_SPEED + UFO_SPEED_RANGE * rand` (pixels/ms)
    pub const UFO_MIN_SPEED: f64 = 0.05;
    pub const UFO_SPEED_RANGE: f64 = 0.1;

    /// Delay before a destroyed fighter is replaced
    pub const RESPAWN_DELAY_MS: i64 = 3000;

    /// Control path defaults
    pub const CONTROL_REACTION_MS: i64 = 20;
    /// Pixels per second while a direction is held
    pub const CONTROL_SPEED: f64 = 400.0;
    /// Fighter starts this far above the bottom edge
    pub const CONTROL_START_OFFSET: f64 = 200.0;
    /// Margin kept between the fighter and the side edges
    pub const CONTROL_SIDE_MARGIN: f64 = 5.0;
    /// How far the fighter may advance up the field from its start row
    pub const CONTROL_FORWARD_RANGE: f64 = 400.0;
    /// How far the fighter may retreat below its start row
    pub const CONTROL_BACKWARD_RANGE: f64 = 100.0;
}

/// Point on an ellipse with semi-axes `a`, `b` around `center`
#[inline]
pub fn ellipse_point(center: DVec2, a: f64, b: f64, theta: f64) -> DVec2 {
    DVec2::new(center.x + a * theta.cos(), center.y + b * theta.sin())
}

/// Offset that centers a `child` box of the given size on a `parent` box
#[inline]
pub fn centering_offset(parent: DVec2, child: DVec2) -> DVec2 {
    (parent - child) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_point_axes() {
        let p = ellipse_point(DVec2::new(10.0, 20.0), 5.0, 3.0, 0.0);
        assert!((p.x - 15.0).abs() < 1e-9);
        assert!((p.y - 20.0).abs() < 1e-9);

        let p = ellipse_point(DVec2::ZERO, 5.0, 3.0, std::f64::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_centering_offset() {
        let offset = centering_offset(DVec2::new(80.0, 80.0), DVec2::new(256.0, 192.0));
        assert_eq!(offset, DVec2::new(-88.0, -56.0));
    }
}
