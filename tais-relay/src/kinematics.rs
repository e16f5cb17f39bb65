//! Ground track and ground speed from velocity components
//!
//! `vx` is the east/west component and `vy` the north/south component, so
//! `atan2(vx, vy)` is a bearing measured clockwise from true north.

/// Derived horizontal motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kinematics {
    /// Degrees true, 0..=359
    pub ground_track: i32,
    /// Same unit as the velocity components
    pub ground_speed: i32,
}

impl Kinematics {
    pub fn from_velocity(vx: i32, vy: i32) -> Self {
        Self {
            ground_track: ground_track(vx, vy),
            ground_speed: ground_speed(vx, vy),
        }
    }
}

/// Bearing of travel in whole degrees; 0 when stationary
pub fn ground_track(vx: i32, vy: i32) -> i32 {
    if vx == 0 && vy == 0 {
        return 0;
    }
    let degrees = (vx as f64).atan2(vy as f64).to_degrees();
    ((degrees + 360.0) % 360.0).floor() as i32
}

/// Magnitude of the velocity vector, truncated
pub fn ground_speed(vx: i32, vy: i32) -> i32 {
    let (vx, vy) = (vx as f64, vy as f64);
    (vx * vx + vy * vy).sqrt().floor() as i32
}
