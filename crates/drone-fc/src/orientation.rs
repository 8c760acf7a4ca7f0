//! Tilt from the gravity vector.
//!
//! ```text
//! pitch = atan(ay / sqrt(ax² + az²))
//! roll  = atan(ax / sqrt(ay² + az²))
//! ```
//!
//! Only valid while the airframe sees no linear acceleration besides
//! gravity. Near ±90° of tilt the two square-root terms approach each other
//! from both sides, so 85° and 95° are indistinguishable. Resolving that
//! needs a rotation-matrix or quaternion estimator.

use core::f32::consts::FRAC_PI_2;

use libm::{atanf, sqrtf};
use mems_bus::Vector3;

/// Pitch and roll in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    pub pitch: f32,
    pub roll: f32,
}

impl Attitude {
    pub const LEVEL: Self = Self { pitch: 0.0, roll: 0.0 };

    pub fn pitch_deg(&self) -> f32 {
        self.pitch.to_degrees()
    }

    pub fn roll_deg(&self) -> f32 {
        self.roll.to_degrees()
    }
}

/// Estimate attitude from an acceleration vector in g.
///
/// Returns `None` for the zero vector and for non-finite input. A zero
/// denominator with a non-zero numerator saturates that angle at ±π/2.
pub fn estimate(accel: Vector3) -> Option<Attitude> {
    if !accel.is_finite() {
        return None;
    }
    let Vector3 { x, y, z } = accel;
    if x == 0.0 && y == 0.0 && z == 0.0 {
        return None;
    }
    Some(Attitude {
        pitch: tilt(y, sqrtf(x * x + z * z)),
        roll: tilt(x, sqrtf(y * y + z * z)),
    })
}

fn tilt(num: f32, den: f32) -> f32 {
    if den == 0.0 {
        return if num < 0.0 { -FRAC_PI_2 } else { FRAC_PI_2 };
    }
    atanf(num / den)
}

/// Holds the last good estimate so a degenerate sample does not disturb
/// downstream consumers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttitudeEstimator {
    last: Attitude,
    rejected: u32,
}

impl AttitudeEstimator {
    pub const fn new() -> Self {
        Self { last: Attitude::LEVEL, rejected: 0 }
    }

    pub fn update(&mut self, accel: Vector3) -> Attitude {
        match estimate(accel) {
            Some(attitude) => self.last = attitude,
            None => {
                self.rejected = self.rejected.wrapping_add(1);
                debug!("degenerate acceleration sample, keeping last attitude");
            }
        }
        self.last
    }

    pub fn last(&self) -> Attitude {
        self.last
    }

    /// Samples that produced no estimate.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}
