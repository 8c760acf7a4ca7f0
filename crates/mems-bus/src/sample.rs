/// One of the three sensing axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Byte offset of the axis' low byte from the X low-byte register.
    ///
    /// Output registers are laid out X_L, X_H, Y_L, Y_H, Z_L, Z_H.
    pub const fn offset(self) -> u8 {
        match self {
            Axis::X => 0,
            Axis::Y => 2,
            Axis::Z => 4,
        }
    }
}

/// Raw two's-complement output of a three-axis sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    /// Decode six little-endian bytes in X, Y, Z order.
    pub const fn from_le_bytes(bytes: [u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([bytes[0], bytes[1]]),
            y: i16::from_le_bytes([bytes[2], bytes[3]]),
            z: i16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    pub const fn axis(&self, axis: Axis) -> i16 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Apply `f` to every axis, producing a converted vector.
    pub fn map(self, f: impl Fn(i16) -> f32) -> Vector3 {
        Vector3 { x: f(self.x), y: f(self.y), z: f(self.z) }
    }
}

/// Three-axis sample in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn scale(self, factor: f32) -> Self {
        Self { x: self.x * factor, y: self.y * factor, z: self.z * factor }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
