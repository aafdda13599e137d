//! Head position types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the XY plane, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XyPosition {
    pub x: f32,
    pub y: f32,
}

impl XyPosition {
    /// Create a new position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Shift by a relative amount
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axes whose position is known (homed since power-on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KnownAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl KnownAxes {
    /// Nothing homed
    pub const fn none() -> Self {
        Self {
            x: false,
            y: false,
            z: false,
        }
    }

    /// Everything homed
    pub const fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    /// Check if the head can be positioned in the XY plane
    pub fn head_known(&self) -> bool {
        self.x && self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let p = XyPosition::new(90.5, 24.0).offset(-5.5, 4.0);
        assert_eq!(p, XyPosition::new(85.0, 28.0));
    }

    #[test]
    fn test_head_known_requires_x_and_y() {
        assert!(KnownAxes::all().head_known());
        assert!(!KnownAxes::none().head_known());

        let x_only = KnownAxes {
            x: true,
            ..KnownAxes::none()
        };
        assert!(!x_only.head_known());

        // Z is irrelevant for head moves
        let xy = KnownAxes {
            x: true,
            y: true,
            z: false,
        };
        assert!(xy.head_known());
    }
}
