//! Nozzle, dock and wipe geometry
//!
//! Values are edited by the calibration menus, always through the
//! clamping setters so out-of-range input never reaches the orchestrator.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::XyPosition;

/// Default dock position (where the lift lever is actuated)
pub const DOCK_X_POSITION: f32 = 218.0;
pub const DOCK_Y_POSITION: f32 = 41.0;

/// Default wipe position (center of the wiper blade)
pub const WIPE_X_POSITION: f32 = 90.5;
pub const WIPE_Y_POSITION: f32 = 24.0;

/// Default X offset of the secondary nozzle
pub const SECONDARY_OFFSET_X: f32 = 18.0;

/// Default toolchange retraction in mm of filament
pub const DEFAULT_RETRACT_LENGTH: f32 = 16.0;

/// Default toolchange retraction feedrate in mm/min
pub const DEFAULT_RETRACT_FEEDRATE: f32 = 2700.0;

/// Default extra priming after a toolchange in mm of filament
pub const DEFAULT_PRIME_LENGTH: f32 = 0.5;

/// Smallest usable volume-to-length factor (about 5.6 mm filament)
pub const MIN_VOLUME_TO_LENGTH: f32 = 0.04;

/// Largest usable volume-to-length factor (about 1.1 mm filament)
pub const MAX_VOLUME_TO_LENGTH: f32 = 1.0;

/// Nozzle offset relative to the primary nozzle, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NozzleOffset {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Per-extruder toolchange geometry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtruderGeometry {
    /// Offset of this nozzle relative to the primary one
    pub offset: NozzleOffset,
    /// Toolchange retraction length (mm of filament)
    pub retract_length: f32,
    /// Toolchange retraction feedrate (mm/min)
    pub retract_feedrate: f32,
    /// Extra priming after the retraction was undone (mm, may be negative)
    pub prime_length: f32,
    /// Filament length per unit of extrusion (1.0 unless volumetric)
    pub volume_to_length: f32,
}

impl ExtruderGeometry {
    /// Defaults for the primary nozzle
    pub const fn primary() -> Self {
        Self {
            offset: NozzleOffset {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            retract_length: DEFAULT_RETRACT_LENGTH,
            retract_feedrate: DEFAULT_RETRACT_FEEDRATE,
            prime_length: DEFAULT_PRIME_LENGTH,
            volume_to_length: 1.0,
        }
    }

    /// Defaults for the secondary nozzle
    pub const fn secondary() -> Self {
        Self {
            offset: NozzleOffset {
                x: SECONDARY_OFFSET_X,
                y: 0.0,
                z: 0.0,
            },
            ..Self::primary()
        }
    }

    /// Nominal toolchange retraction in extrusion units
    pub fn nominal_retract_length(&self) -> f32 {
        self.retract_length / self.length_factor()
    }

    /// Extra priming in extrusion units
    pub fn nominal_prime_length(&self) -> f32 {
        self.prime_length / self.length_factor()
    }

    fn length_factor(&self) -> f32 {
        if (MIN_VOLUME_TO_LENGTH..=MAX_VOLUME_TO_LENGTH).contains(&self.volume_to_length) {
            self.volume_to_length
        } else {
            1.0
        }
    }

    /// Set the retraction length, clamped to the tuning range
    pub fn set_retract_length(&mut self, length: f32, limits: &TuneLimits) {
        self.retract_length = length.clamp(0.0, limits.max_retract_length);
    }

    /// Set the retraction feedrate, clamped to the tuning range
    pub fn set_retract_feedrate(&mut self, feedrate: f32, limits: &TuneLimits) {
        self.retract_feedrate = feedrate.clamp(0.0, limits.max_retract_feedrate);
    }

    /// Set the extra priming length, clamped to the tuning range
    pub fn set_prime_length(&mut self, length: f32, limits: &TuneLimits) {
        self.prime_length = length.clamp(-limits.max_prime_length, limits.max_prime_length);
    }

    /// Set the nozzle offset, clamped to the ruler range
    pub fn set_offset(&mut self, offset: NozzleOffset, limits: &TuneLimits) {
        let xy = limits.max_nozzle_offset;
        let z = limits.max_nozzle_offset_z;
        self.offset = NozzleOffset {
            x: offset.x.clamp(-xy, xy),
            y: offset.y.clamp(-xy, xy),
            z: offset.z.clamp(-z, z),
        };
    }

    /// Set the volume-to-length factor, clamped to the usable range
    ///
    /// Non-positive and non-finite values are ignored.
    pub fn set_volume_to_length(&mut self, factor: f32, limits: &TuneLimits) {
        if factor.is_finite() && factor > 0.0 {
            self.volume_to_length =
                factor.clamp(limits.min_volume_to_length, limits.max_volume_to_length);
        }
    }
}

/// Shared parking and cleaning positions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationGeometry {
    /// Dock cradle position
    pub dock: XyPosition,
    /// Wiper position
    pub wipe: XyPosition,
}

impl Default for StationGeometry {
    fn default() -> Self {
        Self {
            dock: XyPosition::new(DOCK_X_POSITION, DOCK_Y_POSITION),
            wipe: XyPosition::new(WIPE_X_POSITION, WIPE_Y_POSITION),
        }
    }
}

impl StationGeometry {
    /// Set the dock position, clamped to the bed
    pub fn set_dock(&mut self, position: XyPosition, limits: &TuneLimits) {
        self.dock = limits.clamp_to_bed(position);
    }

    /// Set the wipe position, clamped to the bed
    pub fn set_wipe(&mut self, position: XyPosition, limits: &TuneLimits) {
        self.wipe = limits.clamp_to_bed(position);
    }
}

/// Ranges accepted by the calibration menus
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuneLimits {
    /// Maximum X carriage position (mm)
    pub bed_max_x: f32,
    /// Maximum Y carriage position (mm)
    pub bed_max_y: f32,
    /// Maximum toolchange retraction (mm)
    pub max_retract_length: f32,
    /// Maximum E feedrate (mm/min)
    pub max_retract_feedrate: f32,
    /// Extra priming range is symmetric around zero (mm)
    pub max_prime_length: f32,
    /// X/Y nozzle offset range is symmetric around zero (mm)
    pub max_nozzle_offset: f32,
    /// Z nozzle offset range is symmetric around zero (mm)
    pub max_nozzle_offset_z: f32,
    /// Volume-to-length factor range, within
    /// [`MIN_VOLUME_TO_LENGTH`]..=[`MAX_VOLUME_TO_LENGTH`]
    pub min_volume_to_length: f32,
    pub max_volume_to_length: f32,
}

impl Default for TuneLimits {
    fn default() -> Self {
        Self {
            bed_max_x: 230.0,
            bed_max_y: 225.0,
            max_retract_length: 50.0,
            max_retract_feedrate: 45.0 * 60.0,
            max_prime_length: 20.0,
            max_nozzle_offset: 99.99,
            max_nozzle_offset_z: 5.0,
            min_volume_to_length: MIN_VOLUME_TO_LENGTH,
            max_volume_to_length: MAX_VOLUME_TO_LENGTH,
        }
    }
}

impl TuneLimits {
    /// Clamp a carriage position to the bed
    pub fn clamp_to_bed(&self, position: XyPosition) -> XyPosition {
        XyPosition::new(
            position.x.clamp(0.0, self.bed_max_x),
            position.y.clamp(0.0, self.bed_max_y),
        )
    }
}
