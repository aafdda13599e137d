//! Persisted dual-extrusion settings record
//!
//! Stored in flash as postcard binary data. A record whose magic, version
//! or CRC does not match is discarded as a whole and replaced with
//! defaults, so old and new fields are never mixed.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::geometry::{ExtruderGeometry, StationGeometry};
use crate::extruder::{ExtruderIndex, EXTRUDERS};

/// Magic number to identify a valid settings record
pub const SETTINGS_MAGIC: u32 = 0x218D_E93C;

/// Current settings record version
///
/// Bump whenever a stored field changes so older records fall back to
/// defaults instead of being misread.
pub const SETTINGS_VERSION: u16 = 2;

/// Upper bound for the serialized record size
pub const MAX_SETTINGS_SIZE: usize = 192;

/// Optional dual-head features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DualMode {
    /// Loaded `T0`/`T1` scripts replace the built-in switch
    pub toolchange_scripts_enabled: bool,
    /// A wiper is installed; priming ends with a wipe pass
    pub wipe_enabled: bool,
}

impl Default for DualMode {
    fn default() -> Self {
        Self {
            toolchange_scripts_enabled: true,
            wipe_enabled: false,
        }
    }
}

/// Record encoding/validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Complete settings record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DualSettings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u16,
    /// Per-extruder geometry, indexed by [`ExtruderIndex`]
    pub extruders: [ExtruderGeometry; EXTRUDERS],
    /// Dock and wipe positions
    pub station: StationGeometry,
    /// Feature flags
    pub mode: DualMode,
    /// CRC32 checksum (calculated over magic..mode)
    pub crc: u32,
}

impl Default for DualSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl DualSettings {
    /// Factory defaults
    pub fn new() -> Self {
        Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            extruders: [ExtruderGeometry::primary(), ExtruderGeometry::secondary()],
            station: StationGeometry::default(),
            mode: DualMode::default(),
            crc: 0,
        }
    }

    /// Check if magic and version match this firmware
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }

    /// Geometry of one extruder
    pub fn extruder(&self, e: ExtruderIndex) -> &ExtruderGeometry {
        &self.extruders[e.as_usize()]
    }

    /// Mutable geometry of one extruder
    pub fn extruder_mut(&mut self, e: ExtruderIndex) -> &mut ExtruderGeometry {
        &mut self.extruders[e.as_usize()]
    }

    /// Nominal toolchange retraction of every extruder
    pub fn nominal_retract_lengths(&self) -> [f32; EXTRUDERS] {
        ExtruderIndex::ALL.map(|e| self.extruder(e).nominal_retract_length())
    }

    /// Calculate CRC32 over all fields except the crc itself
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &self.version.to_le_bytes());

        for geometry in &self.extruders {
            for value in [
                geometry.offset.x,
                geometry.offset.y,
                geometry.offset.z,
                geometry.retract_length,
                geometry.retract_feedrate,
                geometry.prime_length,
                geometry.volume_to_length,
            ] {
                crc = crc32_update(crc, &value.to_bits().to_le_bytes());
            }
        }

        for value in [
            self.station.dock.x,
            self.station.dock.y,
            self.station.wipe.x,
            self.station.wipe.y,
        ] {
            crc = crc32_update(crc, &value.to_bits().to_le_bytes());
        }

        crc = crc32_update(
            crc,
            &[
                self.mode.toolchange_scripts_enabled as u8,
                self.mode.wipe_enabled as u8,
            ],
        );

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, refreshing the CRC first
    #[cfg(feature = "serde")]
    pub fn encode<'b>(&mut self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], RecordError> {
        self.update_crc();
        postcard::to_slice(self, buffer).map_err(|_| RecordError::Serialize)
    }

    /// Deserialize and validate a stored record
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let settings: DualSettings =
            postcard::from_bytes(bytes).map_err(|_| RecordError::Deserialize)?;

        if !settings.is_valid() {
            return Err(RecordError::InvalidFormat);
        }

        if !settings.verify_crc() {
            return Err(RecordError::CrcMismatch);
        }

        Ok(settings)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
