//! Extruder identification

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of physical extruders on the head
pub const EXTRUDERS: usize = 2;

/// One of the two physical extruders
///
/// Out-of-range indices cannot be represented, so every per-extruder
/// array lookup through [`ExtruderIndex::as_usize`] is in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ExtruderIndex {
    /// Primary nozzle (T0), the reference for nozzle offsets
    #[default]
    E0 = 0,
    /// Secondary nozzle (T1)
    E1 = 1,
}

impl ExtruderIndex {
    /// All extruders in index order
    pub const ALL: [ExtruderIndex; EXTRUDERS] = [ExtruderIndex::E0, ExtruderIndex::E1];

    /// Create from a raw tool number
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ExtruderIndex::E0),
            1 => Some(ExtruderIndex::E1),
            _ => None,
        }
    }

    /// Raw tool number
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Index into per-extruder arrays
    pub fn as_usize(self) -> usize {
        self as usize
    }

    /// The other extruder
    pub fn other(self) -> Self {
        match self {
            ExtruderIndex::E0 => ExtruderIndex::E1,
            ExtruderIndex::E1 => ExtruderIndex::E0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_bounds() {
        assert_eq!(ExtruderIndex::from_u8(0), Some(ExtruderIndex::E0));
        assert_eq!(ExtruderIndex::from_u8(1), Some(ExtruderIndex::E1));
        assert_eq!(ExtruderIndex::from_u8(2), None);
        assert_eq!(ExtruderIndex::from_u8(255), None);
    }

    #[test]
    fn test_other() {
        assert_eq!(ExtruderIndex::E0.other(), ExtruderIndex::E1);
        assert_eq!(ExtruderIndex::E1.other(), ExtruderIndex::E0);
    }

    #[test]
    fn test_all_is_ordered() {
        for (i, e) in ExtruderIndex::ALL.iter().enumerate() {
            assert_eq!(e.as_usize(), i);
        }
    }
}
