//! Flash storage abstractions
//!
//! Key/value storage on the config partition. Settings are small and
//! written rarely (only on an explicit store), so a wear-levelled map is
//! all the toolchange layer needs.

/// Storage keys for persisted records
///
/// Values are stable on-flash identifiers; never renumber a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Dual extrusion settings record (postcard)
    DualSettings = 0,
}

impl StorageKey {
    /// On-flash identifier
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse an on-flash identifier
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::DualSettings),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash controller reported a failure
    Device,
    /// Nothing stored under this key
    NotFound,
    /// Stored value does not fit the read buffer
    BufferTooSmall,
    /// Storage metadata corrupted
    Corrupted,
    /// No space left after garbage collection
    Full,
}

/// Persistent key/value storage
///
/// Implementations own wear levelling and power-fail safety. A write
/// either replaces the previous value completely or leaves it intact.
pub trait FlashStorage {
    /// Read the value stored under `key` into `buffer`
    ///
    /// Returns the number of bytes read.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the value stored under `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let Some(slot) = buffer.first_mut() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let Some(&byte) = buffer.first() else {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        };
        StorageKey::from_u8(byte)
            .map(|key| (key, 1))
            .ok_or(sequential_storage::map::SerializationError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_byte_mapping() {
        assert_eq!(StorageKey::DualSettings.as_u8(), 0);
        assert_eq!(StorageKey::from_u8(0), Some(StorageKey::DualSettings));
        assert_eq!(StorageKey::from_u8(1), None);
    }
}
