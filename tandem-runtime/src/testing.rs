//! In-memory doubles for the storage traits

use std::string::{String, ToString};
use std::vec::Vec;

use tandem_hal::card::{CardError, CardReader};
use tandem_hal::flash::{FlashError, FlashStorage, StorageKey};

/// Flash map backed by a vector
pub struct MemoryFlash {
    entries: Vec<(StorageKey, Vec<u8>)>,
    read_only: bool,
    pub writes: usize,
}

impl MemoryFlash {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            read_only: false,
            writes: 0,
        }
    }

    /// Every write fails with [`FlashError::Full`]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn put(&mut self, key: StorageKey, data: &[u8]) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, data.to_vec()));
    }
}

impl FlashStorage for MemoryFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let (_, data) = self
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .ok_or(FlashError::NotFound)?;
        if data.len() > buffer.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.read_only {
            return Err(FlashError::Full);
        }
        self.put(key, data);
        self.writes += 1;
        Ok(())
    }
}

/// SD card with a flat list of `dir/name` files
pub struct MemoryCard {
    pub present: bool,
    pub mounted: bool,
    pub inits: usize,
    files: Vec<(String, Vec<u8>)>,
}

impl MemoryCard {
    pub fn new() -> Self {
        Self {
            present: true,
            mounted: false,
            inits: 0,
            files: Vec::new(),
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.files.push((path.to_string(), text.as_bytes().to_vec()));
        self
    }
}

impl CardReader for MemoryCard {
    async fn init(&mut self) -> Result<(), CardError> {
        self.inits += 1;
        self.mounted = self.present;
        if self.mounted {
            Ok(())
        } else {
            Err(CardError::NotPresent)
        }
    }

    fn is_ok(&self) -> bool {
        self.mounted
    }

    async fn read_file(
        &mut self,
        dir: &str,
        name: &str,
        buffer: &mut [u8],
    ) -> Result<usize, CardError> {
        if !self.mounted {
            return Err(CardError::NotPresent);
        }
        let mut path = String::from(dir);
        path.push('/');
        path.push_str(name);

        let (_, data) = self
            .files
            .iter()
            .find(|(p, _)| *p == path)
            .ok_or(CardError::NotFound)?;
        if data.len() > buffer.len() {
            return Err(CardError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}
