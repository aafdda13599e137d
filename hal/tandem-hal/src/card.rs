//! Removable media abstraction
//!
//! The SD card is optional: it may be missing, unformatted or swapped
//! while the machine is running. Callers re-initialize on demand.

/// Errors from card operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CardError {
    /// No card inserted, or card failed to initialize
    NotPresent,
    /// Directory or file does not exist
    NotFound,
    /// Read failed part way through
    Io,
    /// File is larger than the supplied buffer
    BufferTooSmall,
}

/// Read-only access to files on removable media
pub trait CardReader {
    /// Initialize the card and mount its filesystem
    ///
    /// Calling this on an already mounted card is a cheap no-op.
    fn init(&mut self) -> impl core::future::Future<Output = Result<(), CardError>>;

    /// Whether the card is currently mounted
    fn is_ok(&self) -> bool;

    /// Read a whole file into `buffer`
    ///
    /// `dir` is relative to the card root. Returns the number of bytes read.
    fn read_file(
        &mut self,
        dir: &str,
        name: &str,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, CardError>>;
}
