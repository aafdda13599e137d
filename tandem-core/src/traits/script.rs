//! Script source trait
//!
//! Supplies the raw text of user override scripts from external storage.

/// Reasons a script could not be read
///
/// Every variant means "use the built-in procedure"; none of them is
/// reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// Storage medium missing or not mountable
    Unavailable,
    /// No file for this script
    NotFound,
    /// Read failed or file too large for the buffer
    Unreadable,
}

/// Provider of script file contents
pub trait ScriptSource {
    /// Mount the storage medium, retrying if a previous attempt failed
    fn mount(&mut self) -> impl core::future::Future<Output = Result<(), SourceError>>;

    /// Read the named script into `buffer`, returning the byte count
    fn read(
        &mut self,
        name: &str,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, SourceError>>;
}
