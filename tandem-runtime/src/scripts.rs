//! Card-backed script source
//!
//! User scripts live in [`CONFIG_DIR`] on the SD card. A missing card,
//! directory or file is not an error; the built-in procedure is used.

use tandem_core::script::CONFIG_DIR;
use tandem_core::traits::{ScriptSource, SourceError};
use tandem_hal::card::{CardError, CardReader};

/// [`ScriptSource`] reading from an SD card
pub struct CardScriptSource<C> {
    card: C,
}

impl<C: CardReader> CardScriptSource<C> {
    /// Wrap a card reader
    pub fn new(card: C) -> Self {
        Self { card }
    }

    /// Underlying card reader
    pub fn card(&self) -> &C {
        &self.card
    }

    /// Release the card reader
    pub fn into_inner(self) -> C {
        self.card
    }
}

/// Map a card failure onto the fallback it triggers
fn source_error(e: CardError) -> SourceError {
    match e {
        CardError::NotPresent => SourceError::Unavailable,
        CardError::NotFound => SourceError::NotFound,
        CardError::Io | CardError::BufferTooSmall => SourceError::Unreadable,
    }
}

impl<C: CardReader> ScriptSource for CardScriptSource<C> {
    async fn mount(&mut self) -> Result<(), SourceError> {
        if self.card.is_ok() {
            return Ok(());
        }
        self.card.init().await.map_err(|e| {
            debug!("Card not available for scripts: {:?}", e);
            source_error(e)
        })
    }

    async fn read(&mut self, name: &str, buffer: &mut [u8]) -> Result<usize, SourceError> {
        let len = self
            .card
            .read_file(CONFIG_DIR, name, buffer)
            .await
            .map_err(source_error)?;
        debug!("Read script {} ({} bytes)", name, len);
        Ok(len)
    }
}
