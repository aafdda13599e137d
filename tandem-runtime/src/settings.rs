//! Settings persistence
//!
//! Loads and stores the dual-extrusion settings record in flash.

use tandem_core::config::{DualSettings, RecordError, MAX_SETTINGS_SIZE};
use tandem_hal::flash::{FlashError, FlashStorage, StorageKey};

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Flash operation failed
    Flash(FlashError),
    /// Record could not be encoded or failed validation
    Record(RecordError),
}

impl From<FlashError> for SettingsError {
    fn from(e: FlashError) -> Self {
        SettingsError::Flash(e)
    }
}

impl From<RecordError> for SettingsError {
    fn from(e: RecordError) -> Self {
        SettingsError::Record(e)
    }
}

/// Load settings from flash
///
/// Returns factory defaults when nothing is stored or the stored record
/// is unusable. A bad record is replaced as a whole.
pub async fn load_settings<F: FlashStorage>(storage: &mut F) -> DualSettings {
    match load_settings_inner(storage).await {
        Ok(settings) => {
            info!("Loaded dual settings from flash");
            log_settings_summary(&settings);
            settings
        }
        Err(SettingsError::Flash(FlashError::NotFound)) => {
            debug!("No dual settings in flash, using defaults");
            DualSettings::new()
        }
        Err(e) => {
            warn!("Failed to load dual settings: {:?}, using defaults", e);
            DualSettings::new()
        }
    }
}

async fn load_settings_inner<F: FlashStorage>(storage: &mut F) -> Result<DualSettings, SettingsError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage.read(StorageKey::DualSettings, &mut buffer).await?;

    debug!("Read {} bytes of dual settings from flash", len);

    let settings = DualSettings::decode(&buffer[..len])?;
    Ok(settings)
}

/// Save settings to flash
///
/// Refreshes the CRC before writing.
pub async fn save_settings<F: FlashStorage>(
    storage: &mut F,
    settings: &mut DualSettings,
) -> Result<(), SettingsError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes = settings.encode(&mut buffer)?;

    debug!("Saving {} bytes of dual settings to flash", bytes.len());

    storage.write(StorageKey::DualSettings, bytes).await?;

    info!("Saved dual settings to flash");
    log_settings_summary(settings);

    Ok(())
}

fn log_settings_summary(settings: &DualSettings) {
    info!(
        "  dock=({}, {}) wipe=({}, {}) scripts={} wipe_enabled={}",
        settings.station.dock.x,
        settings.station.dock.y,
        settings.station.wipe.x,
        settings.station.wipe.y,
        settings.mode.toolchange_scripts_enabled,
        settings.mode.wipe_enabled,
    );
    for (index, geometry) in settings.extruders.iter().enumerate() {
        info!(
            "  E{}: offset=({}, {}, {}) retract={}@{} prime={}",
            index,
            geometry.offset.x,
            geometry.offset.y,
            geometry.offset.z,
            geometry.retract_length,
            geometry.retract_feedrate,
            geometry.prime_length,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFlash;
    use embassy_futures::block_on;
    use tandem_core::config::TuneLimits;
    use tandem_core::motion::XyPosition;
    use tandem_core::ExtruderIndex;

    #[test]
    fn test_empty_flash_gives_defaults() {
        let mut flash = MemoryFlash::new();
        let settings = block_on(load_settings(&mut flash));
        assert_eq!(settings, DualSettings::new());
    }

    #[test]
    fn test_store_then_power_cycle() {
        let limits = TuneLimits::default();
        let mut flash = MemoryFlash::new();
        let mut settings = DualSettings::new();
        settings.station.set_dock(XyPosition::new(215.0, 43.5), &limits);
        settings
            .extruder_mut(ExtruderIndex::E1)
            .set_prime_length(-1.0, &limits);
        settings.mode.wipe_enabled = true;

        block_on(save_settings(&mut flash, &mut settings)).unwrap();
        let restored = block_on(load_settings(&mut flash));

        assert_eq!(restored, settings);
        assert_eq!(restored.extruder(ExtruderIndex::E1).prime_length, -1.0);
    }

    #[test]
    fn test_garbage_record_replaced_by_defaults() {
        let mut flash = MemoryFlash::new();
        flash.put(StorageKey::DualSettings, &[0xde, 0xad, 0xbe, 0xef]);

        let settings = block_on(load_settings(&mut flash));
        assert_eq!(settings, DualSettings::new());
    }

    #[test]
    fn test_old_version_replaced_whole() {
        let mut flash = MemoryFlash::new();
        let mut old = DualSettings::new();
        old.version = 0;
        old.station.wipe = XyPosition::new(10.0, 10.0);
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let bytes = old.encode(&mut buffer).unwrap();
        flash.put(StorageKey::DualSettings, bytes);

        let settings = block_on(load_settings(&mut flash));
        assert_eq!(settings, DualSettings::new());
    }

    #[test]
    fn test_write_failure_reported() {
        let mut flash = MemoryFlash::new().read_only();
        let mut settings = DualSettings::new();

        let result = block_on(save_settings(&mut flash, &mut settings));
        assert_eq!(result, Err(SettingsError::Flash(FlashError::Full)));
    }
}
