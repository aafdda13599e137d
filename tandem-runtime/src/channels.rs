//! Inter-task communication channels
//!
//! Every caller that wants to change toolchange state (print executor,
//! menus, card detection) sends a [`ToolchangeRequest`]; only the
//! service task receives them, so all mutations are serialized.

use embassy_sync::channel::Channel;

use tandem_core::config::NozzleOffset;
use tandem_core::motion::{CommandLine, XyPosition};
use tandem_core::script::LoadSummary;
use tandem_core::toolchange::{PrimeMode, SwitchOutcome, ToolchangeError};
use tandem_core::ExtruderIndex;

use crate::settings::SettingsError;

/// Channel capacity for toolchange requests
pub const REQUEST_CHANNEL_SIZE: usize = 4;

/// Motion queue depth between this layer and the motion engine
pub const MOTION_QUEUE_SIZE: usize = 16;

/// Work items for the toolchange service
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToolchangeRequest {
    /// Make `target` the active extruder
    Switch {
        target: ExtruderIndex,
        retract_previous: bool,
    },
    /// Prime (and wipe) an extruder after a switch
    Prime(ExtruderIndex),
    /// Switch then prime, as at print start
    SwitchAndPrime {
        target: ExtruderIndex,
        retract_previous: bool,
    },
    /// In-print retraction executed by the print path
    PrintRetracted { extruder: ExtruderIndex, length: f32 },
    /// In-print retraction recovered by the print path
    PrintRecovered(ExtruderIndex),
    /// A print is starting
    BeginPrint,
    /// A print finished normally
    EndOfPrint,
    /// The motion queue was flushed
    Abort,
    /// Card inserted or swapped; reload user scripts
    ReloadScripts,
    /// Calibration: dock position
    SetDock(XyPosition),
    /// Calibration: wipe position
    SetWipe(XyPosition),
    /// Calibration: toolchange retraction of one extruder
    SetRetract {
        extruder: ExtruderIndex,
        length: f32,
        feedrate: f32,
        prime: f32,
    },
    /// Calibration: nozzle offset of one extruder
    SetNozzleOffset {
        extruder: ExtruderIndex,
        offset: NozzleOffset,
    },
    /// Volumetric extrusion changed the filament factor
    SetVolumeFactor { extruder: ExtruderIndex, factor: f32 },
    /// Loaded `T0`/`T1` scripts replace the built-in switch
    SetToolchangeScriptsEnabled(bool),
    /// Wiper installed or removed
    SetWipeEnabled(bool),
    /// Write the current settings to flash
    StoreSettings,
    /// Restore factory settings (in RAM only until stored)
    ResetSettings,
}

/// Result of one processed request
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToolchangeReply {
    /// Request applied, nothing to report
    Done,
    /// Switch finished
    Switched(SwitchOutcome),
    /// Prime finished
    Primed(PrimeMode),
    /// Switch and prime finished
    SwitchedAndPrimed(SwitchOutcome, PrimeMode),
    /// Switch refused; nothing was emitted
    Rejected(ToolchangeError),
    /// End-of-print retraction; false if already retracted
    EndOfPrint { retracted: bool },
    /// Script reload finished
    ScriptsLoaded(LoadSummary),
    /// Settings written to flash
    Stored,
    /// Settings could not be written
    StoreFailed(SettingsError),
}

/// Request channel type for a given mutex flavour
pub type RequestChannel<M> = Channel<M, ToolchangeRequest, REQUEST_CHANNEL_SIZE>;

/// Motion queue type for a given mutex flavour
pub type MotionQueue<M> = Channel<M, CommandLine, MOTION_QUEUE_SIZE>;
