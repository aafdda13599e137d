//! Per-extruder retraction bookkeeping
//!
//! Tracks how much filament is currently missing from each nozzle and why.
//! The record lives in RAM only: after a power cycle every extruder is
//! [`RetractKind::NotRetracted`].

use crate::extruder::{ExtruderIndex, EXTRUDERS};

/// Retraction status of one extruder
///
/// A single tagged value per extruder, so a print retraction and a
/// toolchange retraction can never be recorded at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetractKind {
    /// Nozzle is full, nothing to recover
    #[default]
    NotRetracted,
    /// Retracted by an in-print retraction (travel/pause retract)
    PrintRetracted {
        /// Length to restore on the next extrusion
        recoverable_length: f32,
    },
    /// Retracted because the extruder went inactive during a toolchange
    ToolchangeRetracted {
        /// Length to restore when the extruder is primed again
        recoverable_length: f32,
    },
}

impl RetractKind {
    /// Outstanding length, 0 when not retracted
    pub fn recoverable_length(&self) -> f32 {
        match *self {
            RetractKind::NotRetracted => 0.0,
            RetractKind::PrintRetracted { recoverable_length }
            | RetractKind::ToolchangeRetracted { recoverable_length } => recoverable_length,
        }
    }

    /// Check if any retraction is outstanding
    pub fn is_retracted(&self) -> bool {
        !matches!(self, RetractKind::NotRetracted)
    }

    /// Check if this is a toolchange retraction
    pub fn is_toolchange(&self) -> bool {
        matches!(self, RetractKind::ToolchangeRetracted { .. })
    }
}

/// Retraction state for every extruder on the head
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtruderRetractState {
    extruders: [RetractKind; EXTRUDERS],
}

impl ExtruderRetractState {
    /// Power-on state: nothing retracted
    pub const fn new() -> Self {
        Self {
            extruders: [RetractKind::NotRetracted; EXTRUDERS],
        }
    }

    /// Current state of an extruder
    pub fn kind(&self, e: ExtruderIndex) -> RetractKind {
        self.extruders[e.as_usize()]
    }

    /// Record an in-print retraction
    ///
    /// A repeated call overwrites the stored length; the latest request wins.
    pub fn mark_print_retracted(&mut self, e: ExtruderIndex, length: f32) {
        self.extruders[e.as_usize()] = RetractKind::PrintRetracted {
            recoverable_length: length,
        };
    }

    /// Record a toolchange retraction, replacing whatever was recorded before
    pub fn mark_toolchange_retracted(&mut self, e: ExtruderIndex, length: f32) {
        self.extruders[e.as_usize()] = RetractKind::ToolchangeRetracted {
            recoverable_length: length,
        };
    }

    /// Forget any retraction after it was recovered
    pub fn clear(&mut self, e: ExtruderIndex) {
        self.extruders[e.as_usize()] = RetractKind::NotRetracted;
    }

    /// Length to restore, 0 when not retracted
    pub fn recoverable_length(&self, e: ExtruderIndex) -> f32 {
        self.extruders[e.as_usize()].recoverable_length()
    }

    /// Drop print retractions left over from a previous print
    ///
    /// Toolchange retractions are kept: that filament really is pulled back.
    pub fn clear_print_retractions(&mut self) {
        for kind in &mut self.extruders {
            if let RetractKind::PrintRetracted { .. } = kind {
                *kind = RetractKind::NotRetracted;
            }
        }
    }

    /// Force a known-safe state after the motion queue was flushed
    ///
    /// Every extruder is assumed to be retracted by its full nominal
    /// toolchange length, whatever was recorded before the flush.
    pub fn force_after_abort(&mut self, nominal: [f32; EXTRUDERS]) {
        for (kind, length) in self.extruders.iter_mut().zip(nominal) {
            *kind = RetractKind::ToolchangeRetracted {
                recoverable_length: length,
            };
        }
    }
}
