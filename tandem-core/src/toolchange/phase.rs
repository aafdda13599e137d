//! Toolchange phase machine
//!
//! Phases are transient: they describe the step in progress inside one
//! orchestrator call and are back at `Idle` when the call returns.

/// Toolchange phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToolchangePhase {
    /// No toolchange in progress
    #[default]
    Idle,
    /// Moving to the pre-dock waypoint
    Parking,
    /// Retracting the outgoing extruder
    Retracting,
    /// Dock release travel (built-in path or user script)
    Traveling,
    /// Undoing the retraction and priming the incoming extruder
    Priming,
    /// Wipe pass over the wiper
    Wiping,
}

/// Events that advance the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// Built-in switch started
    BeginSwitch,
    /// User script replaces parking, retraction and dock travel
    BeginScriptedSwitch,
    /// Pre-dock waypoint queued
    Parked,
    /// Outgoing retraction queued (or skipped)
    Retracted,
    /// Dock released, new extruder selected
    Released,
    /// Priming started
    BeginPrime,
    /// Priming finished without a wipe
    Primed,
    /// Wipe pass started
    BeginWipe,
    /// Wipe pass finished
    Wiped,
    /// Motion queue flushed by a higher layer
    Abort,
}

impl ToolchangePhase {
    /// Check if a toolchange step is in progress
    pub fn is_busy(&self) -> bool {
        !matches!(self, ToolchangePhase::Idle)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PhaseEvent) -> Self {
        use PhaseEvent::*;
        use ToolchangePhase::*;

        match (self, event) {
            (_, Abort) => Idle,

            (Idle, BeginSwitch) => Parking,
            (Idle, BeginScriptedSwitch) => Traveling,
            (Parking, Parked) => Retracting,
            (Retracting, Retracted) => Traveling,
            (Traveling, Released) => Idle,

            // Priming directly after a switch, or on its own
            (Idle, BeginPrime) | (Traveling, BeginPrime) => Priming,
            (Priming, Primed) => Idle,
            (Priming, BeginWipe) => Wiping,
            (Wiping, Wiped) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }
}
