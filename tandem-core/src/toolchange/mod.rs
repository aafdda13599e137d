//! Toolchange orchestration
//!
//! Parking, retracting, dock travel, priming and wiping when the active
//! extruder changes.

pub mod orchestrator;
pub mod phase;
pub mod profile;

pub use orchestrator::{PrimeMode, SwitchOutcome, ToolchangeError, ToolchangeOrchestrator};
pub use phase::{PhaseEvent, ToolchangePhase};
