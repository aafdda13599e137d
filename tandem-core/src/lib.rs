//! Board-agnostic core logic for a dual-extrusion print head
//!
//! This crate contains the toolchange subsystem without any dependency on
//! specific hardware:
//!
//! - Per-extruder retraction bookkeeping
//! - Nozzle, dock and wipe geometry plus the persisted settings record
//! - Motion command model and the facade trait used to reach the planner
//! - Optional user scripts that replace built-in move sequences
//! - The toolchange orchestrator and its phase machine

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod extruder;
pub mod motion;
pub mod retract;
pub mod script;
pub mod station;
pub mod toolchange;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use extruder::{ExtruderIndex, EXTRUDERS};
pub use retract::{ExtruderRetractState, RetractKind};
