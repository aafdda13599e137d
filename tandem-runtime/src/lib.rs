//! Async integration layer for the dual-extrusion toolchange subsystem
//!
//! Wires the board-agnostic logic in `tandem-core` to the outside world:
//!
//! - [`motion::QueuedMotion`] feeds rendered commands to the motion engine
//!   over an embassy-sync channel
//! - [`settings`] loads and stores the settings record in flash
//! - [`scripts::CardScriptSource`] reads user scripts from the SD card
//! - [`service::ToolchangeService`] is the single owner of all toolchange
//!   state and processes [`channels::ToolchangeRequest`]s in order

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod channels;
pub mod motion;
pub mod scripts;
pub mod service;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use channels::{RequestChannel, ToolchangeReply, ToolchangeRequest};
pub use motion::{MotionShared, MotionStatus, QueuedMotion};
pub use scripts::CardScriptSource;
pub use service::ToolchangeService;
pub use settings::{load_settings, save_settings, SettingsError};
