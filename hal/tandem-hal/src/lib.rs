//! Tandem Hardware Abstraction Layer
//!
//! Storage traits consumed by the dual-extrusion toolchange subsystem.
//! Chip-specific HALs implement them on top of their flash controller
//! and SD card driver.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  tandem-runtime (service, persistence)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tandem-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ config flash  │       │  SD card      │
//! │  partition    │       │  reader       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key/value storage for settings
//! - [`card::CardReader`] - Removable media holding user scripts

#![no_std]
#![deny(unsafe_code)]

pub mod card;
pub mod flash;

pub use card::{CardError, CardReader};
pub use flash::{FlashError, FlashStorage, StorageKey};
