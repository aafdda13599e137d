//! User override scripts
//!
//! Plain-text command sequences that replace the built-in toolchange and
//! wipe procedures when present on the card.

pub mod store;

pub use store::{
    LoadSummary, Script, ScriptParseError, ScriptSlot, ScriptStore, SlotStatus, CONFIG_DIR,
    MAX_SCRIPT_LINES, MAX_SCRIPT_SIZE,
};
