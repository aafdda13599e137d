//! Motion command model
//!
//! Commands the toolchange logic hands to the external motion engine.

pub mod command;
pub mod position;

pub use command::{CommandLine, MotionCommand, MAX_CMD_LEN};
pub use position::{KnownAxes, XyPosition};
