//! Collaborator traits
//!
//! These traits define the interface between the toolchange logic and the
//! parts of the firmware it drives but does not own.

pub mod motion;
pub mod script;

pub use motion::MotionFacade;
pub use script::{ScriptSource, SourceError};
