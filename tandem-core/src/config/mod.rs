//! Configuration types
//!
//! Geometry and feature settings for the dual head, persisted as one
//! postcard record guarded by a magic number, version tag and CRC.

pub mod geometry;
pub mod settings;

pub use geometry::*;
pub use settings::*;
