//! Motion profile for toolchange and wipe moves
//!
//! The retraction fractions are tuned for the stock wiper assembly.
//! Their sum is the amount left outstanding after a wipe.

/// Travel to the pre-dock waypoint (mm/min)
pub const PARK_FEEDRATE: f32 = 200.0 * 60.0;

/// Moves inside the dock (mm/min)
pub const DOCK_FEEDRATE: f32 = 50.0 * 60.0;

/// Travel to the wiper (mm/min)
pub const WIPE_TRAVEL_FEEDRATE: f32 = 150.0 * 60.0;

/// Wipe and snip strokes (mm/min)
pub const WIPE_STROKE_FEEDRATE: f32 = 50.0 * 60.0;

/// Extra priming after a toolchange (mm/min)
pub const PRIME_FEEDRATE: f32 = 5.0 * 60.0;

/// Pause after priming so oozed filament stops dripping
pub const WIPE_SETTLE_DWELL_MS: u32 = 2000;

/// Parking stroke after the snips, along +Y from the final snip position
pub const WIPE_PARK_STROKE_Y: f32 = 8.0;

/// Retraction before the wipe pass, as a fraction of the nominal length
pub const PRE_WIPE_RETRACT_FRACTION: f32 = 0.4;

/// Retraction after the wipe pass, as a fraction of the nominal length
pub const FINAL_WIPE_RETRACT_FRACTION: f32 = 0.1;

/// Retraction left outstanding after a built-in wipe
pub const WIPE_OUTSTANDING_FRACTION: f32 = 0.5;
