//! Dock and wipe target resolution
//!
//! The two nozzles are mechanically offset, so reaching the wiper with the
//! secondary nozzle needs a different carriage position than with the
//! primary one. The dock is a fixed cradle and is never offset.
//!
//! The dock lever is asymmetric: parking the primary nozzle pushes the
//! lever down (approach from +Y), parking the secondary pushes it up
//! (approach at dock Y, exit at +Y).

use crate::config::{ExtruderGeometry, StationGeometry};
use crate::extruder::{ExtruderIndex, EXTRUDERS};
use crate::motion::XyPosition;

/// X distance of the pre-dock waypoint from the dock
pub const DOCK_X_OFFSET: f32 = -47.0;

/// Y travel that actuates the dock lever
pub const DOCK_Y_OFFSET: f32 = 10.0;

/// Half-length of the wipe stroke along X
pub const WIPE_X_OFFSET: f32 = 5.5;

/// Half-height of the snip strokes along Y
pub const WIPE_Y_OFFSET: f32 = 4.0;

/// Carriage targets derived from the station and nozzle geometry
#[derive(Debug, Clone, Copy)]
pub struct DockWipeGeometry<'a> {
    station: &'a StationGeometry,
    extruders: &'a [ExtruderGeometry; EXTRUDERS],
}

impl<'a> DockWipeGeometry<'a> {
    /// Create a resolver over the current geometry
    pub fn new(station: &'a StationGeometry, extruders: &'a [ExtruderGeometry; EXTRUDERS]) -> Self {
        Self { station, extruders }
    }

    /// Dock position, independent of the active nozzle
    pub fn dock_target(&self) -> XyPosition {
        self.station.dock
    }

    /// Carriage position that puts nozzle `e` over the wiper
    pub fn wipe_target(&self, e: ExtruderIndex) -> XyPosition {
        let offset = self.extruders[e.as_usize()].offset;
        self.station.wipe.offset(-offset.x, -offset.y)
    }

    /// Pre-dock waypoint used when `outgoing` is about to be parked
    pub fn park_approach(&self, outgoing: ExtruderIndex) -> XyPosition {
        let dock = self.dock_target();
        match outgoing {
            ExtruderIndex::E0 => dock.offset(DOCK_X_OFFSET, DOCK_Y_OFFSET),
            ExtruderIndex::E1 => dock.offset(DOCK_X_OFFSET, 0.0),
        }
    }

    /// Dock release path for `outgoing`: into the dock X, along Y, back out
    pub fn dock_path(&self, outgoing: ExtruderIndex) -> [XyPosition; 3] {
        let dock = self.dock_target();
        let approach = self.park_approach(outgoing);
        match outgoing {
            ExtruderIndex::E0 => [
                XyPosition::new(dock.x, approach.y),
                dock,
                XyPosition::new(approach.x, dock.y),
            ],
            ExtruderIndex::E1 => {
                let lever_up = dock.offset(0.0, DOCK_Y_OFFSET);
                [dock, lever_up, XyPosition::new(approach.x, lever_up.y)]
            }
        }
    }

    /// Wipe pattern around the wipe target of nozzle `e`
    ///
    /// Approach, wipe stroke and two diagonal snip strokes. The parking
    /// stroke is relative to wherever the head ends up and is computed
    /// separately.
    pub fn wipe_path(&self, e: ExtruderIndex) -> [XyPosition; 4] {
        let center = self.wipe_target(e);
        [
            center.offset(-WIPE_X_OFFSET, 0.0),
            center.offset(WIPE_X_OFFSET, 0.0),
            center.offset(-WIPE_X_OFFSET, WIPE_Y_OFFSET),
            center.offset(WIPE_X_OFFSET, -WIPE_Y_OFFSET),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DualSettings;

    #[test]
    fn test_dock_target_ignores_offsets() {
        let settings = DualSettings::new();
        let geometry = DockWipeGeometry::new(&settings.station, &settings.extruders);
        assert_eq!(geometry.dock_target(), XyPosition::new(218.0, 41.0));
    }

    #[test]
    fn test_wipe_target_compensates_offset() {
        let mut settings = DualSettings::new();
        settings.extruder_mut(ExtruderIndex::E1).offset.y = 2.0;
        let geometry = DockWipeGeometry::new(&settings.station, &settings.extruders);

        assert_eq!(geometry.wipe_target(ExtruderIndex::E0), XyPosition::new(90.5, 24.0));
        assert_eq!(geometry.wipe_target(ExtruderIndex::E1), XyPosition::new(72.5, 22.0));
    }

    #[test]
    fn test_dock_paths_are_mirrored_not_identical() {
        let settings = DualSettings::new();
        let geometry = DockWipeGeometry::new(&settings.station, &settings.extruders);

        assert_eq!(
            geometry.park_approach(ExtruderIndex::E0),
            XyPosition::new(171.0, 51.0)
        );
        assert_eq!(
            geometry.dock_path(ExtruderIndex::E0),
            [
                XyPosition::new(218.0, 51.0),
                XyPosition::new(218.0, 41.0),
                XyPosition::new(171.0, 41.0),
            ]
        );

        assert_eq!(
            geometry.park_approach(ExtruderIndex::E1),
            XyPosition::new(171.0, 41.0)
        );
        assert_eq!(
            geometry.dock_path(ExtruderIndex::E1),
            [
                XyPosition::new(218.0, 41.0),
                XyPosition::new(218.0, 51.0),
                XyPosition::new(171.0, 51.0),
            ]
        );
    }

    #[test]
    fn test_wipe_path_centered_on_target() {
        let settings = DualSettings::new();
        let geometry = DockWipeGeometry::new(&settings.station, &settings.extruders);

        let path = geometry.wipe_path(ExtruderIndex::E0);
        assert_eq!(path[0], XyPosition::new(85.0, 24.0));
        assert_eq!(path[1], XyPosition::new(96.0, 24.0));
        assert_eq!(path[2], XyPosition::new(85.0, 28.0));
        assert_eq!(path[3], XyPosition::new(96.0, 20.0));
    }
}
