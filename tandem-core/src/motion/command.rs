//! Motion commands and their G-code rendering
//!
//! Commands are typed while they are built and rendered to a single
//! G-code line when they reach the motion queue. Coordinates are machine
//! (carriage) coordinates; extrusion is relative to the current E position.

use core::fmt::{self, Write};

use heapless::String;

use super::position::XyPosition;

/// Maximum length of one command line, including user script lines
pub const MAX_CMD_LEN: usize = 96;

/// One rendered command line
pub type CommandLine = String<MAX_CMD_LEN>;

/// A single motion or extrusion command
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionCommand {
    /// Non-extruding XY move (`G0`)
    Travel {
        target: XyPosition,
        /// Feedrate in mm/min
        feedrate: f32,
    },
    /// Filament-only move (`G1 E`); negative length retracts
    Extrude {
        length: f32,
        /// Feedrate in mm/min
        feedrate: f32,
    },
    /// Fixed pause (`G4`)
    Dwell { millis: u32 },
}

impl MotionCommand {
    /// Travel to an XY position
    pub fn travel(target: XyPosition, feedrate: f32) -> Self {
        MotionCommand::Travel { target, feedrate }
    }

    /// Push `length` of filament into the nozzle
    pub fn extrude(length: f32, feedrate: f32) -> Self {
        MotionCommand::Extrude { length, feedrate }
    }

    /// Pull `length` of filament back
    ///
    /// A zero or negative length yields a zero-length move, which is still
    /// emitted so the command sequence stays fixed.
    pub fn retract(length: f32, feedrate: f32) -> Self {
        let length = if length > 0.0 { -length } else { 0.0 };
        MotionCommand::Extrude { length, feedrate }
    }

    /// Wait a fixed time
    pub fn dwell(millis: u32) -> Self {
        MotionCommand::Dwell { millis }
    }

    /// Render to a G-code line
    pub fn render(&self) -> Result<CommandLine, fmt::Error> {
        let mut line = CommandLine::new();
        write!(line, "{}", self)?;
        Ok(line)
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MotionCommand::Travel { target, feedrate } => write!(
                f,
                "G0 X{:.2} Y{:.2} F{:.0}",
                target.x, target.y, feedrate
            ),
            MotionCommand::Extrude { length, feedrate } => {
                write!(f, "G1 E{:.4} F{:.0}", length, feedrate)
            }
            MotionCommand::Dwell { millis } => write!(f, "G4 P{}", millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_travel() {
        let cmd = MotionCommand::travel(XyPosition::new(171.0, 51.0), 12000.0);
        assert_eq!(cmd.render().unwrap().as_str(), "G0 X171.00 Y51.00 F12000");
    }

    #[test]
    fn test_render_extrude_and_retract() {
        let prime = MotionCommand::extrude(2.5, 300.0);
        assert_eq!(prime.render().unwrap().as_str(), "G1 E2.5000 F300");

        let retract = MotionCommand::retract(2.0, 2700.0);
        assert_eq!(retract, MotionCommand::Extrude { length: -2.0, feedrate: 2700.0 });
        assert_eq!(retract.render().unwrap().as_str(), "G1 E-2.0000 F2700");
    }

    #[test]
    fn test_zero_retract_renders_without_sign() {
        let retract = MotionCommand::retract(0.0, 2700.0);
        assert_eq!(retract.render().unwrap().as_str(), "G1 E0.0000 F2700");

        let clamped = MotionCommand::retract(-1.0, 2700.0);
        assert_eq!(clamped, MotionCommand::Extrude { length: 0.0, feedrate: 2700.0 });
    }

    #[test]
    fn test_render_dwell() {
        assert_eq!(MotionCommand::dwell(1500).render().unwrap().as_str(), "G4 P1500");
    }
}
