//! Motion facade trait
//!
//! The only way the toolchange logic affects the machine. Implementations
//! forward commands to the planner queue that feeds step generation.

use crate::extruder::ExtruderIndex;
use crate::motion::{KnownAxes, MotionCommand, XyPosition};

/// Access to the motion queue and the planner's view of the head
///
/// Queued commands are fire-and-forget: `enqueue` waits only for queue
/// space, never for the move itself. Anything that depends on the result
/// of an earlier move must call [`MotionFacade::wait_for_queue_drain`]
/// first.
pub trait MotionFacade {
    /// Append a command to the motion queue
    fn enqueue(&mut self, command: &MotionCommand) -> impl core::future::Future<Output = ()>;

    /// Execute a command and wait until the engine has accepted it
    fn execute_now(&mut self, command: &MotionCommand)
        -> impl core::future::Future<Output = ()>;

    /// Execute one raw command line (user scripts) and wait until accepted
    fn execute_line(&mut self, line: &str) -> impl core::future::Future<Output = ()>;

    /// Wait until every queued command has been consumed
    fn wait_for_queue_drain(&mut self) -> impl core::future::Future<Output = ()>;

    /// Extruder addressed by subsequent extrusion commands
    fn active_extruder(&self) -> ExtruderIndex;

    /// Make `e` the extruder addressed by subsequent extrusion commands
    fn set_active_extruder(&mut self, e: ExtruderIndex);

    /// Axes whose position is known
    fn known_axes(&self) -> KnownAxes;

    /// Head position as last reported by the planner
    ///
    /// Only meaningful after [`MotionFacade::wait_for_queue_drain`].
    fn position(&self) -> XyPosition;
}
