//! Queued motion facade
//!
//! Commands are rendered to G-code lines and pushed onto a bounded
//! channel drained by the motion engine. The engine reports back through
//! [`MotionStatus`], which both sides share behind a blocking mutex.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use tandem_core::motion::{CommandLine, KnownAxes, MotionCommand, XyPosition};
use tandem_core::traits::MotionFacade;
use tandem_core::ExtruderIndex;

use crate::channels::MotionQueue;

/// Engine state as seen by the toolchange layer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionStatus {
    /// Carriage position after the last completed move
    pub position: XyPosition,
    /// Axes homed since power-on
    pub known: KnownAxes,
    /// A command was taken from the queue and is still executing
    pub busy: bool,
    /// Extruder addressed by extrusion commands
    pub active: ExtruderIndex,
}

impl MotionStatus {
    /// Power-on state: nothing homed, primary extruder selected
    pub const fn new() -> Self {
        Self {
            position: XyPosition::new(0.0, 0.0),
            known: KnownAxes::none(),
            busy: false,
            active: ExtruderIndex::E0,
        }
    }
}

impl Default for MotionStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between the toolchange layer and the motion engine
pub struct MotionShared<M: RawMutex> {
    queue: MotionQueue<M>,
    status: Mutex<M, Cell<MotionStatus>>,
}

impl<M: RawMutex> MotionShared<M> {
    /// Create an empty queue with power-on status
    pub const fn new() -> Self {
        Self {
            queue: MotionQueue::<M>::new(),
            status: Mutex::new(Cell::new(MotionStatus::new())),
        }
    }

    /// Snapshot of the engine status
    pub fn status(&self) -> MotionStatus {
        self.status.lock(|status| status.get())
    }

    /// Modify the engine status
    pub fn update(&self, f: impl FnOnce(&mut MotionStatus)) {
        self.status.lock(|status| {
            let mut value = status.get();
            f(&mut value);
            status.set(value);
        });
    }

    /// Engine side: take the next command and mark the engine busy
    pub async fn next_command(&self) -> CommandLine {
        let line = self.queue.receive().await;
        self.update(|status| status.busy = true);
        line
    }

    /// Engine side: the last command finished with the head at `position`
    pub fn command_done(&self, position: XyPosition) {
        self.update(|status| {
            status.position = position;
            status.busy = false;
        });
    }

    /// Engine side: homing finished for the given axes
    pub fn set_known_axes(&self, known: KnownAxes) {
        self.update(|status| status.known = known);
    }

    /// Queue and engine are both idle
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && !self.status().busy
    }
}

impl<M: RawMutex> Default for MotionShared<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`MotionFacade`] over a [`MotionShared`] queue
pub struct QueuedMotion<'a, M: RawMutex> {
    shared: &'a MotionShared<M>,
}

impl<'a, M: RawMutex> QueuedMotion<'a, M> {
    /// Create a facade over `shared`
    pub fn new(shared: &'a MotionShared<M>) -> Self {
        Self { shared }
    }

    async fn push(&mut self, line: CommandLine) {
        debug!("Queue: {}", line.as_str());
        self.shared.queue.send(line).await;
    }
}

impl<M: RawMutex> MotionFacade for QueuedMotion<'_, M> {
    async fn enqueue(&mut self, command: &MotionCommand) {
        match command.render() {
            Ok(line) => self.push(line).await,
            Err(_) => error!("Command does not fit a line: {:?}", command),
        }
    }

    async fn execute_now(&mut self, command: &MotionCommand) {
        self.enqueue(command).await;
        self.wait_for_queue_drain().await;
    }

    async fn execute_line(&mut self, line: &str) {
        let mut command = CommandLine::new();
        if command.push_str(line).is_err() {
            warn!("Skipping overlong command line");
            return;
        }
        self.push(command).await;
        self.wait_for_queue_drain().await;
    }

    async fn wait_for_queue_drain(&mut self) {
        while !self.shared.is_drained() {
            embassy_futures::yield_now().await;
        }
    }

    fn active_extruder(&self) -> ExtruderIndex {
        self.shared.status().active
    }

    fn set_active_extruder(&mut self, e: ExtruderIndex) {
        debug!("Active extruder: {:?}", e);
        self.shared.update(|status| status.active = e);
    }

    fn known_axes(&self) -> KnownAxes {
        self.shared.status().known
    }

    fn position(&self) -> XyPosition {
        self.shared.status().position
    }
}
