//! Test doubles for the collaborator traits

use std::string::{String, ToString};
use std::vec::Vec;

use crate::extruder::ExtruderIndex;
use crate::motion::{KnownAxes, MotionCommand, XyPosition};
use crate::traits::{MotionFacade, ScriptSource, SourceError};

/// Something the orchestrator did to the motion facade
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    Queued(MotionCommand),
    Executed(MotionCommand),
    Line(String),
    Drain,
    Select(ExtruderIndex),
}

/// Motion facade that records every call and tracks the head position
pub struct RecordingMotion {
    pub events: Vec<MotionEvent>,
    pub known: KnownAxes,
    pub active: ExtruderIndex,
    pub head: XyPosition,
}

impl RecordingMotion {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            known: KnownAxes::all(),
            active: ExtruderIndex::E0,
            head: XyPosition::new(100.0, 100.0),
        }
    }

    pub fn unhomed() -> Self {
        Self {
            known: KnownAxes::none(),
            ..Self::new()
        }
    }

    pub fn with_active(mut self, e: ExtruderIndex) -> Self {
        self.active = e;
        self
    }

    /// Commands that reached the queue, in order
    pub fn commands(&self) -> Vec<MotionCommand> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MotionEvent::Queued(cmd) | MotionEvent::Executed(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    /// Everything sent to the engine, rendered as G-code
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                MotionEvent::Queued(cmd) | MotionEvent::Executed(cmd) => Some(cmd.to_string()),
                MotionEvent::Line(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn track(&mut self, command: &MotionCommand) {
        if let MotionCommand::Travel { target, .. } = command {
            self.head = *target;
        }
    }
}

impl MotionFacade for RecordingMotion {
    async fn enqueue(&mut self, command: &MotionCommand) {
        self.track(command);
        self.events.push(MotionEvent::Queued(*command));
    }

    async fn execute_now(&mut self, command: &MotionCommand) {
        self.track(command);
        self.events.push(MotionEvent::Executed(*command));
    }

    async fn execute_line(&mut self, line: &str) {
        self.events.push(MotionEvent::Line(line.to_string()));
    }

    async fn wait_for_queue_drain(&mut self) {
        self.events.push(MotionEvent::Drain);
    }

    fn active_extruder(&self) -> ExtruderIndex {
        self.active
    }

    fn set_active_extruder(&mut self, e: ExtruderIndex) {
        self.active = e;
        self.events.push(MotionEvent::Select(e));
    }

    fn known_axes(&self) -> KnownAxes {
        self.known
    }

    fn position(&self) -> XyPosition {
        self.head
    }
}

/// Script source backed by in-memory files
pub struct MemoryScripts {
    mounted: bool,
    files: Vec<(String, Result<String, SourceError>)>,
}

impl MemoryScripts {
    pub fn mounted() -> Self {
        Self {
            mounted: true,
            files: Vec::new(),
        }
    }

    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            files: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.files.push((name.to_string(), Ok(text.to_string())));
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.files
            .push((name.to_string(), Err(SourceError::Unreadable)));
        self
    }
}

impl ScriptSource for MemoryScripts {
    async fn mount(&mut self) -> Result<(), SourceError> {
        if self.mounted {
            Ok(())
        } else {
            Err(SourceError::Unavailable)
        }
    }

    async fn read(&mut self, name: &str, buffer: &mut [u8]) -> Result<usize, SourceError> {
        let (_, content) = self
            .files
            .iter()
            .find(|(file, _)| file == name)
            .ok_or(SourceError::NotFound)?;
        let text = content.as_ref().map_err(|e| *e)?;
        let bytes = text.as_bytes();
        if bytes.len() > buffer.len() {
            return Err(SourceError::Unreadable);
        }
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}
