//! Script loading and execution
//!
//! Each slot holds at most one script. A slot whose file is missing,
//! unreadable or blank holds nothing, and callers fall back to the built-in
//! procedure; an empty script is never stored.

use heapless::Vec;

use crate::extruder::ExtruderIndex;
use crate::motion::{CommandLine, MAX_CMD_LEN};
use crate::traits::{MotionFacade, ScriptSource, SourceError};

/// Directory holding the script files, relative to the card root
pub const CONFIG_DIR: &str = "config";

/// Maximum commands per script
pub const MAX_SCRIPT_LINES: usize = 32;

/// Maximum script file size in bytes
pub const MAX_SCRIPT_SIZE: usize = 2048;

/// Logical script slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptSlot {
    /// Switching to the primary nozzle
    T0,
    /// Switching to the secondary nozzle
    T1,
    /// Wipe pass after priming
    Wipe,
}

impl ScriptSlot {
    /// All slots in load order
    pub const ALL: [ScriptSlot; 3] = [ScriptSlot::T0, ScriptSlot::T1, ScriptSlot::Wipe];

    /// File name inside [`CONFIG_DIR`]
    pub fn file_name(self) -> &'static str {
        match self {
            ScriptSlot::T0 => "T0",
            ScriptSlot::T1 => "T1",
            ScriptSlot::Wipe => "wipe",
        }
    }

    /// Slot run when switching to extruder `e`
    pub fn for_extruder(e: ExtruderIndex) -> Self {
        match e {
            ExtruderIndex::E0 => ScriptSlot::T0,
            ExtruderIndex::E1 => ScriptSlot::T1,
        }
    }

    fn index(self) -> usize {
        match self {
            ScriptSlot::T0 => 0,
            ScriptSlot::T1 => 1,
            ScriptSlot::Wipe => 2,
        }
    }
}

/// Why a script file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptParseError {
    /// A line is not valid UTF-8
    NotUtf8,
    /// A line exceeds [`MAX_CMD_LEN`]
    LineTooLong,
    /// More than [`MAX_SCRIPT_LINES`] commands
    TooManyLines,
}

/// An ordered, non-empty sequence of command lines
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    lines: Vec<CommandLine, MAX_SCRIPT_LINES>,
}

impl Script {
    /// Parse script text
    ///
    /// Trailing whitespace and control characters are stripped from every
    /// line and blank lines are dropped. Returns `Ok(None)` when nothing is
    /// left.
    pub fn parse(text: &[u8]) -> Result<Option<Self>, ScriptParseError> {
        let mut lines = Vec::new();

        for raw in text.split(|&b| b == b'\n') {
            let mut len = raw.len();
            while len > 0 && raw[len - 1] <= b' ' {
                len -= 1;
            }
            if len == 0 {
                continue;
            }
            if len > MAX_CMD_LEN {
                return Err(ScriptParseError::LineTooLong);
            }

            let line = core::str::from_utf8(&raw[..len]).map_err(|_| ScriptParseError::NotUtf8)?;
            let mut command = CommandLine::new();
            command
                .push_str(line)
                .map_err(|_| ScriptParseError::LineTooLong)?;
            lines
                .push(command)
                .map_err(|_| ScriptParseError::TooManyLines)?;
        }

        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self { lines }))
        }
    }

    /// Command lines in execution order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.as_str())
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; empty scripts are never constructed
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Outcome of loading one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotStatus {
    /// Script stored with this many commands
    Loaded(usize),
    /// File missing or blank
    Absent,
    /// Storage could not be read
    Unreadable(SourceError),
    /// File content rejected
    Rejected(ScriptParseError),
}

/// Result of [`ScriptStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadSummary {
    /// Whether the storage medium could be mounted
    pub mounted: bool,
    /// Per-slot outcome, in [`ScriptSlot::ALL`] order
    pub slots: [SlotStatus; 3],
}

impl LoadSummary {
    /// Number of slots holding a script
    pub fn loaded(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, SlotStatus::Loaded(_)))
            .count()
    }
}

/// Owner of all loaded scripts
#[derive(Debug, Clone, Default)]
pub struct ScriptStore {
    scripts: [Option<Script>; 3],
}

impl ScriptStore {
    /// Create an empty store (built-in procedures everywhere)
    pub const fn new() -> Self {
        Self {
            scripts: [None, None, None],
        }
    }

    /// Script in a slot, if any
    pub fn get(&self, slot: ScriptSlot) -> Option<&Script> {
        self.scripts[slot.index()].as_ref()
    }

    /// Check if a slot holds a script
    pub fn has(&self, slot: ScriptSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Replace the script in a slot
    pub fn set(&mut self, slot: ScriptSlot, script: Option<Script>) {
        self.scripts[slot.index()] = script;
    }

    /// Drop every script
    pub fn clear(&mut self) {
        self.scripts = [None, None, None];
    }

    /// Reload all slots from `source`
    ///
    /// Previous scripts are dropped before anything is read. Never fails:
    /// every problem leaves the affected slot empty.
    pub async fn load<S: ScriptSource>(&mut self, source: &mut S) -> LoadSummary {
        self.clear();

        let mut summary = LoadSummary {
            mounted: false,
            slots: [SlotStatus::Unreadable(SourceError::Unavailable); 3],
        };

        if source.mount().await.is_err() {
            return summary;
        }
        summary.mounted = true;

        let mut buffer = [0u8; MAX_SCRIPT_SIZE];
        for slot in ScriptSlot::ALL {
            let status = match source.read(slot.file_name(), &mut buffer).await {
                Ok(len) => match Script::parse(&buffer[..len]) {
                    Ok(Some(script)) => {
                        let count = script.len();
                        self.set(slot, Some(script));
                        SlotStatus::Loaded(count)
                    }
                    Ok(None) => SlotStatus::Absent,
                    Err(e) => SlotStatus::Rejected(e),
                },
                Err(SourceError::NotFound) => SlotStatus::Absent,
                Err(e) => SlotStatus::Unreadable(e),
            };
            summary.slots[slot.index()] = status;
        }

        summary
    }

    /// Execute a slot's commands one at a time
    ///
    /// Yields to the executor between commands so background tasks keep
    /// running. Returns the number of commands executed (0 for an empty slot).
    pub async fn run<M: MotionFacade>(&self, slot: ScriptSlot, motion: &mut M) -> usize {
        let Some(script) = self.get(slot) else {
            return 0;
        };

        let mut count = 0;
        for line in script.lines() {
            motion.execute_line(line).await;
            count += 1;
            embassy_futures::yield_now().await;
        }
        count
    }
}
