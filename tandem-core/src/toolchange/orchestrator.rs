//! Toolchange orchestrator
//!
//! Owns the retraction record, the settings record and the script store,
//! and turns toolchange requests into motion commands for the
//! [`MotionFacade`]. All mutation of that state goes through `&mut self`,
//! so a single owner serializes every toolchange.

use crate::config::DualSettings;
use crate::extruder::ExtruderIndex;
use crate::motion::MotionCommand;
use crate::retract::ExtruderRetractState;
use crate::script::{ScriptSlot, ScriptStore};
use crate::station::DockWipeGeometry;
use crate::traits::MotionFacade;

use super::phase::{PhaseEvent, ToolchangePhase};
use super::profile::*;

/// Toolchange failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToolchangeError {
    /// X or Y position unknown; the caller must home first
    HeadNotHomed,
}

/// Result of [`ToolchangeOrchestrator::switch_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchOutcome {
    /// Requested extruder was already active; nothing emitted
    AlreadyActive,
    /// Active extruder changed
    Switched {
        from: ExtruderIndex,
        to: ExtruderIndex,
        /// Dock travel came from a user script
        scripted: bool,
    },
}

/// How [`ToolchangeOrchestrator::prime`] finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrimeMode {
    /// Wipe disabled: undo and prime only
    Plain,
    /// Built-in wipe pattern
    BuiltInWipe,
    /// Wipe script with this many commands
    ScriptedWipe { commands: usize },
}

/// Toolchange state owner
#[derive(Debug, Clone)]
pub struct ToolchangeOrchestrator {
    settings: DualSettings,
    retract: ExtruderRetractState,
    scripts: ScriptStore,
    phase: ToolchangePhase,
}

impl ToolchangeOrchestrator {
    /// Create an orchestrator with nothing retracted and no scripts
    pub fn new(settings: DualSettings) -> Self {
        Self {
            settings,
            retract: ExtruderRetractState::new(),
            scripts: ScriptStore::new(),
            phase: ToolchangePhase::Idle,
        }
    }

    /// Current geometry and feature flags
    pub fn settings(&self) -> &DualSettings {
        &self.settings
    }

    /// Mutable settings for the calibration layer
    pub fn settings_mut(&mut self) -> &mut DualSettings {
        &mut self.settings
    }

    /// Retraction record
    pub fn retract_state(&self) -> &ExtruderRetractState {
        &self.retract
    }

    /// Mutable retraction record, used by in-print retract/recover
    pub fn retract_state_mut(&mut self) -> &mut ExtruderRetractState {
        &mut self.retract
    }

    /// Loaded user scripts
    pub fn scripts(&self) -> &ScriptStore {
        &self.scripts
    }

    /// Mutable script store, for reloads
    pub fn scripts_mut(&mut self) -> &mut ScriptStore {
        &mut self.scripts
    }

    /// Step in progress
    pub fn phase(&self) -> ToolchangePhase {
        self.phase
    }

    /// Dock and wipe targets for the current settings
    pub fn geometry(&self) -> DockWipeGeometry<'_> {
        DockWipeGeometry::new(&self.settings.station, &self.settings.extruders)
    }

    /// Full toolchange retraction of `e` in extrusion units
    pub fn nominal_retract_length(&self, e: ExtruderIndex) -> f32 {
        self.settings.extruder(e).nominal_retract_length()
    }

    /// Length a toolchange retraction of `e` would command right now
    ///
    /// Whatever is already outstanding counts against the nominal length,
    /// never below zero.
    pub fn toolchange_retract_delta(&self, e: ExtruderIndex) -> f32 {
        let outstanding = self.retract.recoverable_length(e);
        (self.nominal_retract_length(e) - outstanding).max(0.0)
    }

    fn advance(&mut self, event: PhaseEvent) {
        self.phase = self.phase.transition(event);
    }

    /// Queue the toolchange retraction of `e` and record it
    ///
    /// The command is always emitted, with zero length when nothing is left
    /// to retract. The record then holds the full nominal length.
    async fn retract_for_toolchange<M: MotionFacade>(&mut self, motion: &mut M, e: ExtruderIndex) {
        let delta = self.toolchange_retract_delta(e);
        let nominal = self.nominal_retract_length(e);
        let feedrate = self.settings.extruder(e).retract_feedrate;
        motion.enqueue(&MotionCommand::retract(delta, feedrate)).await;
        self.retract.mark_toolchange_retracted(e, nominal);
    }

    /// Switch the active extruder
    ///
    /// Parks the outgoing nozzle, optionally retracts it and releases the
    /// dock. A user script for the incoming extruder replaces all three
    /// steps when toolchange scripts are enabled; it then owns any retraction it needs and the record is left
    /// as is. The new extruder is selected only after the queue drained.
    pub async fn switch_to<M: MotionFacade>(
        &mut self,
        motion: &mut M,
        target: ExtruderIndex,
        retract_previous: bool,
    ) -> Result<SwitchOutcome, ToolchangeError> {
        let outgoing = motion.active_extruder();
        if outgoing == target {
            return Ok(SwitchOutcome::AlreadyActive);
        }
        if !motion.known_axes().head_known() {
            return Err(ToolchangeError::HeadNotHomed);
        }

        let slot = ScriptSlot::for_extruder(target);
        let scripted = self.settings.mode.toolchange_scripts_enabled && self.scripts.has(slot);

        if scripted {
            self.advance(PhaseEvent::BeginScriptedSwitch);
            self.scripts.run(slot, motion).await;
        } else {
            let geometry = self.geometry();
            let approach = geometry.park_approach(outgoing);
            let dock_path = geometry.dock_path(outgoing);

            self.advance(PhaseEvent::BeginSwitch);
            motion
                .enqueue(&MotionCommand::travel(approach, PARK_FEEDRATE))
                .await;
            self.advance(PhaseEvent::Parked);

            if retract_previous {
                self.retract_for_toolchange(motion, outgoing).await;
            }
            self.advance(PhaseEvent::Retracted);

            for waypoint in dock_path {
                motion
                    .enqueue(&MotionCommand::travel(waypoint, DOCK_FEEDRATE))
                    .await;
            }
        }

        motion.wait_for_queue_drain().await;
        motion.set_active_extruder(target);
        self.advance(PhaseEvent::Released);

        Ok(SwitchOutcome::Switched {
            from: outgoing,
            to: target,
            scripted,
        })
    }

    /// Refill nozzle `e` after a toolchange
    ///
    /// `e` must be the active extruder. Call at most once per toolchange:
    /// the undo step restores whatever the record holds, so a second call
    /// over-extrudes.
    pub async fn prime<M: MotionFacade>(&mut self, motion: &mut M, e: ExtruderIndex) -> PrimeMode {
        let geometry = *self.settings.extruder(e);
        let nominal = geometry.nominal_retract_length();
        let recoverable = self.retract.recoverable_length(e);

        self.advance(PhaseEvent::BeginPrime);
        motion
            .enqueue(&MotionCommand::extrude(recoverable, geometry.retract_feedrate))
            .await;
        motion
            .enqueue(&MotionCommand::extrude(
                geometry.nominal_prime_length(),
                PRIME_FEEDRATE,
            ))
            .await;

        if !self.settings.mode.wipe_enabled {
            self.retract.clear(e);
            self.advance(PhaseEvent::Primed);
            return PrimeMode::Plain;
        }

        let pre_wipe = nominal * PRE_WIPE_RETRACT_FRACTION;
        motion
            .enqueue(&MotionCommand::retract(pre_wipe, geometry.retract_feedrate))
            .await;
        self.advance(PhaseEvent::BeginWipe);

        let mode = if self.scripts.has(ScriptSlot::Wipe) {
            let commands = self.scripts.run(ScriptSlot::Wipe, motion).await;
            self.retract.mark_toolchange_retracted(e, pre_wipe);
            PrimeMode::ScriptedWipe { commands }
        } else {
            let [approach, stroke, snip_out, snip_back] = self.geometry().wipe_path(e);

            motion
                .enqueue(&MotionCommand::dwell(WIPE_SETTLE_DWELL_MS))
                .await;
            motion
                .enqueue(&MotionCommand::travel(approach, WIPE_TRAVEL_FEEDRATE))
                .await;
            for target in [stroke, snip_out, snip_back] {
                motion
                    .enqueue(&MotionCommand::travel(target, WIPE_STROKE_FEEDRATE))
                    .await;
            }

            // Parking stroke starts from wherever the snips left the head
            motion.wait_for_queue_drain().await;
            let park = motion.position().offset(0.0, WIPE_PARK_STROKE_Y);
            motion
                .enqueue(&MotionCommand::travel(park, WIPE_STROKE_FEEDRATE))
                .await;
            motion
                .enqueue(&MotionCommand::retract(
                    nominal * FINAL_WIPE_RETRACT_FRACTION,
                    geometry.retract_feedrate,
                ))
                .await;

            self.retract
                .mark_toolchange_retracted(e, nominal * WIPE_OUTSTANDING_FRACTION);
            PrimeMode::BuiltInWipe
        };

        self.advance(PhaseEvent::Wiped);
        mode
    }

    /// Switch to `target` and prime it, as done at print start
    pub async fn switch_and_prime<M: MotionFacade>(
        &mut self,
        motion: &mut M,
        target: ExtruderIndex,
        retract_previous: bool,
    ) -> Result<(SwitchOutcome, PrimeMode), ToolchangeError> {
        let outcome = self.switch_to(motion, target, retract_previous).await?;
        let mode = self.prime(motion, target).await;
        Ok((outcome, mode))
    }

    /// Leave the active extruder toolchange-retracted at the end of a print
    ///
    /// Returns false when it already was and nothing was emitted.
    pub async fn end_of_print_retract<M: MotionFacade>(&mut self, motion: &mut M) -> bool {
        let active = motion.active_extruder();
        if self.retract.kind(active).is_toolchange() {
            return false;
        }
        self.retract_for_toolchange(motion, active).await;
        true
    }

    /// Forget print retractions from a previous print
    pub fn begin_print(&mut self) {
        self.retract.clear_print_retractions();
    }

    /// Recover after the motion queue was flushed by a higher layer
    ///
    /// The record can no longer be trusted, so every extruder is assumed
    /// fully toolchange-retracted.
    pub fn abort(&mut self) {
        self.advance(PhaseEvent::Abort);
        self.retract
            .force_after_abort(self.settings.nominal_retract_lengths());
    }
}
