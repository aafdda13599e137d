//! Toolchange service
//!
//! Owns the orchestrator, the flash storage and the script source. Every
//! state change arrives as a [`ToolchangeRequest`] and is processed to
//! completion before the next one is received.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use tandem_core::config::{DualSettings, TuneLimits};
use tandem_core::script::{LoadSummary, ScriptSlot, SlotStatus};
use tandem_core::toolchange::ToolchangeOrchestrator;
use tandem_core::traits::{MotionFacade, ScriptSource};
use tandem_hal::flash::FlashStorage;

use crate::channels::{ToolchangeReply, ToolchangeRequest};
use crate::settings::{load_settings, save_settings};

/// Single owner of all toolchange state
pub struct ToolchangeService<F, S> {
    orchestrator: ToolchangeOrchestrator,
    storage: F,
    scripts: S,
    limits: TuneLimits,
}

impl<F: FlashStorage, S: ScriptSource> ToolchangeService<F, S> {
    /// Load settings and scripts and take ownership of both stores
    pub async fn boot(mut storage: F, mut scripts: S, limits: TuneLimits) -> Self {
        let settings = load_settings(&mut storage).await;
        let mut orchestrator = ToolchangeOrchestrator::new(settings);

        let summary = orchestrator.scripts_mut().load(&mut scripts).await;
        log_load_summary(&summary);

        Self {
            orchestrator,
            storage,
            scripts,
            limits,
        }
    }

    /// Toolchange state, for status display
    pub fn orchestrator(&self) -> &ToolchangeOrchestrator {
        &self.orchestrator
    }

    /// Calibration ranges in effect
    pub fn limits(&self) -> &TuneLimits {
        &self.limits
    }

    /// Process one request to completion
    pub async fn handle<M: MotionFacade>(
        &mut self,
        motion: &mut M,
        request: ToolchangeRequest,
    ) -> ToolchangeReply {
        match request {
            ToolchangeRequest::Switch {
                target,
                retract_previous,
            } => {
                info!("Toolchange to {:?}", target);
                match self
                    .orchestrator
                    .switch_to(motion, target, retract_previous)
                    .await
                {
                    Ok(outcome) => {
                        debug!("Toolchange finished: {:?}", outcome);
                        ToolchangeReply::Switched(outcome)
                    }
                    Err(e) => {
                        warn!("Toolchange refused: {:?}", e);
                        ToolchangeReply::Rejected(e)
                    }
                }
            }

            ToolchangeRequest::Prime(extruder) => {
                let mode = self.orchestrator.prime(motion, extruder).await;
                info!("Primed {:?}: {:?}", extruder, mode);
                ToolchangeReply::Primed(mode)
            }

            ToolchangeRequest::SwitchAndPrime {
                target,
                retract_previous,
            } => {
                info!("Toolchange and prime {:?}", target);
                match self
                    .orchestrator
                    .switch_and_prime(motion, target, retract_previous)
                    .await
                {
                    Ok((outcome, mode)) => ToolchangeReply::SwitchedAndPrimed(outcome, mode),
                    Err(e) => {
                        warn!("Toolchange refused: {:?}", e);
                        ToolchangeReply::Rejected(e)
                    }
                }
            }

            ToolchangeRequest::PrintRetracted { extruder, length } => {
                self.orchestrator
                    .retract_state_mut()
                    .mark_print_retracted(extruder, length);
                ToolchangeReply::Done
            }

            ToolchangeRequest::PrintRecovered(extruder) => {
                // A pending toolchange retraction is only undone by priming
                let state = self.orchestrator.retract_state_mut();
                if !state.kind(extruder).is_toolchange() {
                    state.clear(extruder);
                }
                ToolchangeReply::Done
            }

            ToolchangeRequest::BeginPrint => {
                self.orchestrator.begin_print();
                ToolchangeReply::Done
            }

            ToolchangeRequest::EndOfPrint => {
                let retracted = self.orchestrator.end_of_print_retract(motion).await;
                ToolchangeReply::EndOfPrint { retracted }
            }

            ToolchangeRequest::Abort => {
                warn!("Motion queue flushed, assuming full toolchange retraction");
                self.orchestrator.abort();
                ToolchangeReply::Done
            }

            ToolchangeRequest::ReloadScripts => {
                let summary = self
                    .orchestrator
                    .scripts_mut()
                    .load(&mut self.scripts)
                    .await;
                log_load_summary(&summary);
                ToolchangeReply::ScriptsLoaded(summary)
            }

            ToolchangeRequest::SetDock(position) => {
                let limits = self.limits;
                self.settings_mut().station.set_dock(position, &limits);
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetWipe(position) => {
                let limits = self.limits;
                self.settings_mut().station.set_wipe(position, &limits);
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetRetract {
                extruder,
                length,
                feedrate,
                prime,
            } => {
                let limits = self.limits;
                let geometry = self.settings_mut().extruder_mut(extruder);
                geometry.set_retract_length(length, &limits);
                geometry.set_retract_feedrate(feedrate, &limits);
                geometry.set_prime_length(prime, &limits);
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetNozzleOffset { extruder, offset } => {
                let limits = self.limits;
                self.settings_mut()
                    .extruder_mut(extruder)
                    .set_offset(offset, &limits);
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetVolumeFactor { extruder, factor } => {
                let limits = self.limits;
                self.settings_mut()
                    .extruder_mut(extruder)
                    .set_volume_to_length(factor, &limits);
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetToolchangeScriptsEnabled(enabled) => {
                self.settings_mut().mode.toolchange_scripts_enabled = enabled;
                ToolchangeReply::Done
            }

            ToolchangeRequest::SetWipeEnabled(enabled) => {
                self.settings_mut().mode.wipe_enabled = enabled;
                ToolchangeReply::Done
            }

            ToolchangeRequest::StoreSettings => {
                match save_settings(&mut self.storage, self.orchestrator.settings_mut()).await {
                    Ok(()) => ToolchangeReply::Stored,
                    Err(e) => {
                        error!("Failed to store dual settings: {:?}", e);
                        ToolchangeReply::StoreFailed(e)
                    }
                }
            }

            ToolchangeRequest::ResetSettings => {
                info!("Dual settings reset to defaults");
                *self.settings_mut() = DualSettings::new();
                ToolchangeReply::Done
            }
        }
    }

    /// Service loop: receive requests forever and publish each reply
    pub async fn run<M, R, const N: usize>(
        &mut self,
        motion: &mut M,
        requests: &Channel<R, ToolchangeRequest, N>,
        replies: &Signal<R, ToolchangeReply>,
    ) where
        M: MotionFacade,
        R: RawMutex,
    {
        info!("Toolchange service started");

        loop {
            let request = requests.receive().await;
            debug!("Request: {:?}", request);
            let reply = self.handle(motion, request).await;
            replies.signal(reply);
        }
    }

    fn settings_mut(&mut self) -> &mut DualSettings {
        self.orchestrator.settings_mut()
    }
}

fn log_load_summary(summary: &LoadSummary) {
    if !summary.mounted {
        info!("No card, using built-in toolchange moves");
        return;
    }
    for (slot, status) in ScriptSlot::ALL.iter().zip(summary.slots.iter()) {
        match status {
            SlotStatus::Loaded(count) => {
                info!("Script {}: {} commands", slot.file_name(), count)
            }
            SlotStatus::Absent => debug!("Script {}: built-in", slot.file_name()),
            SlotStatus::Unreadable(e) => {
                warn!("Script {} unreadable ({:?}), using built-in", slot.file_name(), e)
            }
            SlotStatus::Rejected(e) => {
                warn!("Script {} rejected ({:?}), using built-in", slot.file_name(), e)
            }
        }
    }
}
