use embassy_futures::block_on;
use proptest::prelude::*;

use tandem_core::config::DualSettings;
use tandem_core::motion::{KnownAxes, MotionCommand, XyPosition};
use tandem_core::toolchange::ToolchangeOrchestrator;
use tandem_core::traits::MotionFacade;
use tandem_core::{ExtruderIndex, ExtruderRetractState, RetractKind};

/// Motion facade that only keeps extrusion lengths
struct ExtrusionLog {
    active: ExtruderIndex,
    extruded: Vec<f32>,
}

impl MotionFacade for ExtrusionLog {
    async fn enqueue(&mut self, command: &MotionCommand) {
        if let MotionCommand::Extrude { length, .. } = command {
            self.extruded.push(*length);
        }
    }

    async fn execute_now(&mut self, command: &MotionCommand) {
        self.enqueue(command).await;
    }

    async fn execute_line(&mut self, _line: &str) {}

    async fn wait_for_queue_drain(&mut self) {}

    fn active_extruder(&self) -> ExtruderIndex {
        self.active
    }

    fn set_active_extruder(&mut self, e: ExtruderIndex) {
        self.active = e;
    }

    fn known_axes(&self) -> KnownAxes {
        KnownAxes::all()
    }

    fn position(&self) -> XyPosition {
        XyPosition::new(100.0, 100.0)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Print(ExtruderIndex, f32),
    Toolchange(ExtruderIndex, f32),
    Clear(ExtruderIndex),
    ClearPrint,
    Abort,
}

fn extruder() -> impl Strategy<Value = ExtruderIndex> {
    prop_oneof![Just(ExtruderIndex::E0), Just(ExtruderIndex::E1)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (extruder(), 0.0f32..50.0).prop_map(|(e, l)| Op::Print(e, l)),
        (extruder(), 0.0f32..50.0).prop_map(|(e, l)| Op::Toolchange(e, l)),
        extruder().prop_map(Op::Clear),
        Just(Op::ClearPrint),
        Just(Op::Abort),
    ]
}

proptest! {
    #[test]
    fn test_record_matches_last_write(ops in proptest::collection::vec(op(), 0..40)) {
        let mut state = ExtruderRetractState::new();
        let mut expected = [RetractKind::NotRetracted; 2];

        for op in ops {
            match op {
                Op::Print(e, l) => {
                    state.mark_print_retracted(e, l);
                    expected[e.as_usize()] = RetractKind::PrintRetracted { recoverable_length: l };
                }
                Op::Toolchange(e, l) => {
                    state.mark_toolchange_retracted(e, l);
                    expected[e.as_usize()] = RetractKind::ToolchangeRetracted { recoverable_length: l };
                }
                Op::Clear(e) => {
                    state.clear(e);
                    expected[e.as_usize()] = RetractKind::NotRetracted;
                }
                Op::ClearPrint => {
                    state.clear_print_retractions();
                    for kind in &mut expected {
                        if let RetractKind::PrintRetracted { .. } = kind {
                            *kind = RetractKind::NotRetracted;
                        }
                    }
                }
                Op::Abort => {
                    state.force_after_abort([16.0, 16.0]);
                    expected = [RetractKind::ToolchangeRetracted { recoverable_length: 16.0 }; 2];
                }
            }

            for e in ExtruderIndex::ALL {
                prop_assert_eq!(state.kind(e), expected[e.as_usize()]);
                prop_assert!(state.recoverable_length(e) >= 0.0);
            }
        }
    }

    #[test]
    fn test_toolchange_mark_does_not_stack(length in 0.0f32..50.0, repeats in 1usize..5) {
        let mut state = ExtruderRetractState::new();
        for _ in 0..repeats {
            state.mark_toolchange_retracted(ExtruderIndex::E1, length);
        }
        prop_assert_eq!(
            state.kind(ExtruderIndex::E1),
            RetractKind::ToolchangeRetracted { recoverable_length: length }
        );
    }

    #[test]
    fn test_switch_never_over_retracts(
        nominal in 0.0f32..50.0,
        outstanding in 0.0f32..60.0,
        toolchange in any::<bool>(),
    ) {
        let mut settings = DualSettings::new();
        settings.extruder_mut(ExtruderIndex::E0).retract_length = nominal;
        let mut tc = ToolchangeOrchestrator::new(settings);
        if toolchange {
            tc.retract_state_mut().mark_toolchange_retracted(ExtruderIndex::E0, outstanding);
        } else {
            tc.retract_state_mut().mark_print_retracted(ExtruderIndex::E0, outstanding);
        }
        let mut motion = ExtrusionLog { active: ExtruderIndex::E0, extruded: Vec::new() };

        let outcome = block_on(tc.switch_to(&mut motion, ExtruderIndex::E1, true));
        prop_assert!(outcome.is_ok());

        prop_assert_eq!(motion.extruded.len(), 1);
        let commanded = -motion.extruded[0];
        prop_assert!(commanded >= 0.0);
        prop_assert!(commanded <= nominal);
        prop_assert_eq!(commanded, (nominal - outstanding).max(0.0));
        prop_assert_eq!(
            tc.retract_state().kind(ExtruderIndex::E0),
            RetractKind::ToolchangeRetracted { recoverable_length: nominal }
        );
    }
}
