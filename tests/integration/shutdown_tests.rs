//! Integration tests for the polling loop and the shutdown sequence.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use lightctl::drivers::lm36011::Register;

use super::mock_hw::{HwCall, ScriptedSource, drain, rig, status};

const FLASH: u8 = Register::Flash.addr();
const FLAGS: u8 = Register::Flags.addr();

/// Shutdown parks the current at 1 mA (register code 0), reads the flags,
/// releases the select line and only then reports "Dead".
fn shutdown_sequence() -> [HwCall; 4] {
    [
        HwCall::RegWrite { reg: FLASH, value: 0 },
        HwCall::RegRead { reg: FLAGS },
        HwCall::SelectLow,
        status("Dead"),
    ]
}

#[test]
fn shutdown_runs_in_order_and_says_dead_once() {
    let mut rig = rig();
    let (_bus, _select) = rig.controller.shutdown(&mut rig.sink);

    assert_eq!(drain(&rig.journal), shutdown_sequence());
}

#[test]
fn shutdown_completes_even_when_the_bus_fails() {
    let mut rig = rig();
    rig.faults.set(Some(Register::Flash));

    let _released = rig.controller.shutdown(&mut rig.sink);

    assert_eq!(
        drain(&rig.journal),
        [HwCall::RegRead { reg: FLAGS }, HwCall::SelectLow, status("Dead")]
    );
}

#[test]
fn run_returns_immediately_when_already_stopped() {
    let mut rig = rig();
    let stop = AtomicBool::new(true);
    let mut source = ScriptedSource::new(&[r#"{"action":"on"}"#]);

    rig.controller.run(&mut source, &mut rig.sink, &stop);

    assert_eq!(source.polls, 0);
    assert!(rig.take().is_empty());
}

#[test]
fn in_flight_command_completes_before_shutdown() {
    let mut rig = rig();
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = ScriptedSource::stopping(
        &[r#"{"settings":{"current":20}}"#, r#"{"action":"on"}"#],
        Arc::clone(&stop),
    );

    // Stop is raised while the second payload is being handed out.
    rig.controller.run(&mut source, &mut rig.sink, &stop);
    assert_eq!(source.polls, 2, "the loop sees stop right after the in-flight command");
    assert!(rig.controller.device_state());

    let _released = rig.controller.shutdown(&mut rig.sink);

    let mut expected = vec![
        HwCall::RegWrite { reg: FLASH, value: 1 },
        status("Current set to 20mA"),
        HwCall::SelectHigh,
        status("Led 1: On"),
    ];
    expected.extend(shutdown_sequence());
    assert_eq!(drain(&rig.journal), expected);
}

#[test]
fn idle_polls_produce_no_traffic() {
    let mut rig = rig();
    let mut source = ScriptedSource::new(&[]);

    for _ in 0..5 {
        assert!(!rig.controller.poll_once(&mut source, &mut rig.sink));
    }
    assert!(rig.take().is_empty());
}
