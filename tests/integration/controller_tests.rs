//! Integration tests for the message → controller → LM36011 pipeline.
//!
//! Every test asserts the full journal of bus traffic, select-line writes
//! and status replies produced by one inbound payload.

use std::rc::Rc;

use lightctl::app::controller::{Controller, Phase};
use lightctl::drivers::lm36011::{ChipId, FaultFlags, Lm36011, Register};
use lightctl::error::{DriverError, StartupError};

use embedded_hal::i2c::ErrorKind;

use super::mock_hw::{
    CHIP_ID, FaultSwitch, HwCall, Journal, MockBus, MockSelectPin, RecordingSink, SelectFault,
    rig, rig_with, status, test_config,
};

const FLASH: u8 = Register::Flash.addr();
const FLAGS: u8 = Register::Flags.addr();
const ID_RESET: u8 = Register::IdReset.addr();

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn startup_selects_resets_clears_flags_reads_id_then_reports_ready() {
    let journal: Journal = Rc::default();
    let faults: FaultSwitch = Rc::default();
    let mut bus = MockBus::new(Rc::clone(&journal), faults);
    bus.latch_flags(FaultFlags::THERMAL_SCALE | FaultFlags::IVFM);
    let driver = Lm36011::new(bus, MockSelectPin::new(Rc::clone(&journal)));
    let mut sink = RecordingSink::new(Rc::clone(&journal));

    let mut ctl = Controller::new(driver, test_config()).unwrap();
    ctl.start(&mut sink);

    assert_eq!(ctl.chip_id(), ChipId(CHIP_ID));
    assert!(!ctl.device_state(), "light starts off");
    assert_eq!(
        *journal.borrow(),
        [
            HwCall::SelectHigh,
            HwCall::RegWrite { reg: ID_RESET, value: 0b1000_0000 },
            HwCall::RegRead { reg: FLAGS },
            HwCall::RegRead { reg: ID_RESET },
            status("Ready"),
        ]
    );
}

#[test]
fn startup_bus_fault_is_fatal_and_releases_the_select_line() {
    let journal: Journal = Rc::default();
    let faults: FaultSwitch = Rc::default();
    faults.set(Some(Register::IdReset));
    let bus = MockBus::new(Rc::clone(&journal), faults);
    let driver = Lm36011::new(bus, MockSelectPin::new(Rc::clone(&journal)));

    let Err(failed) = Controller::new(driver, test_config()) else {
        panic!("reset write fault must abort start-up");
    };
    assert_eq!(
        failed.cause,
        StartupError::Driver(DriverError::BusFault(ErrorKind::Bus))
    );
    assert_eq!(*journal.borrow(), [HwCall::SelectHigh, HwCall::SelectLow]);
}

#[test]
fn startup_select_fault_is_fatal_without_bus_traffic() {
    let journal: Journal = Rc::default();
    let select_fault: SelectFault = Rc::default();
    select_fault.set(true);
    let bus = MockBus::new(Rc::clone(&journal), Rc::default());
    let select = MockSelectPin::with_fault(Rc::clone(&journal), select_fault);
    let driver = Lm36011::new(bus, select);

    let Err(failed) = Controller::new(driver, test_config()) else {
        panic!("select fault must abort start-up");
    };
    assert_eq!(failed.cause, StartupError::Driver(DriverError::SelectLine));
    assert_eq!(*journal.borrow(), [HwCall::SelectLow]);
}

// ── On / off ──────────────────────────────────────────────────

#[test]
fn turn_on_selects_channel_once_and_replies() {
    let mut rig = rig();
    let calls = rig.send(r#"{"action":"on"}"#);

    assert_eq!(calls, [HwCall::SelectHigh, status("Led 1: On")]);
    assert!(rig.controller.device_state());
    assert_eq!(rig.controller.phase(), Phase::Idle);
}

#[test]
fn turn_off_only_changes_tracked_state() {
    let mut rig = rig();
    rig.send(r#"{"action":"on"}"#);

    let calls = rig.send(r#"{"action":"off","led":"1"}"#);

    assert_eq!(calls, [status("Led 1: Off")], "off must not touch the chip");
    assert!(!rig.controller.device_state());
}

#[test]
fn other_led_index_is_refused_without_chip_access() {
    let mut rig = rig();
    let calls = rig.send(r#"{"action":"on","led":2}"#);

    assert_eq!(calls, [status("Led 2 is not available")]);
    assert!(!rig.controller.device_state());
}

#[test]
fn led_index_beyond_a_byte_is_refused_as_unavailable() {
    let mut rig = rig();
    let calls = rig.send(r#"{"action":"on","led":256}"#);

    assert_eq!(calls, [status("Led 256 is not available")]);
    assert!(!rig.controller.device_state());
}

#[test]
fn select_fault_on_turn_on_is_reported_and_loop_survives() {
    let mut rig = rig();
    rig.select_fault.set(true);

    let calls = rig.send(r#"{"action":"on"}"#);
    assert_eq!(
        calls,
        [status("Error while turning Led 1 on, power cycle your machine")]
    );
    assert!(!rig.controller.device_state(), "light stays off");

    rig.select_fault.set(false);
    let calls = rig.send(r#"{"action":"on"}"#);
    assert_eq!(calls, [HwCall::SelectHigh, status("Led 1: On")]);
    assert!(rig.controller.device_state());
}

#[test]
fn unknown_action_gets_a_reply_and_no_chip_access() {
    let mut rig = rig();
    let calls = rig.send(r#"{"action":"strobe"}"#);

    assert_eq!(calls.len(), 1);
    let HwCall::Status(text) = &calls[0] else {
        panic!("expected a status reply, got {:?}", calls[0]);
    };
    assert!(text.starts_with("Action not understood in"), "got {text}");
    assert!(text.contains("strobe"));
}

// ── Current ───────────────────────────────────────────────────

#[test]
fn set_current_while_off_writes_mapped_register() {
    let mut rig = rig();
    let calls = rig.send(r#"{"settings":{"current":20}}"#);

    assert_eq!(
        calls,
        [
            HwCall::RegWrite { reg: FLASH, value: 1 },
            status("Current set to 20mA"),
        ]
    );
}

#[test]
fn set_current_accepts_string_values() {
    let mut rig = rig();
    let calls = rig.send(r#"{"settings":{"current":"1000"}}"#);

    assert_eq!(
        calls,
        [
            HwCall::RegWrite { reg: FLASH, value: 85 },
            status("Current set to 1000mA"),
        ]
    );
}

#[test]
fn set_current_while_on_is_refused() {
    let mut rig = rig();
    rig.send(r#"{"action":"on"}"#);

    let calls = rig.send(r#"{"settings":{"current":20}}"#);

    assert_eq!(calls, [status("Turn off the LED before changing the current")]);
    assert!(rig.controller.device_state(), "refusal leaves the light on");
}

#[test]
fn set_current_after_turning_off_is_allowed() {
    let mut rig = rig();
    rig.send(r#"{"action":"on"}"#);
    rig.send(r#"{"action":"off"}"#);

    let calls = rig.send(r#"{"settings":{"current":500}}"#);

    assert_eq!(
        calls,
        [
            HwCall::RegWrite { reg: FLASH, value: 42 },
            status("Current set to 500mA"),
        ]
    );
}

#[test]
fn out_of_range_current_is_refused() {
    let mut rig = rig();
    for raw in [
        r#"{"settings":{"current":0}}"#,
        r#"{"settings":{"current":10}}"#,
        r#"{"settings":{"current":1501}}"#,
    ] {
        let calls = rig.send(raw);
        assert_eq!(calls, [status("Current must be between 11 and 1500mA")], "{raw}");
    }
}

#[test]
fn current_write_failure_is_reported_and_loop_survives() {
    let mut rig = rig();
    rig.faults.set(Some(Register::Flash));

    let calls = rig.send(r#"{"settings":{"current":20}}"#);
    assert_eq!(
        calls,
        [status("Error while setting the current, power cycle your machine")]
    );

    rig.faults.set(None);
    let calls = rig.send(r#"{"settings":{"current":20}}"#);
    assert_eq!(
        calls,
        [
            HwCall::RegWrite { reg: FLASH, value: 1 },
            status("Current set to 20mA"),
        ]
    );
}

#[test]
fn settings_without_known_key_is_refused() {
    let mut rig = rig();
    let calls = rig.send(r#"{"settings":{"exposure":3}}"#);

    assert_eq!(calls.len(), 1);
    let HwCall::Status(text) = &calls[0] else {
        panic!("expected a status reply, got {:?}", calls[0]);
    };
    assert!(text.starts_with("Settings request not understood in"), "got {text}");
}

// ── Malformed ─────────────────────────────────────────────────

#[test]
fn message_without_action_or_settings_is_refused() {
    let mut rig = rig();
    let calls = rig.send(r#"{"foo":"bar"}"#);

    assert_eq!(
        calls,
        [status("Received message did not contain action or settings")]
    );
}

#[test]
fn non_json_payload_is_refused() {
    let mut rig = rig();
    let calls = rig.send("turn it on please");

    assert_eq!(
        calls,
        [status("Received message did not contain action or settings")]
    );
}

// ── Combined payloads ─────────────────────────────────────────

#[test]
fn action_and_settings_are_both_processed_action_first() {
    let mut rig = rig();
    let calls = rig.send(r#"{"settings":{"current":100},"action":"off"}"#);

    assert_eq!(
        calls,
        [
            status("Led 1: Off"),
            HwCall::RegWrite { reg: FLASH, value: 8 },
            status("Current set to 100mA"),
        ]
    );
}

#[test]
fn turning_on_gates_a_current_change_in_the_same_payload() {
    let mut rig = rig_with(|_| {});
    let calls = rig.send(r#"{"action":"on","settings":{"current":100}}"#);

    assert_eq!(
        calls,
        [
            HwCall::SelectHigh,
            status("Led 1: On"),
            status("Turn off the LED before changing the current"),
        ]
    );
}
