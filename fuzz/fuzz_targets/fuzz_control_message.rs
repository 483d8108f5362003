//! Fuzz target: `parse_message`
//!
//! Drives arbitrary text into the inbound message parser and asserts that
//! every payload yields one or two messages and that every rejection
//! renders to a status reply.
//!
//! cargo fuzz run fuzz_control_message

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightctl::app::commands::{ControlMessage, MAX_MESSAGES_PER_PAYLOAD, parse_message};
use lightctl::app::status::StatusMessage;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let msgs = parse_message(raw);
    assert!(!msgs.is_empty(), "every payload gets at least one reply");
    assert!(msgs.len() <= MAX_MESSAGES_PER_PAYLOAD);

    for msg in &msgs {
        if let ControlMessage::Malformed(err) = msg {
            let reply = StatusMessage::from(err);
            assert!(!reply.status.is_empty());
            let _ = reply.to_json();
        }
    }
});
