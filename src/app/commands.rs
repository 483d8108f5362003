//! Inbound control messages.
//!
//! The message bus hands the controller raw JSON payloads of the shape
//!
//! ```text
//! { "action": "on" | "off", "led": 1, "settings": { "current": 20 } }
//! ```
//!
//! [`parse_message`] turns one payload into at most two
//! [`ControlMessage`]s (action first, then settings).  It never panics:
//! anything it cannot interpret becomes [`ControlMessage::Malformed`]
//! carrying the reason, which the controller answers with a status reply.

use heapless::Vec;
use serde_json::Value;

use crate::error::CommandError;

/// A payload carries at most an action and a settings request.
pub const MAX_MESSAGES_PER_PAYLOAD: usize = 2;

/// Messages extracted from one payload, in processing order.
pub type ParsedMessages = Vec<ControlMessage, MAX_MESSAGES_PER_PAYLOAD>;

/// LED index assumed when a payload names none.
pub const DEFAULT_LED: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    TurnOn { led_index: u8 },
    TurnOff { led_index: u8 },
    SetCurrent { milliamps: u32 },
    /// Unrecognised or ill-formed request, with the rejection reason.
    Malformed(CommandError),
}

/// Validate and split a raw payload.
///
/// Always yields at least one message.
pub fn parse_message(raw: &str) -> ParsedMessages {
    let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(raw) else {
        return malformed(CommandError::Malformed(raw.trim().to_owned()));
    };
    let echo = Value::Object(payload.clone()).to_string();

    let action = payload.get("action");
    let settings = payload.get("settings");
    if action.is_none() && settings.is_none() {
        return malformed(CommandError::Malformed(echo));
    }

    let action = action.map(|a| parse_action(a, payload.get("led"), &echo));
    let settings = settings.map(|s| parse_settings(s, &echo));
    action.into_iter().chain(settings).collect()
}

fn malformed(err: CommandError) -> ParsedMessages {
    core::iter::once(ControlMessage::Malformed(err)).collect()
}

fn parse_action(action: &Value, led: Option<&Value>, echo: &str) -> ControlMessage {
    let unknown = || ControlMessage::Malformed(CommandError::UnknownAction(echo.to_owned()));
    let turn_on = match action.as_str() {
        Some("on") => true,
        Some("off") => false,
        _ => return unknown(),
    };
    let led_index = match led.map(parse_unsigned) {
        None => DEFAULT_LED,
        Some(Some(n)) => match u8::try_from(n) {
            Ok(index) => index,
            Err(_) => return ControlMessage::Malformed(CommandError::UnsupportedLed(n)),
        },
        Some(None) => return unknown(),
    };
    if turn_on {
        ControlMessage::TurnOn { led_index }
    } else {
        ControlMessage::TurnOff { led_index }
    }
}

fn parse_settings(settings: &Value, echo: &str) -> ControlMessage {
    let Some(current) = settings.as_object().and_then(|s| s.get("current")) else {
        return ControlMessage::Malformed(CommandError::UnknownSettings(echo.to_owned()));
    };
    match parse_unsigned(current).and_then(|n| u32::try_from(n).ok()) {
        Some(milliamps) => ControlMessage::SetCurrent { milliamps },
        None => ControlMessage::Malformed(CommandError::InvalidCurrent(echo.to_owned())),
    }
}

/// Accepts a JSON integer or a numeric string (`20` or `"20"`).
fn parse_unsigned(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
