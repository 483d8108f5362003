//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements    | Connects to                      |
//! |------------|---------------|----------------------------------|
//! | `hardware` | LightPort     | LM36011 driver (embedded-hal)    |
//! | `log_sink` | StatusSink    | Logger, then any inner sink      |
//! | `stdio`    | MessageSource | JSON lines on stdin              |
//! |            | StatusSink    | JSON envelopes on stdout         |
//! | `linux`    | (none)        | `/dev/i2c-N` + sysfs GPIO setup  |

pub mod hardware;
#[cfg(feature = "linux")]
pub mod linux;
pub mod log_sink;
pub mod stdio;
