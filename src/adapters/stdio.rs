//! JSON-lines message bus over stdin / stdout.
//!
//! Stands in for the instrument's broker when the controller runs as a
//! child process: one JSON payload per input line, one status envelope
//! per output line.
//!
//! ```text
//!   stdin  ──▶ reader thread ──▶ sync_channel(1) ──▶ LineSource::poll
//!   StatusWriter::publish ──▶ {"topic":"status/light","payload":{...}}
//! ```
//!
//! The channel holds at most one unread payload; the reader blocks until
//! the controller takes it.  End of input raises the stop flag, but only
//! once every line already read has been handed out.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError, sync_channel};
use std::thread;

use log::{debug, info, warn};
use serde::Serialize;

use crate::app::ports::{MessageSource, StatusSink};
use crate::app::status::StatusMessage;

// ── Inbound ───────────────────────────────────────────────────

pub struct LineSource {
    rx: Receiver<String>,
    stop: Arc<AtomicBool>,
}

impl LineSource {
    pub fn spawn<R: BufRead + Send + 'static>(
        reader: R,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let (tx, rx) = sync_channel(1);
        thread::Builder::new()
            .name("bus-reader".into())
            .spawn(move || {
                for line in reader.lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Message bus read failed: {}", e);
                            break;
                        }
                    };
                    let payload = line.trim();
                    if payload.is_empty() {
                        continue;
                    }
                    if tx.send(payload.to_owned()).is_err() {
                        break;
                    }
                }
                debug!("Message bus input closed");
            })?;
        Ok(Self { rx, stop })
    }
}

impl MessageSource for LineSource {
    fn poll(&mut self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(payload) => Some(payload),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.stop.swap(true, Ordering::AcqRel) {
                    info!("Message bus closed, requesting stop");
                }
                None
            }
        }
    }
}

// ── Outbound ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    payload: &'a StatusMessage,
}

pub struct StatusWriter<W> {
    out: W,
    topic: String,
}

impl<W: Write> StatusWriter<W> {
    pub fn new(out: W, topic: impl Into<String>) -> Self {
        Self {
            out,
            topic: topic.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for StatusWriter<W> {
    fn publish(&mut self, status: &StatusMessage) {
        let envelope = Envelope {
            topic: &self.topic,
            payload: status,
        };
        let line = match serde_json::to_string(&envelope) {
            Ok(line) => line,
            Err(e) => {
                warn!("Status could not be encoded: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!("Status could not be written: {}", e);
        }
    }
}
