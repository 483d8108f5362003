//! Log-based status sink decorator.
//!
//! Wraps any [`StatusSink`] and writes every status reply to the logger
//! before forwarding it, so the journal shows what the operator saw.

use log::info;

use crate::app::ports::StatusSink;
use crate::app::status::StatusMessage;

pub struct LoggingSink<S> {
    inner: S,
}

impl<S: StatusSink> LoggingSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: StatusSink> StatusSink for LoggingSink<S> {
    fn publish(&mut self, status: &StatusMessage) {
        info!("STATUS | {}", status.status);
        self.inner.publish(status);
    }
}
