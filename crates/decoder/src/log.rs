//! Per-instance log sinks.
//!
//! Each decoder owns one sink, chosen at construction. The default
//! [`TracingSink`] forwards to `tracing` with the instance role attached, so
//! interactive and caching decoders can be told apart (or filtered) without
//! any global switch.

use std::fmt;

use rd_common::DecoderRole;
use tracing::Level;

/// Destination for decoder diagnostics.
pub trait LogSink: Send {
    fn log(&self, level: Level, message: fmt::Arguments<'_>);

    fn debug(&self, message: fmt::Arguments<'_>) {
        self.log(Level::DEBUG, message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.log(Level::WARN, message);
    }
}

/// Emits `tracing` events tagged with the decoder role.
#[derive(Clone, Debug)]
pub struct TracingSink {
    role: DecoderRole,
}

impl TracingSink {
    pub fn new(role: DecoderRole) -> Self {
        Self { role }
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        let role = self.role.name();
        match level {
            Level::ERROR => tracing::error!(role, "{message}"),
            Level::WARN => tracing::warn!(role, "{message}"),
            Level::INFO => tracing::info!(role, "{message}"),
            Level::DEBUG => tracing::debug!(role, "{message}"),
            Level::TRACE => tracing::trace!(role, "{message}"),
        }
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: Level, _message: fmt::Arguments<'_>) {}
}
