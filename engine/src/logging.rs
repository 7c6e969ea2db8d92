//! A [`log`] backend that forwards engine diagnostics over a channel.
//!
//! The engine only ever talks to the `log` facade. A host that wants to show those records (an
//! editor console, a test harness, a demo binary) installs a [`ChannelLogger`] and drains the
//! receiving end at its own pace, typically once per frame.
//!
//! ```rust,ignore
//! let receiver = ChannelLogger::install(log::LevelFilter::Debug)?;
//! // ... run a frame ...
//! for record in receiver.try_iter() {
//!     println!("{record}");
//! }
//! ```

use std::fmt;

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

/// One forwarded log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<5} [{}] {}", self.level, self.target, self.message)
    }
}

/// A `log::Log` implementation that sends every enabled record to a channel.
pub struct ChannelLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

impl ChannelLogger {
    pub fn new(sender: Sender<LogMessage>, level: LevelFilter) -> Self {
        Self { sender, level }
    }

    /// Create a logger passing everything up to `Trace`, plus the receiving end of its channel.
    pub fn with_receiver() -> (Self, Receiver<LogMessage>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender, LevelFilter::Trace), receiver)
    }

    /// Register a channel logger as the global logger at `level` and return its receiver.
    ///
    /// Fails if a global logger has already been set.
    pub fn install(level: LevelFilter) -> Result<Receiver<LogMessage>, SetLoggerError> {
        let (sender, receiver) = unbounded();
        log::set_boxed_logger(Box::new(Self::new(sender, level)))?;
        log::set_max_level(level);
        Ok(receiver)
    }
}

impl log::Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // A dropped receiver just means nobody is listening anymore.
            let _ = self.sender.try_send(LogMessage {
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}
