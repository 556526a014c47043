//! Status messages for the user
//!
//! Every outcome the user should hear about (events loaded, event saved, request failed...) is logged, and published on a [`status_channel`] that a presentation layer can display.

use std::fmt::{Display, Error, Formatter};

/// How a status message should be displayed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message to show to the user
#[derive(Clone, Debug, PartialEq)]
pub struct StatusReport {
    pub level: StatusLevel,
    pub message: String,
}

impl Display for StatusReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "[{:?}] {}", self.level, self.message)
    }
}


/// See [`status_channel`]
pub type StatusSender = tokio::sync::watch::Sender<Option<StatusReport>>;
/// See [`status_channel`]
pub type StatusReceiver = tokio::sync::watch::Receiver<Option<StatusReport>>;

/// Create a status channel, that always holds the latest status report (if any)
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    tokio::sync::watch::channel(None)
}


/// Logs status messages, and forwards them to the listener (if any)
#[derive(Default)]
pub struct StatusReporter {
    channel: Option<StatusSender>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self { channel: None }
    }
    pub fn new_with_channel(channel: StatusSender) -> Self {
        Self { channel: Some(channel) }
    }

    pub fn info(&self, text: &str) {
        log::info!("{}", text);
        self.publish(StatusLevel::Info, text);
    }
    pub fn success(&self, text: &str) {
        log::info!("{}", text);
        self.publish(StatusLevel::Success, text);
    }
    pub fn warn(&self, text: &str) {
        log::warn!("{}", text);
        self.publish(StatusLevel::Warning, text);
    }
    pub fn error(&self, text: &str) {
        log::error!("{}", text);
        self.publish(StatusLevel::Error, text);
    }

    fn publish(&self, level: StatusLevel, text: &str) {
        if let Some(sender) = &self.channel {
            // Nobody may be listening anymore, which is fine
            let _ = sender.send(Some(StatusReport { level, message: text.to_string() }));
        }
    }
}
