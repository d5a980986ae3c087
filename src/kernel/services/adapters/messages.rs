use crate::kernel::services::ports::MessageSink;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Forwards user-facing messages to the UI status line.
pub struct ChannelMessageSink {
    tx: Sender<UserMessage>,
}

impl ChannelMessageSink {
    pub fn new(tx: Sender<UserMessage>) -> Self {
        Self { tx }
    }

}

impl MessageSink for ChannelMessageSink {
    fn show_error(&self, message: &str) {
        tracing::error!("{}", message);
        let _ = self.tx.send(UserMessage {
            level: MessageLevel::Error,
            text: message.to_string(),
        });
    }
}
