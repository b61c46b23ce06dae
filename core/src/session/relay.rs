//! Session hooks for the WebSocket relay
//!
//! Turns session output into [`ServerEvent`]s on a channel. The socket side
//! lives in the binary.

use super::{ChatSession, DriverState, ReplySink};
use crate::chat::{Message, TurnEnd};
use crate::error::AgentError;
use crate::output::OutputFormatter;
use crate::protocol::ServerEvent;
use tokio::sync::mpsc::UnboundedSender;

pub struct RelaySink {
    tx: UnboundedSender<ServerEvent>,
    formatter: OutputFormatter,
}

impl RelaySink {
    pub fn new(tx: UnboundedSender<ServerEvent>) -> Self {
        Self {
            tx,
            formatter: OutputFormatter::plain(),
        }
    }

    fn send(&self, event: ServerEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("relay receiver dropped");
        }
    }
}

impl ReplySink for RelaySink {
    fn on_reply(&mut self, message: &Message) {
        self.send(ServerEvent::AgentMessage {
            agent: message.sender.to_string(),
            text: self.formatter.reply_text(message),
        });
    }

    fn on_error(&mut self, error: &AgentError) {
        self.send(ServerEvent::Error {
            message: self.formatter.format_error(error),
        });
    }

    fn on_turn_end(&mut self, end: TurnEnd) {
        self.send(ServerEvent::TurnComplete { outcome: end.into() });
    }
}

/// Session-start hook: greet the new connection.
pub fn on_chat_start(session: &ChatSession, welcome: &str, sink: &RelaySink) {
    sink.send(ServerEvent::Welcome {
        session_id: session.id(),
        text: welcome.to_string(),
    });
}

/// Message-received hook: forward one user message and relay the turn.
pub async fn on_message(session: &mut ChatSession, text: &str, sink: &mut RelaySink) -> DriverState {
    let state = session.handle_input(text, sink).await;
    if state == DriverState::Terminated {
        sink.send(ServerEvent::SessionClosed);
    }
    state
}
