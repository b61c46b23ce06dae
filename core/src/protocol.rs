//! Wire types of the WebSocket relay

use crate::chat::TurnEnd;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageEnvelope<T> {
    pub v: u32,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub event_id: Option<u64>,
    pub payload: T,
}

impl<T> MessageEnvelope<T> {
    pub fn event(event_id: u64, payload: T) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            msg_type: "event".to_string(),
            event_id: Some(event_id),
            payload,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SendMessage { text: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Welcome {
        session_id: Uuid,
        text: String,
    },
    AgentMessage {
        agent: String,
        text: String,
    },
    Error {
        message: String,
    },
    TurnComplete {
        outcome: TurnOutcome,
    },
    SessionClosed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Terminated,
    IterationLimit,
    Failed,
}

impl From<TurnEnd> for TurnOutcome {
    fn from(end: TurnEnd) -> Self {
        match end {
            TurnEnd::Terminated => TurnOutcome::Terminated,
            TurnEnd::IterationLimit => TurnOutcome::IterationLimit,
            TurnEnd::Failed => TurnOutcome::Failed,
        }
    }
}
