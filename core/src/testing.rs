//! In-process completion service for tests
//!
//! Replies come either from a fixed script (consumed in order) or from a
//! closure that looks at the request. Every request is recorded.

use crate::error::{AgentError, Result};
use crate::llm::{ChatMessage, CompletionService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&[ChatMessage]) -> std::result::Result<String, String> + Send + Sync>;

pub struct ScriptedService {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    responder: Option<Responder>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedService {
    /// Replies with each item in order, then fails
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Replies (or fails) with each item in order
    pub fn from_results<I>(results: I) -> Arc<Self>
    where
        I: IntoIterator<Item = std::result::Result<String, String>>,
    {
        Arc::new(Self {
            script: Mutex::new(results.into_iter().collect()),
            responder: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Fails every request with the given provider message
    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        let message = message.into();
        Self::responding(move |_| Err(message.clone()))
    }

    /// Computes each reply from the request
    pub fn responding<F>(f: F) -> Arc<Self>
    where
        F: Fn(&[ChatMessage]) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            responder: Some(Box::new(f)),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every request received so far
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        let reply = match &self.responder {
            Some(f) => f(messages),
            None => self
                .script
                .lock()
                .ok()
                .and_then(|mut s| s.pop_front())
                .unwrap_or_else(|| Err("script exhausted".to_string())),
        };

        reply.map_err(|message| AgentError::ProviderError {
            status: 500,
            message,
        })
    }
}
