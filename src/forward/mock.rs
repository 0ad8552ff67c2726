//! In-memory forwarder for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{ForwardError, ForwardMessage, Forwarder};

/// Records every forwarded message; can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryForwarder {
    messages: Mutex<Vec<ForwardMessage>>,
    fail_after: Mutex<Option<usize>>,
}

impl MemoryForwarder {
    /// Create an empty forwarder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` messages, then reject every following one.
    pub fn fail_after(&self, count: usize) {
        let mut guard = self.fail_after.lock().unwrap();
        *guard = Some(count);
    }

    /// Messages received so far, in order.
    pub fn messages(&self) -> Vec<ForwardMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for MemoryForwarder {
    fn name(&self) -> &str {
        "memory"
    }

    async fn forward(&self, message: &ForwardMessage) -> Result<(), ForwardError> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if messages.len() >= limit {
                return Err(ForwardError::Rejected {
                    status: 503,
                    body: "memory forwarder is full".to_string(),
                });
            }
        }
        messages.push(message.clone());
        Ok(())
    }
}
