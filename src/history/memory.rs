use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::RwLock;

use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation, Role };

/// Process-local history. Each call is atomic on its own; the two appends of
/// one chat turn are not, so concurrent turns on one id may interleave.
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
    capacity: usize,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get_or_create(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.write().await;
        let messages = conversations.entry(conversation_id.to_string()).or_default().clone();
        Ok(Conversation {
            id: conversation_id.to_string(),
            messages,
        })
    }

    async fn append(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.write().await;
        let messages = conversations.entry(conversation_id.to_string()).or_default();
        messages.push(ChatMessage::new(role, content));
        if messages.len() > self.capacity {
            let excess = messages.len() - self.capacity;
            messages.drain(..excess);
        }
        Ok(())
    }

    async fn reset(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.conversations.write().await.remove(conversation_id);
        Ok(())
    }
}
