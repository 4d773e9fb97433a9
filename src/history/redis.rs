use async_trait::async_trait;
use chrono::Utc;
use log::error;
use redis::{ AsyncCommands, Client };
use serde::{ Deserialize, Serialize };
use std::error::Error;

use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation, Role };

#[derive(Serialize, Deserialize)]
struct StoredMessage {
    role: Role,
    content: String,
    timestamp: i64,
}

/// History kept in one Redis list per conversation, oldest entry first.
pub struct RedisHistoryStore {
    client: Client,
    key_prefix: String,
    capacity: usize,
}

impl RedisHistoryStore {
    pub fn new(
        host: &str,
        key_prefix: &str,
        capacity: usize
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            client: Client::open(host)?,
            key_prefix: key_prefix.to_string(),
            capacity,
        })
    }

    fn key(&self, conversation_id: &str) -> String {
        format!("{}{}", self.key_prefix, conversation_id)
    }

    /// `RPUSH` then `LTRIM` to the newest `capacity` entries, in one `MULTI`.
    fn append_pipeline(&self, key: &str, entry: String) -> redis::Pipeline {
        let mut pipe = redis::pipe();
        pipe.atomic()
            .rpush(key, entry)
            .ignore()
            .ltrim(key, -(self.capacity as isize), -1)
            .ignore();
        pipe
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn get_or_create(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let json_entries: Vec<String> = conn.lrange(self.key(conversation_id), 0, -1).await?;
        let mut messages = Vec::with_capacity(json_entries.len());

        for json_entry in &json_entries {
            match serde_json::from_str::<StoredMessage>(json_entry) {
                Ok(msg) => messages.push(ChatMessage::new(msg.role, msg.content)),
                Err(e) => error!("Error parsing history entry: {}", e),
            }
        }

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
        let mut conn = self.get_connection().await?;
        let key = self.key(conversation_id);
        let message = StoredMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        let json_msg = serde_json::to_string(&message)?;

        self.append_pipeline(&key, json_msg).query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn reset(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let _: i64 = conn.del(self.key(conversation_id)).await?;
        Ok(())
    }
}
