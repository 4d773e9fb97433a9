mod memory;
mod redis;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

use crate::cli::Args;
use crate::models::chat::{ ChatMessage, Conversation, Role };

pub use self::memory::MemoryHistoryStore;
pub use self::redis::RedisHistoryStore;

/// Messages kept per conversation.
pub const MAX_HISTORY_LEN: usize = 20;
/// Trailing messages rendered into the agent input (three exchanges).
pub const CONTEXT_WINDOW: usize = 6;
/// Assistant replies are clipped to this many characters in the rendered context.
pub const REPLY_PREVIEW_CHARS: usize = 100;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the stored messages for `conversation_id`, creating an empty
    /// conversation if none exists yet.
    async fn get_or_create(
        &self,
        conversation_id: &str
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>>;

    /// Appends one message, then drops the oldest entries beyond [`MAX_HISTORY_LEN`].
    async fn append(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Forgets the conversation. Unknown ids are ignored.
    async fn reset(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryHistoryStore::new(MAX_HISTORY_LEN))),
        "redis" => {
            let store = RedisHistoryStore::new(
                &args.history_host,
                &args.history_redis_prefix,
                MAX_HISTORY_LEN
            )?;
            Ok(Arc::new(store))
        }
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    if args.history_type.eq_ignore_ascii_case("memory") {
        info!("Chat history will be kept in process memory");
    } else {
        info!("Chat history will be stored in: {} at {}", args.history_type, args.history_host);
    }
    create_history_store(args)
}

/// Builds the text handed to the agent: the raw message when there is no
/// history, otherwise a flat summary of the last few turns followed by it.
pub fn format_agent_input(history: &[ChatMessage], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    let mut context = String::from("Context from previous messages: ");
    for msg in &history[start..] {
        match msg.role {
            Role::User => {
                context.push_str(&format!("User said: {}. ", msg.content));
            }
            Role::Assistant => {
                let preview: String = msg.content.chars().take(REPLY_PREVIEW_CHARS).collect();
                context.push_str(&format!("You replied: {}... ", preview));
            }
        }
    }

    format!("{}\n\nCurrent user message: {}", context, message)
}
