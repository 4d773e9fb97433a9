use crate::history::{ format_agent_input, HistoryStore };
use crate::llm::{ AgentDefinition, AgentError, AgentRuntime };
use crate::models::chat::Role;

use log::{ debug, error, info, warn };
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnStage {
    Received,
    ContextAssembled,
    AgentInvoked,
    HistoryUpdated,
    Responded,
    Failed,
}

impl fmt::Display for TurnStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnStage::Received => "RECEIVED",
            TurnStage::ContextAssembled => "CONTEXT_ASSEMBLED",
            TurnStage::AgentInvoked => "AGENT_INVOKED",
            TurnStage::HistoryUpdated => "HISTORY_UPDATED",
            TurnStage::Responded => "RESPONDED",
            TurnStage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("history store error: {0}")]
    History(Box<dyn Error + Send + Sync>),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Runs one chat turn: reads the conversation, hands the agent a
/// context-prefixed input and records the exchange once the agent answers.
#[derive(Clone)]
pub struct ChatAgent {
    runtime: Arc<dyn AgentRuntime>,
    definition: Arc<AgentDefinition>,
    history: Arc<dyn HistoryStore>,
}

impl ChatAgent {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        definition: AgentDefinition,
        history: Arc<dyn HistoryStore>
    ) -> Self {
        Self {
            runtime,
            definition: Arc::new(definition),
            history,
        }
    }

    pub async fn process_message(
        &self,
        conversation_id: &str,
        message: &str
    ) -> Result<String, ChatError> {
        let trace = |stage: TurnStage| debug!("[{}] {}", conversation_id, stage);
        trace(TurnStage::Received);

        let conversation = self.history
            .get_or_create(conversation_id).await
            .map_err(ChatError::History)?;
        let input = format_agent_input(&conversation.messages, message);
        trace(TurnStage::ContextAssembled);

        let result = match self.runtime.run(&self.definition, &input).await {
            Ok(result) => result,
            Err(e) => {
                trace(TurnStage::Failed);
                error!("Agent '{}' failed for conversation '{}': {}", self.definition.name, conversation_id, e);
                return Err(e.into());
            }
        };
        trace(TurnStage::AgentInvoked);
        info!(
            "Agent '{}' answered conversation '{}' using {} tool call(s)",
            self.definition.name,
            conversation_id,
            result.tool_calls
        );

        self.history
            .append(conversation_id, Role::User, message).await
            .map_err(ChatError::History)?;
        self.history
            .append(conversation_id, Role::Assistant, &result.final_output).await
            .map_err(ChatError::History)?;
        trace(TurnStage::HistoryUpdated);

        trace(TurnStage::Responded);
        Ok(result.final_output)
    }

    /// Clears the conversation. Store failures are logged, never surfaced.
    pub async fn reset_conversation(&self, conversation_id: &str) {
        match self.history.reset(conversation_id).await {
            Ok(()) => info!("Conversation '{}' reset", conversation_id),
            Err(e) => warn!("Failed to reset conversation '{}': {}", conversation_id, e),
        }
    }
}
