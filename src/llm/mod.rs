//! Agent runtime boundary.
//!
//! The orchestrator only knows [`AgentRuntime::run`]; how the model is called
//! and how tool calls are looped lives behind it.

pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::tools::ToolRegistry;

pub use self::openai::OpenAIAgentRuntime;

#[derive(Clone)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Arc<ToolRegistry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub final_output: String,
    pub tool_calls: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("model returned no choices")]
    EmptyResponse,
    #[error("max turns ({0}) exceeded")]
    MaxTurnsExceeded(usize),
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(&self, agent: &AgentDefinition, input: &str) -> Result<RunResult, AgentError>;
}
