pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;
pub mod sanity;
pub mod tools;

use agent::ChatAgent;
use cli::Args;
use config::agent::load_agent_config;
use history::initialize_history_store;
use llm::{ AgentDefinition, OpenAIAgentRuntime };
use log::info;
use sanity::{ SanityClient, SanityConfig };
use server::Server;
use std::error::Error;
use std::sync::Arc;
use tools::ToolRegistry;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Frontend URL: {}", args.frontend_url);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("History Store Type: {}", args.history_type);
    if !args.history_type.eq_ignore_ascii_case("memory") {
        info!("History Store Host: {}", args.history_host);
    }
    info!("Sanity Project: {}", args.sanity_project_id);
    info!("Sanity Dataset: {}", args.sanity_dataset);
    info!("Sanity API Version: {}", args.sanity_api_version);
    info!("Agent Path: {}", args.agent_path);
    info!("Agent Max Turns: {}", args.agent_max_turns);
    info!("Model Base URL: {}", args.gemini_base_url);
    info!("-------------------------");

    if args.gemini_api_key.trim().is_empty() {
        return Err("GEMINI_API_KEY is not set".into());
    }
    if args.sanity_project_id.trim().is_empty() && args.sanity_api_host.is_none() {
        return Err("SANITY_PROJECT_ID is not set".into());
    }

    let store = Arc::new(SanityClient::new(&SanityConfig::from_args(&args))?);
    let tools = Arc::new(ToolRegistry::new(store));

    let agent_config = load_agent_config(&args.agent_path)?;
    let model = agent_config.resolve_model(args.gemini_model.as_deref())?;
    info!("Agent '{}' will use model: {}", agent_config.name, model);
    let definition = AgentDefinition {
        name: agent_config.name,
        instructions: agent_config.instructions,
        model,
        tools,
    };

    let runtime = Arc::new(
        OpenAIAgentRuntime::new(&args.gemini_api_key, &args.gemini_base_url, args.agent_max_turns)?
    );
    let history = initialize_history_store(&args)?;
    let agent = Arc::new(ChatAgent::new(runtime, definition, history));

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
