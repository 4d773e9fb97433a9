use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8001")]
    pub server_addr: String,

    /// Frontend origin allowed by CORS, in addition to the local dev servers.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3001")]
    pub frontend_url: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    // --- History Store Args ---
    /// History chat store type (memory, redis)
    #[arg(long, env = "HISTORY_TYPE", default_value = "memory")]
    pub history_type: String,

    /// History chat store host endpoint (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "HISTORY_HOST", default_value = "redis://127.0.0.1:6379")]
    pub history_host: String,

    /// Prefix for Redis history keys.
    #[arg(long, env = "HISTORY_REDIS_PREFIX", default_value = "history:")]
    pub history_redis_prefix: String,

    // --- Sanity Args ---
    /// Sanity project id
    #[arg(long, env = "SANITY_PROJECT_ID", default_value = "")]
    pub sanity_project_id: String,

    /// Sanity dataset name (e.g., production)
    #[arg(long, env = "SANITY_DATASET", default_value = "production")]
    pub sanity_dataset: String,

    /// Sanity API token with read and create permissions
    #[arg(long, env = "SANITY_TOKEN", default_value = "")]
    pub sanity_token: String,

    /// Sanity HTTP API version (date form, without the leading `v`)
    #[arg(long, env = "SANITY_API_VERSION", default_value = "2024-02-28")]
    pub sanity_api_version: String,

    /// Per-request timeout for Sanity calls, in seconds.
    #[arg(long, env = "SANITY_TIMEOUT_SECS", default_value = "10")]
    pub sanity_timeout_secs: u64,

    /// Override for the Sanity API host (defaults to https://<project>.api.sanity.io)
    #[arg(long, env = "SANITY_API_HOST")]
    pub sanity_api_host: Option<String>,

    // --- Chat LLM Provider Args ---
    /// API key for the Gemini OpenAI-compatible endpoint
    #[arg(long, env = "GEMINI_API_KEY", default_value = "")]
    pub gemini_api_key: String,

    /// Model name used by the agent. Overrides the model in the agent file.
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Base URL of the OpenAI-compatible chat completions API
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta/openai/"
    )]
    pub gemini_base_url: String,

    // --- Agent Args ---
    /// Path to the agent definition file (name, instructions, model).
    #[arg(long, env = "AGENT_PATH", default_value = "json/agent.json")]
    pub agent_path: String,

    /// Maximum model round trips per chat turn before giving up.
    #[arg(long, env = "AGENT_MAX_TURNS", default_value = "10")]
    pub agent_max_turns: usize,
}
