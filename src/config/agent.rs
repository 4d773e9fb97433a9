use serde::Deserialize;
use std::fs;
use std::path::Path;
use log::info;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read agent file '{0}': {1}")]
    IoError(String, #[source] std::io::Error),
    #[error("Failed to parse agent file '{0}': {1}")]
    JsonError(String, #[source] serde_json::Error),
    #[error("Invalid agent configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    pub instructions: String,
    #[serde(default)]
    pub model: Option<String>,
}

impl AgentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("agent name is empty".to_string()));
        }
        if self.instructions.trim().is_empty() {
            return Err(ConfigError::Invalid("agent instructions are empty".to_string()));
        }
        Ok(())
    }

    /// The model named on the command line wins over the one in the file.
    pub fn resolve_model(&self, override_model: Option<&str>) -> Result<String, ConfigError> {
        override_model
            .filter(|m| !m.trim().is_empty())
            .or(self.model.as_deref())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::Invalid("no model configured".to_string()))
    }
}

pub fn load_agent_config_from_str(raw: &str, origin: &str) -> Result<AgentConfig, ConfigError> {
    let config: AgentConfig = serde_json
        ::from_str(raw)
        .map_err(|e| ConfigError::JsonError(origin.to_string(), e))?;
    config.validate()?;
    Ok(config)
}

pub fn load_agent_config<P: AsRef<Path>>(path: P) -> Result<AgentConfig, ConfigError> {
    let display = path.as_ref().display().to_string();
    let raw = fs::read_to_string(&path).map_err(|e| ConfigError::IoError(display.clone(), e))?;
    let config = load_agent_config_from_str(&raw, &display)?;
    info!("Loaded agent '{}' from {}", config.name, display);
    Ok(config)
}
