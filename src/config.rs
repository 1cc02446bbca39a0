//! Mnemo Configuration
//!
//! Loads the agent's configuration from environment variables
//! (optionally via a `.env` file in the working directory).

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default memory file location, relative to the user's home directory.
const DEFAULT_MEMORY_FILE: &str = "~/.mnemo/memory.json";

/// Default completion token limit per inference call.
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Runtime configuration for the agent.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Azure OpenAI resource endpoint, e.g. `https://myres.openai.azure.com`.
    pub azure_endpoint: String,
    /// API version query parameter, e.g. `2024-06-01`.
    pub azure_version: String,
    /// Chat deployment name.
    pub azure_deployment: String,
    /// API key sent in the `api-key` header.
    pub azure_key: String,
    /// Resolved path to the JSON memory file.
    pub memory_path: String,
    /// Completion token limit per inference call.
    pub max_tokens: u32,
}

impl AgentConfig {
    /// Load configuration from the environment.
    ///
    /// Reads `.env` from the working directory first if present. The four
    /// `AZURE_*` variables are required; `MNEMO_MEMORY_FILE` and
    /// `MNEMO_MAX_TOKENS` are optional overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let azure_endpoint = required_var("AZURE_ENDPOINT")?
            .trim_end_matches('/')
            .to_string();
        let azure_version = required_var("AZURE_VERSION")?;
        let azure_deployment = required_var("AZURE_CHAT_DEPLOYMENT")?;
        let azure_key = required_var("AZURE_KEY")?;

        let memory_path = env::var("MNEMO_MEMORY_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MEMORY_FILE.to_string());

        let max_tokens = match env::var("MNEMO_MAX_TOKENS") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidVar("MNEMO_MAX_TOKENS", v))?,
            _ => DEFAULT_MAX_TOKENS,
        };

        Ok(AgentConfig {
            azure_endpoint,
            azure_version,
            azure_deployment,
            azure_key,
            memory_path: resolve_path(&memory_path),
            max_tokens,
        })
    }
}

/// Read a required environment variable. Empty values count as missing.
fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Resolve a path that may start with `~` to an absolute path.
///
/// If the path starts with `~`, the tilde is replaced with the user's home
/// directory. Otherwise the path is returned as-is.
pub fn resolve_path(p: &str) -> String {
    if let Some(rest) = p.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        home.join(rest).to_string_lossy().to_string()
    } else {
        p.to_string()
    }
}
