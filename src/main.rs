//! Mnemo
//!
//! Entry point for the chat agent. Handles CLI args, configuration
//! loading, and hands off to the interactive session.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use mnemo::azure::AzureClient;
use mnemo::config::{resolve_path, AgentConfig};
use mnemo::memory::ConversationMemory;
use mnemo::repl::run_chat;

const VERSION: &str = "0.1.0";

/// Mnemo -- AI chat agent with persistent memory
#[derive(Parser, Debug)]
#[command(
    name = "mnemo",
    version = VERSION,
    about = "Mnemo -- AI chat agent with persistent memory",
    long_about = "Interactive chat agent backed by an Azure OpenAI deployment. \
Remembers past conversations in a JSON file and can use arithmetic tools."
)]
struct Cli {
    /// Start an interactive chat session (default)
    #[arg(long)]
    chat: bool,

    /// Show current configuration and memory summary
    #[arg(long)]
    status: bool,

    /// Delete all stored conversations and exit
    #[arg(long)]
    clear: bool,

    /// Override the memory file path
    #[arg(long)]
    memory_file: Option<String>,
}

// ---- Status Command ---------------------------------------------------------

/// Display the current agent status.
fn show_status(config: &AgentConfig, memory: &ConversationMemory) {
    println!(
        r#"
=== MNEMO STATUS ===
Endpoint:      {}
Deployment:    {}
API version:   {}
Memory file:   {}
Conversations: {}
Version:       {}
====================
"#,
        config.azure_endpoint,
        config.azure_deployment,
        config.azure_version,
        memory.path().display(),
        memory.len(),
        VERSION,
    );
}

// ---- Entry Point -----------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mnemo=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match AgentConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", format!("Configuration error: {}", e).red());
            eprintln!("Required: AZURE_ENDPOINT, AZURE_VERSION, AZURE_CHAT_DEPLOYMENT, AZURE_KEY");
            std::process::exit(1);
        }
    };

    if let Some(ref path) = cli.memory_file {
        config.memory_path = resolve_path(path);
    }

    let mut memory = ConversationMemory::open(&config.memory_path);

    if cli.status {
        show_status(&config, &memory);
        return;
    }

    if cli.clear {
        if let Err(e) = memory.clear() {
            eprintln!("Failed to clear memory: {}", e);
            std::process::exit(1);
        }
        println!("Memory cleared: {}", memory.path().display());
        return;
    }

    // Default (and --chat): interactive session
    let client = AzureClient::new(&config);
    if let Err(e) = run_chat(&client, &mut memory).await {
        eprintln!("Fatal: {}", e);
        std::process::exit(1);
    }
}
