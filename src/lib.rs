//! Mnemo -- Persistent-Memory Chat Agent
//!
//! An interactive terminal chat agent backed by an Azure OpenAI
//! deployment, with arithmetic tools and a JSON conversation log.

pub mod types;
pub mod config;
pub mod azure;
pub mod memory;
pub mod agent;
pub mod repl;
