//! Interactive Chat Loop
//!
//! The terminal session: prompt, slash-free commands (memory, search,
//! clear memory, help, quit), and chat turns against the agent loop.

use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;
use dialoguer::Input;
use tracing::warn;

use crate::agent::agent_loop::run_turn;
use crate::memory::{ConversationMemory, DEFAULT_RECALL};
use crate::types::InferenceClient;

/// Run the interactive chat session until the user quits.
pub async fn run_chat(
    inference: &dyn InferenceClient,
    memory: &mut ConversationMemory,
) -> Result<()> {
    println!("{}", "  Mnemo -- AI agent with memory".cyan());
    if !memory.is_empty() {
        println!(
            "{}",
            format!("  Loaded {} past conversations", memory.len()).dimmed()
        );
    }
    println!(
        "{}",
        "  Commands: memory | search <keyword> | clear memory | help | quit".dimmed()
    );
    println!("{}", "  ------------------------------------------------------------".dimmed());

    loop {
        let line: String = match Input::new()
            .with_prompt(format!("{}", "You".green()))
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            // Interrupted or closed input stream: leave the session.
            Err(_) => {
                println!("{}", "Agent: Goodbye!".cyan());
                return Ok(());
            }
        };

        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "bye" => {
                println!("{}", "Agent: Goodbye!".cyan());
                return Ok(());
            }
            "memory" => {
                show_recent(memory);
                continue;
            }
            "clear memory" => {
                memory.clear()?;
                println!("{}", "Memory cleared".yellow());
                continue;
            }
            "help" => {
                show_help();
                continue;
            }
            _ => {}
        }

        if let Some(keyword) = input.strip_prefix("search ") {
            show_search(memory, keyword.trim());
            continue;
        }

        // A chat turn. Errors are reported and the session continues.
        let recent: Vec<_> = memory.recent(DEFAULT_RECALL).to_vec();
        match run_turn(inference, &recent, input).await {
            Ok(outcome) => {
                println!("{} {}", "Agent:".cyan(), outcome.reply);

                if !outcome.reply.is_empty() {
                    memory.add(input, &outcome.reply);
                    if let Err(e) = memory.save() {
                        warn!("Memory save failed: {}", e);
                        println!("{}", format!("  Memory save failed: {}", e).yellow());
                    }
                }
            }
            Err(e) => {
                println!("{}", format!("Agent error: {}", e).red());
            }
        }
    }
}

/// Print the most recent exchanges with timestamps.
fn show_recent(memory: &ConversationMemory) {
    let recent = memory.recent(DEFAULT_RECALL);
    if recent.is_empty() {
        println!("{}", "  No conversations recorded yet.".dimmed());
        return;
    }

    for entry in recent {
        let ts = DateTime::parse_from_rfc3339(&entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| entry.timestamp.clone());

        println!("[{}] {} {}", ts.dimmed(), "You:".green(), entry.user);
        println!("{} {}", "Agent:".cyan(), truncate(&entry.agent, 120));
        println!("{}", "----------------------------------------".dimmed());
    }
}

/// Print all exchanges matching a keyword.
fn show_search(memory: &ConversationMemory, keyword: &str) {
    if keyword.is_empty() {
        println!("{}", "  Usage: search <keyword>".yellow());
        return;
    }

    let matches = memory.search(keyword);
    if matches.is_empty() {
        println!("{}", "  No matches found".dimmed());
        return;
    }

    for entry in matches {
        println!("[{}] {} {}", entry.timestamp.dimmed(), "You:".green(), entry.user);
        println!("{} {}", "Agent:".cyan(), truncate(&entry.agent, 120));
    }
}

fn show_help() {
    println!("{}", "  memory          show recent conversations".white());
    println!("{}", "  search <kw>     search past conversations".white());
    println!("{}", "  clear memory    delete all stored conversations".white());
    println!("{}", "  quit            end the session".white());
    println!("{}", "  anything else is sent to the agent".dimmed());
}

/// Truncate display text, respecting char boundaries.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 120), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let long = "x".repeat(200);
        let t = truncate(&long, 120);
        assert_eq!(t.chars().count(), 123);
        assert!(t.ends_with("..."));
    }
}
