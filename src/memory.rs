//! Conversation Memory
//!
//! The persisted conversation log: a JSON file read wholesale at startup
//! and rewritten after every exchange.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::warn;

use crate::types::{ConversationEntry, MemoryFile};

/// Maximum number of exchanges retained on disk. Older entries are
/// dropped on append.
const MAX_ENTRIES: usize = 50;

/// Default number of entries surfaced as context / shown by `memory`.
pub const DEFAULT_RECALL: usize = 5;

pub struct ConversationMemory {
    path: PathBuf,
    entries: Vec<ConversationEntry>,
}

impl ConversationMemory {
    /// Open the memory file at `path`, loading any existing history.
    ///
    /// A missing file starts an empty log. An unparsable file is warned
    /// about and treated as empty rather than aborting startup.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<MemoryFile>(&contents) {
                Ok(file) => file.conversations,
                Err(e) => {
                    warn!("Memory load failed, starting fresh: {}", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self { path, entries }
    }

    /// Rewrite the whole memory file, stamping `last_updated`.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create memory directory")?;
            }
        }

        let file = MemoryFile {
            conversations: self.entries.clone(),
            last_updated: Some(Utc::now().to_rfc3339()),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize memory")?;
        fs::write(&self.path, json).context("Failed to write memory file")?;

        Ok(())
    }

    /// Append one completed exchange, dropping the oldest entries past
    /// the retention cap. Does not persist; call `save` after.
    pub fn add(&mut self, user: &str, agent: &str) {
        self.entries.push(ConversationEntry {
            timestamp: Utc::now().to_rfc3339(),
            user: user.to_string(),
            agent: agent.to_string(),
        });

        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    /// The most recent `limit` exchanges, oldest first.
    pub fn recent(&self, limit: usize) -> &[ConversationEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    /// Case-insensitive substring search over both sides of each exchange.
    pub fn search(&self, keyword: &str) -> Vec<&ConversationEntry> {
        let needle = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.user.to_lowercase().contains(&needle)
                    || e.agent.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Drop all history and persist the empty log.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
