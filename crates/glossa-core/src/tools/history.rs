//! Bounded command-history log for shell execution.
//!
//! Session-scoped: each execution session owns one ring buffer, so
//! concurrent sessions never see each other's commands. Oldest entries are
//! evicted once the bound is exceeded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

const MAX_HISTORY_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub timestamp: DateTime<Utc>,
    pub command: String,
    pub success: bool,
}

#[derive(Debug)]
pub struct CommandHistory {
    entries: VecDeque<CommandRecord>,
    capacity: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_SIZE)
    }
}

impl CommandHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, command: &str, success: bool) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CommandRecord {
            timestamp: Utc::now(),
            command: command.to_string(),
            success,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the most recent `count` entries, newest last.
    pub fn render_recent(&self, count: usize) -> String {
        if self.entries.is_empty() {
            return "No command execution history.".to_string();
        }

        let count = count.min(self.entries.len());
        let mut output = format!("Recent {} command history:\n\n", count);
        for (i, record) in self.entries.iter().skip(self.entries.len() - count).enumerate() {
            let status = if record.success { "ok" } else { "failed" };
            output.push_str(&format!(
                "{}. [{}] {}: {}\n",
                i + 1,
                status,
                record.timestamp.to_rfc3339(),
                record.command
            ));
        }
        output
    }
}
