//! Graph state: the conversation history plus the hand-off summary.
//!
//! State is owned by the running session and mutated only by applying
//! `StateUpdate` deltas returned from nodes. Message merge is concatenation
//! with deduplication by message id, so re-applying a delta is harmless.

use serde::{Deserialize, Serialize};

use crate::ai::types::Message;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphState {
    /// Ordered conversation history. Order is causally significant: a
    /// tool-result message always follows the assistant message that
    /// requested it.
    pub messages: Vec<Message>,
    /// Summary of the user's request, written by the hand-off tool.
    #[serde(default)]
    pub summary: String,
}

impl GraphState {
    pub fn from_user_input(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            summary: String::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Merge a delta into this state.
    pub fn apply(&mut self, update: StateUpdate) {
        for message in update.messages {
            if self.messages.iter().any(|m| m.id == message.id) {
                continue;
            }
            self.messages.push(message);
        }
        if let Some(summary) = update.summary {
            self.summary = summary;
        }
    }
}

/// Delta produced by one node run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub summary: Option<String>,
    /// Explicit redirect: overrides the node's outgoing edges for this
    /// transition (used by the hand-off tool).
    pub goto: Option<String>,
}

impl StateUpdate {
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
            ..Default::default()
        }
    }

    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_appends_in_order() {
        let mut state = GraphState::from_user_input("build me a parser");
        let reply = Message::assistant(vec![crate::ai::types::Content::Text {
            text: "sure".to_string(),
        }]);
        let reply_id = reply.id.clone();

        state.apply(StateUpdate::message(reply));

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].id, reply_id);
    }

    #[test]
    fn apply_deduplicates_by_message_id() {
        let mut state = GraphState::default();
        let msg = Message::user("once");

        state.apply(StateUpdate::message(msg.clone()));
        state.apply(StateUpdate::message(msg));

        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn summary_is_replaced_only_when_present() {
        let mut state = GraphState::default();
        state.apply(StateUpdate {
            summary: Some("a web scraper".to_string()),
            ..Default::default()
        });
        state.apply(StateUpdate::message(Message::user("next")));

        assert_eq!(state.summary, "a web scraper");
    }
}
