//! The conversation ledger threaded through every node of a run.

use crate::llm::coordinator::ConversationMessage;
use crate::types::{AppError, Author, Message, Result};
use serde::Serialize;

/// Append-only record of one workflow run.
///
/// Element 0 is always the user's request. Only the engine holds a `Ledger`
/// by value; nodes see `&Ledger` and can therefore neither append nor edit.
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    messages: Vec<Message>,
}

impl Ledger {
    /// Open a ledger for a new run. Blank queries are rejected.
    pub fn new(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }
        Ok(Self {
            messages: vec![Message::user(query)],
        })
    }

    pub(crate) fn append(&mut self, message: Message) -> &Message {
        debug_assert_ne!(message.author, Author::User);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// The original request.
    pub fn question(&self) -> &Message {
        &self.messages[0]
    }

    /// Most recent entry. Equal to [`Ledger::question`] before any node ran.
    pub fn last(&self) -> &Message {
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true for a ledger opened with [`Ledger::new`].
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render the ledger as chat turns. Node contributions are sent as user
    /// turns carrying the node name, so the model sees who said what.
    pub fn to_conversation(&self) -> Vec<ConversationMessage> {
        self.messages
            .iter()
            .map(|m| match m.author {
                Author::User => ConversationMessage::user(&m.content),
                author => ConversationMessage::named_user(author.as_str(), &m.content),
            })
            .collect()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
