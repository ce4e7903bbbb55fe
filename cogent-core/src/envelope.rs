//! Outbound envelopes.

use crate::message::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An outbound response awaiting dispatch.
///
/// Envelopes are built incrementally with [`write`](Self::write) and
/// [`attach`](Self::attach). Once the respond stage has handed an envelope to
/// the message adapter it is marked dispatched and no longer changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope id.
    pub id: String,
    /// Who the envelope is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<User>,
    /// Room to post in, defaulting to the recipient's room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    strings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<serde_json::Value>,
    /// Id of the listener whose callback produced this envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dispatched_at: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Create an empty envelope for a recipient.
    pub fn new(recipient: Option<User>) -> Self {
        let room = recipient.as_ref().and_then(|user| user.room.clone());
        Self {
            id: Uuid::new_v4().to_string(),
            recipient,
            room,
            strings: Vec::new(),
            attachments: Vec::new(),
            listener_id: None,
            dispatched_at: None,
        }
    }

    /// Create an empty envelope addressed to `user`.
    pub fn to(user: User) -> Self {
        Self::new(Some(user))
    }

    /// Append text. Ignored once the envelope has been dispatched.
    pub fn write(&mut self, text: impl Into<String>) -> &mut Self {
        if !self.is_dispatched() {
            self.strings.push(text.into());
        }
        self
    }

    /// Append a structured attachment.
    pub fn attach(&mut self, attachment: serde_json::Value) -> &mut Self {
        if !self.is_dispatched() {
            self.attachments.push(attachment);
        }
        self
    }

    /// Builder-style [`write`](Self::write) for owned envelopes.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.write(text);
        self
    }

    /// Text written so far.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Attachments added so far.
    pub fn attachments(&self) -> &[serde_json::Value] {
        &self.attachments
    }

    /// When the envelope was dispatched, if it has been.
    pub fn dispatched_at(&self) -> Option<DateTime<Utc>> {
        self.dispatched_at
    }

    /// Whether the envelope has been dispatched.
    pub fn is_dispatched(&self) -> bool {
        self.dispatched_at.is_some()
    }

    /// Mark the envelope as dispatched. The first mark wins.
    pub fn mark_dispatched(&mut self) {
        self.dispatched_at.get_or_insert_with(Utc::now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_chains() {
        let mut envelope = Envelope::to(User::new("u").with_room("general"));
        envelope.write("hello").write("world");
        assert_eq!(envelope.strings(), ["hello", "world"]);
        assert_eq!(envelope.room.as_deref(), Some("general"));
    }

    #[test]
    fn test_dispatched_envelope_is_frozen() {
        let mut envelope = Envelope::new(None).with_text("sent");
        envelope.mark_dispatched();
        let first = envelope.dispatched_at();

        envelope.write("late").attach(serde_json::json!({ "x": 1 }));
        envelope.mark_dispatched();

        assert_eq!(envelope.strings(), ["sent"]);
        assert!(envelope.attachments().is_empty());
        assert_eq!(envelope.dispatched_at(), first);
    }
}
