//! Inbound message types.
//!
//! [`Message`] is a closed set of variants. Text messages carry content and
//! an optional NLU extension; event messages only carry who triggered them.
//! A [`CatchAllMessage`] wraps whatever message failed to match so fallback
//! listeners can still recover the original.

use crate::nlu::{NaturalLanguageResults, NluKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The user a message came from, or an envelope is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Room or channel the user is in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl User {
    /// Create a user with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            room: None,
        }
    }

    /// Create a user with a random id.
    pub fn anonymous() -> Self {
        Self::new(new_id())
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }
}

impl Default for User {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// A message with text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Message id.
    pub id: String,
    /// Sender.
    pub user: User,
    /// Raw text content.
    pub text: String,
    /// Understanding results, populated by the understand stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nlu: Option<NaturalLanguageResults>,
}

impl TextMessage {
    /// Create a text message with a random id.
    pub fn new(user: User, text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user,
            text: text.into(),
            nlu: None,
        }
    }

    /// Whether the content is empty once surrounding whitespace is removed.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Merge understanding results into the message.
    pub fn add_nlu(&mut self, results: NaturalLanguageResults) {
        match &mut self.nlu {
            Some(existing) => existing.merge(results),
            None => self.nlu = Some(results),
        }
    }

    /// Whether the NLU extension holds a candidate of `kind` with the given
    /// id.
    pub fn has_nlu(&self, kind: NluKind, id: &str) -> bool {
        self.nlu
            .as_ref()
            .and_then(|nlu| nlu.get(kind))
            .is_some_and(|result| result.find(id).is_some())
    }
}

/// A structural event such as a user entering or leaving a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Message id.
    pub id: String,
    /// The user the event is about.
    pub user: User,
}

impl EventMessage {
    /// Create an event message with a random id.
    pub fn new(user: User) -> Self {
        Self { id: new_id(), user }
    }
}

/// A message originating from the bot's own side, such as a proactive
/// dispatch or a webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    /// Message id.
    pub id: String,
    /// The user the turn concerns.
    pub user: User,
    /// Arbitrary payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ServerMessage {
    /// Create a server message without payload.
    pub fn new(user: User) -> Self {
        Self {
            id: new_id(),
            user,
            data: serde_json::Value::Null,
        }
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// A synthetic message substituted when nothing matched the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchAllMessage {
    /// Message id, shared with the original.
    pub id: String,
    original: Box<Message>,
}

impl CatchAllMessage {
    /// Wrap an unmatched message.
    pub fn new(original: Message) -> Self {
        Self {
            id: original.id().to_owned(),
            original: Box::new(original),
        }
    }

    /// The message that went unmatched.
    pub fn original(&self) -> &Message {
        &self.original
    }

    /// Unwrap the original message.
    pub fn into_original(self) -> Message {
        *self.original
    }
}

/// An inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Text content from a user.
    Text(TextMessage),
    /// A user entered a room.
    Enter(EventMessage),
    /// A user left a room.
    Leave(EventMessage),
    /// A message created by the bot side.
    Server(ServerMessage),
    /// Wrapper around a message nothing matched.
    CatchAll(CatchAllMessage),
}

impl Message {
    /// Shortcut for a text message from `user`.
    pub fn text(user: User, text: impl Into<String>) -> Self {
        Self::Text(TextMessage::new(user, text))
    }

    /// Shortcut for an enter event.
    pub fn enter(user: User) -> Self {
        Self::Enter(EventMessage::new(user))
    }

    /// Shortcut for a leave event.
    pub fn leave(user: User) -> Self {
        Self::Leave(EventMessage::new(user))
    }

    /// Message id.
    pub fn id(&self) -> &str {
        match self {
            Self::Text(m) => &m.id,
            Self::Enter(m) | Self::Leave(m) => &m.id,
            Self::Server(m) => &m.id,
            Self::CatchAll(m) => &m.id,
        }
    }

    /// The user the message came from. Catch-alls report the original's
    /// user.
    pub fn user(&self) -> &User {
        match self {
            Self::Text(m) => &m.user,
            Self::Enter(m) | Self::Leave(m) => &m.user,
            Self::Server(m) => &m.user,
            Self::CatchAll(m) => m.original().user(),
        }
    }

    /// The text message, if this is one.
    pub fn as_text(&self) -> Option<&TextMessage> {
        match self {
            Self::Text(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable access to the text message, if this is one.
    pub fn as_text_mut(&mut self) -> Option<&mut TextMessage> {
        match self {
            Self::Text(m) => Some(m),
            _ => None,
        }
    }

    /// Whether this is a catch-all wrapper.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::CatchAll(_))
    }

    /// Wrap this message into a catch-all. Already wrapped messages are
    /// returned unchanged.
    pub fn into_catch_all(self) -> Self {
        match self {
            Self::CatchAll(_) => self,
            other => Self::CatchAll(CatchAllMessage::new(other)),
        }
    }
}

impl From<TextMessage> for Message {
    fn from(message: TextMessage) -> Self {
        Self::Text(message)
    }
}

impl From<ServerMessage> for Message {
    fn from(message: ServerMessage) -> Self {
        Self::Server(message)
    }
}
