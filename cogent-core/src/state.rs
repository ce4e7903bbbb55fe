//! Per-turn conversational state.
//!
//! A [`State`] is created for every inbound message (or direct dispatch) and
//! threaded through every stage of the turn. Stages record when they
//! completed, listeners queue envelopes, and any listener can end the turn
//! with [`State::finish`].

use crate::{
    envelope::Envelope,
    message::{Message, ServerMessage, User},
};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Stage completion timestamps in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Processed(Vec<(String, DateTime<Utc>)>);

impl Processed {
    /// Record `stage` as completed now.
    ///
    /// Timestamps never go backwards within a turn: if the wall clock stepped
    /// back since the previous record, the previous timestamp is reused.
    /// Recording a stage twice moves it to the end with the new timestamp.
    pub fn record(&mut self, stage: &str) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.0.last() {
            Some((_, last)) if *last > now => *last,
            _ => now,
        };
        self.0.retain(|(name, _)| name != stage);
        self.0.push((stage.to_owned(), at));
        at
    }

    /// When `stage` completed, if it did.
    pub fn get(&self, stage: &str) -> Option<DateTime<Utc>> {
        self.0.iter().find(|(name, _)| name == stage).map(|(_, at)| *at)
    }

    /// Whether `stage` completed.
    pub fn contains(&self, stage: &str) -> bool {
        self.get(stage).is_some()
    }

    /// Completed stage names in execution order.
    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(stage, timestamp)` pairs in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.0.iter().map(|(name, at)| (name.as_str(), *at))
    }

    /// Number of completed stages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no stage completed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Processed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, at)| (name, at)))
    }
}

/// The mutable context of one conversational turn.
#[derive(Debug, Clone, Serialize)]
pub struct State {
    /// The message being processed. The act stage replaces it with a
    /// catch-all wrapper.
    pub message: Message,
    processed: Processed,
    done: bool,
    envelopes: Vec<Envelope>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    extras: Map<String, Value>,
    #[serde(skip)]
    matched: Option<String>,
}

impl State {
    /// Create the state for an inbound message.
    pub fn new(message: impl Into<Message>) -> Self {
        Self {
            message: message.into(),
            processed: Processed::default(),
            done: false,
            envelopes: Vec::new(),
            extras: Map::new(),
            matched: None,
        }
    }

    /// Create the state for a proactive dispatch of `envelope`.
    ///
    /// The turn has no inbound message, so a server message addressed to the
    /// envelope's recipient stands in for it.
    pub fn for_envelope(envelope: Envelope) -> Self {
        let user = envelope.recipient.clone().unwrap_or_default();
        let mut state = Self::new(ServerMessage::new(user));
        state.envelopes.push(envelope);
        state
    }

    /// Attach a contextual attribute, builder style.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_extra(key, value);
        self
    }

    /// Attach or replace a contextual attribute.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extras.insert(key.into(), value.into());
    }

    /// A contextual attribute.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// All contextual attributes.
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    /// End the turn. No further listeners run and later stages are skipped.
    pub fn finish(&mut self) {
        self.done = true;
    }

    /// Whether [`finish`](Self::finish) was called.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Stage completion timestamps.
    pub fn processed(&self) -> &Processed {
        &self.processed
    }

    /// Record `stage` as completed now.
    pub fn record(&mut self, stage: &str) -> DateTime<Utc> {
        self.processed.record(stage)
    }

    /// Id of the listener whose callback is currently running.
    pub fn matched(&self) -> Option<&str> {
        self.matched.as_deref()
    }

    /// Set or clear the listener whose callback is running. Envelopes created
    /// meanwhile are tagged with its id.
    pub fn set_matched(&mut self, listener_id: Option<String>) {
        self.matched = listener_id;
    }

    /// Start a new envelope addressed to the sender of the current message.
    pub fn respond_envelope(&mut self) -> &mut Envelope {
        let mut envelope = Envelope::to(self.message.user().clone());
        envelope.listener_id = self.matched.clone();
        self.envelopes.push(envelope);
        let last = self.envelopes.len() - 1;
        &mut self.envelopes[last]
    }

    /// Queue a response with a single line of text.
    pub fn respond(&mut self, text: impl Into<String>) -> &mut Envelope {
        self.respond_envelope().write(text)
    }

    /// Queue a prepared envelope. Untagged envelopes take the running
    /// listener's id.
    pub fn push_envelope(&mut self, mut envelope: Envelope) {
        if envelope.listener_id.is_none() {
            envelope.listener_id = self.matched.clone();
        }
        self.envelopes.push(envelope);
    }

    /// All envelopes produced this turn.
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    /// Mutable access to the envelopes.
    pub fn envelopes_mut(&mut self) -> &mut [Envelope] {
        &mut self.envelopes
    }

    /// Whether any envelope still awaits dispatch.
    pub fn has_pending(&self) -> bool {
        self.envelopes.iter().any(|e| !e.is_dispatched())
    }

    /// Replace the message with a catch-all wrapper around it.
    pub fn catch_all(&mut self) {
        if !self.message.is_catch_all() {
            self.message = self.message.clone().into_catch_all();
        }
    }

    /// A JSON record of the turn, as persisted by the remember stage.
    pub fn snapshot(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
