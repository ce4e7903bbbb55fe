//! Regex listener for text messages.

use cogent_core::{BoxError, Listener, State};
use regex::Regex;
use serde_json::Value;

/// Key under which [`TextListener`] stores the capture groups of its match.
pub const CAPTURES_KEY: &str = "captures";

/// A listener that matches text messages against a regular expression.
///
/// Before the callback runs, the capture groups of the match are stored in
/// the state's extras under [`CAPTURES_KEY`] as a JSON array (group 0 first,
/// unmatched optional groups as `null`).
pub struct TextListener<C> {
    pattern: Regex,
    callback: C,
}

impl<C> TextListener<C> {
    /// Compile `pattern` into a text listener.
    pub fn new(pattern: &str, callback: C) -> Result<Self, regex::Error>
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Ok(Self::from_regex(Regex::new(pattern)?, callback))
    }

    /// Create a text listener from a compiled regex.
    pub fn from_regex(pattern: Regex, callback: C) -> Self
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Self { pattern, callback }
    }

    fn captures(&self, state: &State) -> Option<Value> {
        let text = &state.message.as_text()?.text;
        let captures = self.pattern.captures(text)?;
        Some(
            captures
                .iter()
                .map(|group| group.map_or(Value::Null, |m| Value::from(m.as_str())))
                .collect(),
        )
    }
}

impl<C> Listener for TextListener<C>
where
    C: Fn(&mut State) + Send + Sync + 'static,
{
    async fn matches(&self, state: &State) -> Result<bool, BoxError> {
        Ok(state
            .message
            .as_text()
            .is_some_and(|message| self.pattern.is_match(&message.text)))
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        if let Some(captures) = self.captures(state) {
            state.set_extra(CAPTURES_KEY, captures);
        }
        (self.callback)(state);
        Ok(())
    }
}
