//! Listener for language understanding intents.

use cogent_core::{BoxError, Listener, NluKind, State};

/// A listener that matches text messages whose NLU results include an
/// intent.
///
/// Register it in the understand collection: the understand stage merges the
/// language adapter's results into the message before listeners run.
pub struct IntentListener<C> {
    intent: String,
    min_score: Option<f64>,
    callback: C,
}

impl<C> IntentListener<C> {
    /// Match any candidate with the given intent id.
    pub fn new(intent: impl Into<String>, callback: C) -> Self
    where
        C: Fn(&mut State) + Send + Sync + 'static,
    {
        Self {
            intent: intent.into(),
            min_score: None,
            callback,
        }
    }

    /// Require the candidate's score to be at least `min_score`. Unscored
    /// candidates never pass a threshold.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

impl<C> Listener for IntentListener<C>
where
    C: Fn(&mut State) + Send + Sync + 'static,
{
    async fn matches(&self, state: &State) -> Result<bool, BoxError> {
        let Some(intents) = state
            .message
            .as_text()
            .and_then(|message| message.nlu.as_ref())
            .and_then(|nlu| nlu.get(NluKind::Intent))
        else {
            return Ok(false);
        };

        Ok(intents.iter().any(|candidate| {
            candidate.id == self.intent
                && self
                    .min_score
                    .is_none_or(|min| candidate.score.is_some_and(|score| score >= min))
        }))
    }

    async fn on_match(&self, state: &mut State) -> Result<(), BoxError> {
        (self.callback)(state);
        Ok(())
    }
}
