//! Natural language understanding results.
//!
//! A language adapter returns scored candidates for each [`NluKind`]. The
//! understand stage merges them into the text message so listeners can match
//! on intents, entities or the detected language.

use serde::{Deserialize, Serialize};

/// The category of an NLU candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NluKind {
    /// What the user wants.
    Intent,
    /// Things mentioned in the message.
    Entities,
    /// The language the message is written in.
    Language,
}

/// A single scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NluCandidate {
    /// Identifier of the candidate (intent name, entity type, language code).
    pub id: String,
    /// Optional human-readable name or matched value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Confidence score, usually in `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl NluCandidate {
    /// Create an unscored candidate.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            score: None,
        }
    }

    /// Set the score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An ordered, append-only list of candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NaturalLanguageResult(Vec<NluCandidate>);

impl NaturalLanguageResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a candidate, builder style.
    pub fn add(mut self, candidate: NluCandidate) -> Self {
        self.0.push(candidate);
        self
    }

    /// Append a candidate in place.
    pub fn push(&mut self, candidate: NluCandidate) -> &mut Self {
        self.0.push(candidate);
        self
    }

    /// Append every candidate of `other`, preserving order.
    pub fn merge(&mut self, other: NaturalLanguageResult) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    /// The candidate with the highest score. Unscored candidates rank lowest;
    /// ties keep the earliest candidate.
    pub fn best(&self) -> Option<&NluCandidate> {
        self.0.iter().fold(None, |best, candidate| match best {
            None => Some(candidate),
            Some(current) if candidate.score.unwrap_or(f64::MIN) > current.score.unwrap_or(f64::MIN) => {
                Some(candidate)
            }
            keep => keep,
        })
    }

    /// Find the first candidate with the given id.
    pub fn find(&self, id: &str) -> Option<&NluCandidate> {
        self.0.iter().find(|c| c.id == id)
    }

    /// Candidate ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.id.as_str())
    }

    /// Iterate over the candidates.
    pub fn iter(&self) -> std::slice::Iter<'_, NluCandidate> {
        self.0.iter()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NluCandidate> for NaturalLanguageResult {
    fn from_iter<I: IntoIterator<Item = NluCandidate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NaturalLanguageResult {
    type Item = &'a NluCandidate;
    type IntoIter = std::slice::Iter<'a, NluCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The full set of results returned by a language adapter.
///
/// Every kind is optional; adapters fill in what they support.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaturalLanguageResults {
    /// Intent candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<NaturalLanguageResult>,
    /// Entity candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<NaturalLanguageResult>,
    /// Language candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<NaturalLanguageResult>,
}

impl NaturalLanguageResults {
    /// Create empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates for a kind, builder style.
    pub fn with(mut self, kind: NluKind, result: NaturalLanguageResult) -> Self {
        *self.slot(kind) = Some(result);
        self
    }

    /// Candidates for a kind, if any were provided.
    pub fn get(&self, kind: NluKind) -> Option<&NaturalLanguageResult> {
        match kind {
            NluKind::Intent => self.intent.as_ref(),
            NluKind::Entities => self.entities.as_ref(),
            NluKind::Language => self.language.as_ref(),
        }
    }

    /// Append `other` into `self`, kind by kind.
    pub fn merge(&mut self, other: NaturalLanguageResults) {
        for (kind, incoming) in [
            (NluKind::Intent, other.intent),
            (NluKind::Entities, other.entities),
            (NluKind::Language, other.language),
        ] {
            let Some(incoming) = incoming else { continue };
            match self.slot(kind) {
                Some(existing) => {
                    existing.merge(incoming);
                }
                slot @ None => *slot = Some(incoming),
            }
        }
    }

    /// Whether no kind holds any candidate.
    pub fn is_empty(&self) -> bool {
        [&self.intent, &self.entities, &self.language]
            .into_iter()
            .all(|r| r.as_ref().is_none_or(NaturalLanguageResult::is_empty))
    }

    fn slot(&mut self, kind: NluKind) -> &mut Option<NaturalLanguageResult> {
        match kind {
            NluKind::Intent => &mut self.intent,
            NluKind::Entities => &mut self.entities,
            NluKind::Language => &mut self.language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_chainable_and_ordered() {
        let result = NaturalLanguageResult::new()
            .add(NluCandidate::new("greet"))
            .add(NluCandidate::new("farewell"));
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["greet", "farewell"]);
    }

    #[test]
    fn test_best_prefers_highest_score() {
        let result = NaturalLanguageResult::new()
            .add(NluCandidate::new("none"))
            .add(NluCandidate::new("low").with_score(0.2))
            .add(NluCandidate::new("high").with_score(0.9))
            .add(NluCandidate::new("tie").with_score(0.9));
        assert_eq!(result.best().map(|c| c.id.as_str()), Some("high"));
    }

    #[test]
    fn test_merge_appends_per_kind() {
        let mut results = NaturalLanguageResults::new().with(
            NluKind::Intent,
            NaturalLanguageResult::new().add(NluCandidate::new("a")),
        );
        results.merge(
            NaturalLanguageResults::new()
                .with(
                    NluKind::Intent,
                    NaturalLanguageResult::new().add(NluCandidate::new("b")),
                )
                .with(
                    NluKind::Language,
                    NaturalLanguageResult::new().add(NluCandidate::new("en")),
                ),
        );

        let intents: Vec<_> = results.get(NluKind::Intent).unwrap().ids().collect();
        assert_eq!(intents, vec!["a", "b"]);
        assert_eq!(results.get(NluKind::Language).unwrap().len(), 1);
        assert!(results.get(NluKind::Entities).is_none());
    }

    #[test]
    fn test_is_empty_ignores_empty_lists() {
        let results = NaturalLanguageResults::new().with(NluKind::Entities, NaturalLanguageResult::new());
        assert!(results.is_empty());
    }
}
