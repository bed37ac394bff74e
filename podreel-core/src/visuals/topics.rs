/// Fixed keyword vocabulary matched against caption text.
pub const TOPIC_VOCABULARY: [&str; 8] = [
    "technology",
    "business",
    "nature",
    "city",
    "people",
    "computer",
    "meeting",
    "data",
];

/// Topics used when nothing in the vocabulary matches.
pub const DEFAULT_TOPIC_PAIR: [&str; 2] = ["abstract", "technology"];

/// Content-topic extraction seam.
///
/// The keyword implementation below is a deliberately simple, swappable
/// strategy; an NLP-based extractor would implement the same trait.
pub trait TopicExtractor: Send + Sync {
    /// Extract topic labels from caption text. Must return at least one
    /// topic; implementations fall back to a default set when nothing
    /// matches.
    fn extract(&self, text: &str) -> Vec<String>;
}

/// Case-insensitive substring match against a fixed vocabulary, in
/// vocabulary order for determinism.
#[derive(Clone, Debug, Default)]
pub struct KeywordTopicExtractor;

impl TopicExtractor for KeywordTopicExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        let found: Vec<String> = TOPIC_VOCABULARY
            .iter()
            .filter(|keyword| haystack.contains(*keyword))
            .map(|keyword| (*keyword).to_owned())
            .collect();
        if found.is_empty() {
            DEFAULT_TOPIC_PAIR.iter().map(|t| (*t).to_owned()).collect()
        } else {
            found
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visuals/topics.rs"]
mod tests;
