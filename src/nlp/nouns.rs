//! Noun vocabulary extraction for document contexts and candidate abstracts.

use crate::nlp::{tagger::tag_all, tokens::word_tokens};

/// Trait for noun-term extractors.
pub trait NounExtractor: Send + Sync {
    fn extract_noun_terms(&self, text: &str) -> Vec<String>;
}

/// Keeps tokens tagged `NN`/`NNP` that survive stop-word removal and are at least
/// `min_len` characters long.
pub struct TaggedNounExtractor {
    min_len: usize,
}

impl TaggedNounExtractor {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl Default for TaggedNounExtractor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl NounExtractor for TaggedNounExtractor {
    fn extract_noun_terms(&self, text: &str) -> Vec<String> {
        let tokens = word_tokens(text);
        tag_all(&tokens)
            .into_iter()
            .filter(|(token, tag)| tag.is_noun() && token.text.chars().count() >= self.min_len)
            .map(|(token, _)| token.text.clone())
            .collect()
    }
}
