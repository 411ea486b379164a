//! Heuristic mention recognition: runs of consecutive proper nouns.

use once_cell::sync::Lazy;

use crate::nlp::{
    tagger::{tag_all, Tag},
    tokens::word_tokens,
};

/// A mention surface form with an optional coarse entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedMention {
    pub text: String,
    pub label: Option<String>,
}

/// Trait for mention recognizers.
pub trait MentionRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<RecognizedMention>;
}

static ORG_CUES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "University",
        "College",
        "Institute",
        "School",
        "Academy",
        "Inc",
        "Corp",
        "Corporation",
        "Company",
        "Ltd",
        "Group",
        "Bank",
        "Foundation",
        "Association",
        "Party",
        "Museum",
        "Agency",
    ]
});

static PERSON_CUES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mr", "Mrs", "Ms", "Dr", "Prof", "Sir", "President", "Senator", "Judge",
    ]
});

static GPE_CUES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "City", "Republic", "Kingdom", "States", "County", "Province", "Island", "Islands",
    ]
});

/// Groups consecutive `NNP` tokens; runs shorter than `min_tokens` are dropped.
pub struct ProperNounRecognizer {
    min_tokens: usize,
}

impl ProperNounRecognizer {
    pub fn new(min_tokens: usize) -> Self {
        Self {
            min_tokens: min_tokens.max(1),
        }
    }
}

impl Default for ProperNounRecognizer {
    fn default() -> Self {
        Self::new(2)
    }
}

impl MentionRecognizer for ProperNounRecognizer {
    fn recognize(&self, text: &str) -> Vec<RecognizedMention> {
        let tokens = word_tokens(text);
        let mut mentions = Vec::new();
        let mut run: Vec<&str> = Vec::new();
        for (token, tag) in tag_all(&tokens) {
            // A new sentence always closes the current run.
            if tag != Tag::ProperNoun || token.sentence_start {
                flush(&mut run, self.min_tokens, &mut mentions);
            }
            if tag == Tag::ProperNoun {
                run.push(token.text.as_str());
            }
        }
        flush(&mut run, self.min_tokens, &mut mentions);
        mentions
    }
}

fn flush(run: &mut Vec<&str>, min_tokens: usize, out: &mut Vec<RecognizedMention>) {
    if run.len() >= min_tokens {
        out.push(RecognizedMention {
            text: run.join(" "),
            label: classify(run).map(str::to_string),
        });
    }
    run.clear();
}

fn classify(words: &[&str]) -> Option<&'static str> {
    if words.iter().any(|w| ORG_CUES.contains(w)) {
        Some("ORG")
    } else if words.first().is_some_and(|w| PERSON_CUES.contains(w)) {
        Some("PERSON")
    } else if words.iter().any(|w| GPE_CUES.contains(w)) {
        Some("GPE")
    } else {
        None
    }
}
