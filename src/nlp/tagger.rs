//! Rule-based part-of-speech tagging good enough to separate nouns from the rest.

use std::{collections::HashSet, fmt};

use once_cell::sync::Lazy;

use crate::nlp::tokens::Token;

/// Coarse Penn-style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    ProperNoun,
    Noun,
    Verb,
    Adverb,
    /// Stop word: determiner, pronoun, preposition, auxiliary...
    Function,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProperNoun => "NNP",
            Self::Noun => "NN",
            Self::Verb => "VB",
            Self::Adverb => "RB",
            Self::Function => "DT",
        }
    }

    pub fn is_noun(self) -> bool {
        matches!(self, Self::ProperNoun | Self::Noun)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

/// Tag a single cleaned token.
pub fn tag(token: &Token) -> Tag {
    let word = token.text.as_str();
    if is_stop_word(word) {
        return Tag::Function;
    }
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    match suffix_tag(word) {
        // Sentence-initial capitals say nothing about properness.
        Some(tag) if !capitalized || token.sentence_start => tag,
        _ if capitalized => Tag::ProperNoun,
        _ => Tag::Noun,
    }
}

fn suffix_tag(word: &str) -> Option<Tag> {
    if word.len() <= 4 {
        return None;
    }
    if word.ends_with("ly") {
        Some(Tag::Adverb)
    } else if word.ends_with("ing") || word.ends_with("ed") {
        Some(Tag::Verb)
    } else {
        None
    }
}

pub fn tag_all(tokens: &[Token]) -> Vec<(&Token, Tag)> {
    tokens.iter().map(|token| (token, tag(token))).collect()
}
