//! Word tokenization and token cleanup shared by mention and noun extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// A cleaned word token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// First word after a sentence boundary (or of the text).
    pub sentence_start: bool,
}

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:['’-]\w+)*|[^\w\s]").expect("valid regex"));
static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9][A-F]").expect("valid regex"));
static NON_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\W_]+").expect("valid regex"));

/// Split text into raw word and punctuation tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Drop digit/hex-letter pairs such as `3F` that leak from encoded markup.
pub fn remove_hex(token: &str) -> String {
    HEX_PATTERN.replace_all(token, "").into_owned()
}

/// Strip every non-alphanumeric character (underscores included).
pub fn remove_non_alphanumeric(token: &str) -> String {
    NON_WORD_PATTERN.replace_all(token, "").into_owned()
}

pub fn remove_digits(token: &str) -> String {
    token.chars().filter(|c| !c.is_numeric()).collect()
}

/// Apply every cleanup step; `None` when nothing is left.
pub fn clean_token(raw: &str) -> Option<String> {
    let cleaned = remove_digits(&remove_non_alphanumeric(&remove_hex(raw)));
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Tokenize and clean `text`, remembering where sentences begin.
pub fn word_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut sentence_start = true;
    for raw in tokenize(text) {
        if matches!(raw, "." | "!" | "?") {
            sentence_start = true;
            continue;
        }
        if let Some(cleaned) = clean_token(raw) {
            tokens.push(Token {
                text: cleaned,
                sentence_start,
            });
            sentence_start = false;
        }
    }
    tokens
}
