//! Mention and candidate records flowing through a single resolution step.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A possible named-entity occurrence extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub name: String,
    pub doc_id: String,
    pub ner_label: Option<String>,
    best_candidate: Option<Candidate>,
}

impl Mention {
    pub fn new(name: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_id: doc_id.into(),
            ner_label: None,
            best_candidate: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.ner_label = label;
        self
    }

    /// Record the candidate chosen for this mention.
    pub fn attach(&mut self, candidate: Candidate) {
        self.best_candidate = Some(candidate);
    }

    pub fn best_candidate(&self) -> Option<&Candidate> {
        self.best_candidate.as_ref()
    }

    /// Output row for a resolved mention, if any.
    pub fn resolution(&self) -> Option<Resolution> {
        self.best_candidate.as_ref().map(|best| Resolution {
            doc_id: self.doc_id.clone(),
            mention: self.name.clone(),
            kb_id: best.kb_id.clone(),
        })
    }
}

/// A knowledge-base entry proposed as the referent of a mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub kb_id: String,
    #[serde(default)]
    pub labels: IndexSet<String>,
    /// English abstracts; `None` until the knowledge base was consulted.
    #[serde(default)]
    pub abstracts: Option<Vec<String>>,
    /// Noun terms derived from the concatenated abstracts.
    #[serde(default)]
    pub nouns: Option<Vec<String>>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl Candidate {
    pub fn new(kb_id: impl Into<String>) -> Self {
        Self {
            kb_id: kb_id.into(),
            labels: IndexSet::new(),
            abstracts: None,
            nouns: None,
            score: None,
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn with_abstracts(mut self, abstracts: Option<Vec<String>>) -> Self {
        self.abstracts = abstracts;
        self
    }

    pub fn with_nouns(mut self, nouns: Vec<String>) -> Self {
        self.nouns = Some(nouns);
        self
    }

    pub fn has_abstract(&self) -> bool {
        self.abstracts.as_ref().is_some_and(|list| !list.is_empty())
    }

    /// All abstracts joined by a single space, ready for noun extraction.
    pub fn joined_abstract(&self) -> String {
        self.abstracts
            .as_deref()
            .map(|list| list.join(" "))
            .unwrap_or_default()
    }

    pub fn noun_terms(&self) -> &[String] {
        self.nouns.as_deref().unwrap_or(&[])
    }
}

/// Bag of terms describing the lexical environment of a document's mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentContext(Vec<String>);

impl DocumentContext {
    pub fn new(terms: Vec<String>) -> Self {
        Self(terms)
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for DocumentContext {
    fn from(terms: Vec<String>) -> Self {
        Self(terms)
    }
}

/// One emitted link: `doc_id \t mention \t kb_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub doc_id: String,
    pub mention: String,
    pub kb_id: String,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.doc_id, self.mention, self.kb_id)
    }
}
