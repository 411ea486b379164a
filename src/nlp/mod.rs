//! Natural language processing collaborators: mention recognition and noun terms.

pub mod ner;
pub mod nouns;
pub mod tagger;
pub mod tokens;

use std::sync::Arc;

use tracing::info;

use crate::nlp::{
    ner::{MentionRecognizer, ProperNounRecognizer},
    nouns::{NounExtractor, TaggedNounExtractor},
};

/// NLP components resolved once per process and shared by every document.
#[derive(Clone)]
pub struct NlpPipeline {
    pub recognizer: Arc<dyn MentionRecognizer>,
    pub nouns: Arc<dyn NounExtractor>,
}

impl NlpPipeline {
    pub fn new(recognizer: Arc<dyn MentionRecognizer>, nouns: Arc<dyn NounExtractor>) -> Self {
        Self { recognizer, nouns }
    }
}

/// Load the rule-based recognizer and noun extractor.
pub fn load_pipeline() -> NlpPipeline {
    info!("loading rule-based nlp pipeline");
    NlpPipeline::new(
        Arc::new(ProperNounRecognizer::default()),
        Arc::new(TaggedNounExtractor::default()),
    )
}
