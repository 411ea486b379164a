//! Entity linking over web-crawl archives.
//!
//! Mentions recognized in crawled pages are looked up in a full-text search index,
//! the candidates' English abstracts are fetched from a SPARQL knowledge base, and
//! each candidate is scored by lexical overlap between its abstract nouns and the
//! document's noun vocabulary. The best scorer is emitted as
//! `doc_id \t mention \t kb_id`.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod linking;
pub mod logging;
pub mod nlp;
