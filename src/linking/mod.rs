//! Candidate disambiguation: filtering, scoring and per-mention resolution.

pub mod entity;
pub mod pipeline;
pub mod select;
pub mod similarity;

use tracing::{debug, info};

use crate::{
    error::LinkResult,
    linking::{
        entity::{Candidate, DocumentContext, Mention},
        select::{filter_with_abstract, select_best},
    },
    nlp::nouns::NounExtractor,
};

/// Outcome of resolving one mention.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved(Candidate),
    /// No candidate carried an English abstract.
    NoCandidatesSurvived,
}

/// Resolve a mention whose candidates already carry their abstracts.
///
/// On success the winning candidate is also attached to `mention`.
pub fn resolve_mention(
    mention: &mut Mention,
    candidates: Vec<Candidate>,
    context: &DocumentContext,
    nouns: &dyn NounExtractor,
    threshold: f64,
) -> LinkResult<Outcome> {
    let total = candidates.len();
    let mut candidates: Vec<Candidate> = filter_with_abstract(candidates)
        .into_iter()
        .map(|candidate| {
            let terms = nouns.extract_noun_terms(&candidate.joined_abstract());
            candidate.with_nouns(terms)
        })
        .collect();
    debug!(mention = %mention.name, total, kept = candidates.len(), "filtered candidates");

    let Some(best) = select_best(&mut candidates, context.terms(), threshold)? else {
        return Ok(Outcome::NoCandidatesSurvived);
    };
    let best = best.clone();
    info!(
        mention = %mention.name,
        kb_id = %best.kb_id,
        score = best.score.unwrap_or_default(),
        "selected candidate"
    );
    mention.attach(best.clone());
    Ok(Outcome::Resolved(best))
}
