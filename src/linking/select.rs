//! Candidate filtering and best-of selection.

use tracing::debug;

use crate::{
    error::LinkResult,
    linking::{entity::Candidate, similarity::similarity},
};

/// Keep the candidates that carry at least one abstract, preserving order.
pub fn filter_with_abstract(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(Candidate::has_abstract)
        .collect()
}

/// Score every candidate against `context_terms` and return the highest scorer.
///
/// Scores are stored on the candidates. Ties keep the earliest candidate. An empty
/// slice yields `Ok(None)`; an empty context fails with `EmptyContext`.
pub fn select_best<'a, C: AsRef<str>>(
    candidates: &'a mut [Candidate],
    context_terms: &[C],
    threshold: f64,
) -> LinkResult<Option<&'a Candidate>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter_mut().enumerate() {
        let score = similarity(context_terms, candidate.noun_terms(), threshold)?;
        candidate.score = Some(score);
        debug!(kb_id = %candidate.kb_id, score, "scored candidate");
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }

    match best {
        Some((idx, _)) => Ok(candidates.get(idx)),
        None => Ok(None),
    }
}
