//! Lexical overlap between a document context and a candidate's abstract nouns.

use strsim::hamming;

use crate::error::{LinkError, LinkResult};

/// Term pairs must score strictly above this to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Normalised Hamming similarity of two terms in `[0.0, 1.0]`.
///
/// Positions are compared character by character, so terms of different length
/// never match (they score `0.0`) even when one is a prefix of the other.
pub fn term_similarity(a: &str, b: &str) -> f64 {
    match hamming(a, b) {
        Ok(distance) => {
            let len = a.chars().count();
            if len == 0 {
                1.0
            } else {
                1.0 - distance as f64 / len as f64
            }
        }
        Err(_) => 0.0,
    }
}

/// Count context/candidate term pairs scoring above `threshold`, normalised by the
/// number of context terms.
///
/// Every pair is counted, so a context term echoed several times in the candidate
/// bag contributes more than once and the result may exceed `1.0`.
pub fn similarity<C, T>(context_terms: &[C], candidate_terms: &[T], threshold: f64) -> LinkResult<f64>
where
    C: AsRef<str>,
    T: AsRef<str>,
{
    if context_terms.is_empty() {
        return Err(LinkError::EmptyContext);
    }

    let mut matches = 0usize;
    for context in context_terms {
        for candidate in candidate_terms {
            if term_similarity(context.as_ref(), candidate.as_ref()) > threshold {
                matches += 1;
            }
        }
    }

    Ok(matches as f64 / context_terms.len() as f64)
}
