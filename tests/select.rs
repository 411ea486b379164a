use warc_linker::{
    error::LinkError,
    linking::{
        entity::{Candidate, DocumentContext, Mention},
        resolve_mention,
        select::{filter_with_abstract, select_best},
        similarity::DEFAULT_THRESHOLD,
        Outcome,
    },
    nlp::nouns::TaggedNounExtractor,
};

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn filtering_keeps_only_candidates_with_abstracts() {
    let candidates = vec![
        Candidate::new("/m/empty").with_abstracts(Some(vec![])),
        Candidate::new("/m/unset"),
        Candidate::new("/m/kept").with_abstracts(Some(terms(&["a"]))),
    ];
    let kept = filter_with_abstract(candidates);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].kb_id, "/m/kept");
}

#[test]
fn filtering_preserves_order_and_accepts_empty_input() {
    assert!(filter_with_abstract(Vec::new()).is_empty());

    let candidates = vec![
        Candidate::new("/m/b").with_abstracts(Some(terms(&["b"]))),
        Candidate::new("/m/x"),
        Candidate::new("/m/a").with_abstracts(Some(terms(&["a"]))),
    ];
    let ids: Vec<_> = filter_with_abstract(candidates)
        .into_iter()
        .map(|c| c.kb_id)
        .collect();
    assert_eq!(ids, ["/m/b", "/m/a"]);
}

#[test]
fn best_candidate_wins_and_scores_are_recorded() {
    let context = terms(&["Amsterdam", "University", "Vrije"]);
    let mut candidates = vec![
        Candidate::new("/m/a").with_nouns(terms(&["Amsterdam", "College"])),
        Candidate::new("/m/b").with_nouns(terms(&["Harvard"])),
    ];
    let best = select_best(&mut candidates, &context, DEFAULT_THRESHOLD)
        .unwrap()
        .unwrap();
    assert_eq!(best.kb_id, "/m/a");
    assert!((best.score.unwrap() - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(candidates[1].score, Some(0.0));
}

#[test]
fn ties_keep_the_earliest_candidate() {
    let context = terms(&["Paris"]);
    let mut candidates = vec![
        Candidate::new("/m/first").with_nouns(terms(&["Paris"])),
        Candidate::new("/m/second").with_nouns(terms(&["Paris"])),
    ];
    let best = select_best(&mut candidates, &context, DEFAULT_THRESHOLD)
        .unwrap()
        .unwrap();
    assert_eq!(best.kb_id, "/m/first");
}

#[test]
fn all_zero_scores_keep_the_first_candidate() {
    let context = terms(&["Paris"]);
    let mut candidates = vec![
        Candidate::new("/m/first").with_nouns(terms(&["London"])),
        Candidate::new("/m/second"),
    ];
    let best = select_best(&mut candidates, &context, DEFAULT_THRESHOLD)
        .unwrap()
        .unwrap();
    assert_eq!(best.kb_id, "/m/first");
}

#[test]
fn empty_candidate_list_selects_nothing() {
    let mut candidates: Vec<Candidate> = Vec::new();
    let best = select_best(&mut candidates, &terms(&["Paris"]), DEFAULT_THRESHOLD).unwrap();
    assert!(best.is_none());
}

#[test]
fn empty_context_fails_selection() {
    let context: Vec<String> = Vec::new();
    let mut candidates = vec![Candidate::new("/m/a").with_nouns(terms(&["Paris"]))];
    let err = select_best(&mut candidates, &context, DEFAULT_THRESHOLD).unwrap_err();
    assert!(matches!(err, LinkError::EmptyContext));
}

#[test]
fn mention_without_abstracts_is_not_resolved() {
    let mut mention = Mention::new("Paris", "doc-1");
    let candidates = vec![
        Candidate::new("/m/paris_city").with_abstracts(Some(vec![])),
        Candidate::new("/m/paris_hilton"),
    ];
    let context = DocumentContext::new(terms(&["Paris", "France"]));
    let outcome = resolve_mention(
        &mut mention,
        candidates,
        &context,
        &TaggedNounExtractor::default(),
        DEFAULT_THRESHOLD,
    )
    .unwrap();
    assert_eq!(outcome, Outcome::NoCandidatesSurvived);
    assert!(mention.resolution().is_none());
}

#[test]
fn resolution_extracts_nouns_from_abstracts() {
    let mut mention = Mention::new("Vrije University", "clueweb12-0000tw-00-00013");
    let candidates = vec![
        Candidate::new("/m/harvard")
            .with_labels(["Harvard"])
            .with_abstracts(Some(terms(&["Harvard is a college in Cambridge."]))),
        Candidate::new("/m/vu")
            .with_labels(["Vrije Universiteit Amsterdam"])
            .with_abstracts(Some(terms(&["The Vrije Universiteit is a university in Amsterdam."]))),
    ];
    let context = DocumentContext::new(terms(&["Amsterdam", "University", "Vrije"]));
    let outcome = resolve_mention(
        &mut mention,
        candidates,
        &context,
        &TaggedNounExtractor::default(),
        DEFAULT_THRESHOLD,
    )
    .unwrap();

    let Outcome::Resolved(best) = outcome else {
        panic!("expected a resolution");
    };
    assert_eq!(best.kb_id, "/m/vu");
    assert!(best.nouns.as_ref().unwrap().contains(&"Amsterdam".to_string()));
    let resolution = mention.resolution().unwrap();
    assert_eq!(
        resolution.to_string(),
        "clueweb12-0000tw-00-00013\tVrije University\t/m/vu"
    );
}
