//! CLI entry-point for offline candidate scoring.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::Settings,
    linking::{
        entity::Candidate,
        select::{filter_with_abstract, select_best},
    },
    nlp,
};

/// Args for the `score` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSON file with `context` (or `text`) and `candidates`.
    pub file: PathBuf,
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Offline scoring input.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Context terms used as is.
    #[serde(default)]
    pub context: Vec<String>,
    /// Free text the context terms are extracted from when `context` is empty.
    #[serde(default)]
    pub text: Option<String>,
    pub candidates: Vec<Candidate>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw).context("parsing score fixture")?;
    let threshold = args.threshold.unwrap_or(settings.similarity_threshold);
    let pipeline = nlp::load_pipeline();

    let context = if fixture.context.is_empty() {
        fixture
            .text
            .as_deref()
            .map(|text| pipeline.nouns.extract_noun_terms(text))
            .unwrap_or_default()
    } else {
        fixture.context
    };
    if context.is_empty() {
        bail!("fixture has no context terms");
    }

    let mut candidates: Vec<Candidate> = filter_with_abstract(fixture.candidates)
        .into_iter()
        .map(|candidate| {
            let terms = pipeline.nouns.extract_noun_terms(&candidate.joined_abstract());
            candidate.with_nouns(terms)
        })
        .collect();
    let best = select_best(&mut candidates, &context, threshold)?.map(|c| c.kb_id.clone());

    for candidate in &candidates {
        println!(
            "{}\t{:.4}",
            candidate.kb_id,
            candidate.score.unwrap_or_default()
        );
    }
    match best {
        Some(kb_id) => println!("best\t{kb_id}"),
        None => println!("best\t-"),
    }
    Ok(())
}
