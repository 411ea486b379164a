//! Document-level orchestration: lookup, abstract fetch, resolution and output.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::{
    config::Settings,
    data::{html, search::CandidateLabels, warc},
    error::{LinkError, LinkResult},
    linking::{
        entity::{Candidate, DocumentContext, Mention, Resolution},
        resolve_mention, Outcome,
    },
    nlp::NlpPipeline,
};

/// Resolves a mention string to knowledge-base ids and their labels.
#[async_trait]
pub trait CandidateLookup: Send + Sync {
    async fn lookup_candidates(&self, mention: &str) -> LinkResult<CandidateLabels>;
}

/// Supplies the English abstracts of a knowledge-base entry.
#[async_trait]
pub trait AbstractSource: Send + Sync {
    async fn fetch_abstracts(&self, kb_id: &str) -> LinkResult<Vec<String>>;
}

/// Per-document tally of what happened to each mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentReport {
    pub doc_id: String,
    pub mentions: usize,
    pub resolutions: Vec<Resolution>,
    /// Mentions left unresolved because no candidate had an abstract or the
    /// document had no usable context.
    pub skipped: usize,
    /// Mentions whose lookup or scoring failed.
    pub failed: usize,
}

/// Links the mentions of one document at a time, strictly in order.
#[derive(Clone)]
pub struct Linker {
    lookup: Arc<dyn CandidateLookup>,
    abstracts: Arc<dyn AbstractSource>,
    nlp: NlpPipeline,
    threshold: f64,
}

impl Linker {
    pub fn new(
        lookup: Arc<dyn CandidateLookup>,
        abstracts: Arc<dyn AbstractSource>,
        nlp: NlpPipeline,
        threshold: f64,
    ) -> Self {
        Self {
            lookup,
            abstracts,
            nlp,
            threshold,
        }
    }

    /// Mentions of a plain-text document, deduplicated by surface form.
    pub fn mentions(&self, doc_id: &str, text: &str) -> Vec<Mention> {
        let mut unique: IndexMap<String, Option<String>> = IndexMap::new();
        for found in self.nlp.recognizer.recognize(text) {
            unique.entry(found.text).or_insert(found.label);
        }
        unique
            .into_iter()
            .map(|(name, label)| Mention::new(name, doc_id).with_label(label))
            .collect()
    }

    /// Link every mention of an HTML document.
    #[instrument(skip(self, page))]
    pub async fn link_document(&self, doc_id: &str, page: &str) -> DocumentReport {
        let text = html::visible_text(page);
        self.link_text(doc_id, &text).await
    }

    /// Link every mention of an already extracted text.
    pub async fn link_text(&self, doc_id: &str, text: &str) -> DocumentReport {
        let mut mentions = self.mentions(doc_id, text);
        let context = DocumentContext::new(self.nlp.nouns.extract_noun_terms(text));
        let mut report = DocumentReport {
            doc_id: doc_id.to_string(),
            mentions: mentions.len(),
            ..DocumentReport::default()
        };
        if mentions.is_empty() {
            return report;
        }
        if context.is_empty() {
            warn!(%doc_id, "document has no context terms; skipping its mentions");
            report.skipped = mentions.len();
            return report;
        }
        info!(%doc_id, mentions = mentions.len(), context = context.len(), "linking document");

        for mention in &mut mentions {
            match self.resolve(mention, &context).await {
                Ok(Outcome::Resolved(_)) => {
                    if let Some(resolution) = mention.resolution() {
                        report.resolutions.push(resolution);
                    }
                }
                Ok(Outcome::NoCandidatesSurvived) => {
                    info!(mention = %mention.name, "no candidate with an abstract");
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(mention = %mention.name, error = %err, "failed to resolve mention");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Look up, fetch abstracts for and score the candidates of one mention.
    pub async fn resolve(
        &self,
        mention: &mut Mention,
        context: &DocumentContext,
    ) -> LinkResult<Outcome> {
        let found = self.lookup.lookup_candidates(&mention.name).await?;
        let mut candidates = Vec::with_capacity(found.len());
        for (kb_id, labels) in found {
            let mut candidate = Candidate::new(kb_id).with_labels(labels);
            match self.abstracts.fetch_abstracts(&candidate.kb_id).await {
                Ok(abstracts) => candidate.abstracts = Some(abstracts),
                Err(LinkError::InvalidKbId(id)) => {
                    warn!(kb_id = %id, "unmappable knowledge-base id; candidate dropped");
                }
                Err(err) => return Err(err),
            }
            candidates.push(candidate);
        }
        resolve_mention(
            mention,
            candidates,
            context,
            self.nlp.nouns.as_ref(),
            self.threshold,
        )
    }
}

/// Counters and timestamps of a `link` run, persisted as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub archives: usize,
    pub failed_archives: usize,
    pub documents: usize,
    pub mentions: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            archives: 0,
            failed_archives: 0,
            documents: 0,
            mentions: 0,
            resolved: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, report: &DocumentReport) {
        self.documents += 1;
        self.mentions += report.mentions;
        self.resolved += report.resolutions.len();
        self.skipped += report.skipped;
        self.failed += report.failed;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

/// Tab-separated link table: `doc_id \t mention \t kb_id`, no header row.
pub struct LinkTable<W: Write> {
    writer: csv::Writer<W>,
}

impl LinkTable<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("create {path:?}"))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> LinkTable<W> {
    pub fn from_writer(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(inner);
        Self { writer }
    }

    pub fn write(&mut self, resolution: &Resolution) -> Result<()> {
        self.writer.serialize(resolution)?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("flushing link table: {}", err.error()))
    }
}

/// Link every document of every archive, streaming resolutions to `out` and to
/// `links.tsv` in the outputs folder.
pub async fn link_archives<O: Write>(
    settings: &Settings,
    archives: &[PathBuf],
    linker: &Linker,
    out: &mut O,
) -> Result<RunSummary> {
    settings.ensure_outputs_dir()?;
    let mut table = LinkTable::create(&settings.join_output("links.tsv"))?;
    let mut summary = RunSummary::start();

    for archive in archives {
        summary.archives += 1;
        let documents = match warc::read_documents(archive, settings.max_records) {
            Ok(documents) => documents,
            Err(err) => {
                error!(archive = %archive.display(), error = %err, "skipping unreadable archive");
                summary.failed_archives += 1;
                continue;
            }
        };
        info!(archive = %archive.display(), "reading archive");

        let mut linked = 0usize;
        for document in documents {
            let document = match document {
                Ok(document) => document,
                Err(err) => {
                    error!(archive = %archive.display(), error = %err, "archive read failed; skipping the rest");
                    summary.failed_archives += 1;
                    break;
                }
            };
            let report = linker.link_document(&document.id, &document.html).await;
            for resolution in &report.resolutions {
                writeln!(out, "{resolution}")?;
                table.write(resolution)?;
            }
            summary.record(&report);
            linked += 1;
        }
        info!(archive = %archive.display(), documents = linked, "finished archive");
    }

    table.into_inner()?.flush()?;
    summary.finish();
    write_summary(&summary, &settings.join_output("run_summary.json"))?;
    info!(
        documents = summary.documents,
        resolved = summary.resolved,
        failed = summary.failed,
        "link run finished"
    );
    Ok(summary)
}

fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
