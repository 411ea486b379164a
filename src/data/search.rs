//! Full-text search index client resolving mention strings to knowledge-base ids.

use async_trait::async_trait;
use clap::ValueEnum;
use indexmap::{IndexMap, IndexSet};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use urlencoding::encode;

use crate::{
    config::Settings,
    data::http_client,
    error::{LinkError, LinkResult},
    linking::pipeline::CandidateLookup,
};

const SERVICE: &str = "search index";
/// Hits fetched before ranking with [`LookupStrategy::TopScored`].
const RANKING_POOL: usize = 100;

/// Knowledge-base ids mapped to the labels that matched the query, in hit order.
pub type CandidateLabels = IndexMap<String, IndexSet<String>>;

/// How search hits become candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LookupStrategy {
    /// Every hit in the first page.
    #[default]
    All,
    /// The best-scored hits out of a larger pool.
    TopScored,
}

/// Client for the `freebase/label` index.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    domain: String,
    size: usize,
    top: usize,
    strategy: LookupStrategy,
}

impl SearchClient {
    pub fn new(settings: &Settings, strategy: LookupStrategy) -> LinkResult<Self> {
        Ok(Self {
            client: http_client(settings, SERVICE)?,
            domain: settings.es_domain.clone(),
            size: settings.search_size,
            top: settings.top_candidates,
            strategy,
        })
    }

    /// Query the index and group labels per knowledge-base id.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> LinkResult<CandidateLabels> {
        if query.trim().is_empty() {
            return Ok(CandidateLabels::new());
        }
        let size = match self.strategy {
            LookupStrategy::All => self.size,
            LookupStrategy::TopScored => RANKING_POOL,
        };
        let url = format!(
            "http://{domain}/freebase/label/_search?q={query}&size={size}",
            domain = self.domain,
            query = encode(query),
            size = size,
        );
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| LinkError::Upstream {
                service: SERVICE,
                source,
            })?;
        let body = resp.text().await.map_err(|source| LinkError::Upstream {
            service: SERVICE,
            source,
        })?;
        let payload: SearchResponse =
            serde_json::from_str(&body).map_err(|err| LinkError::MalformedResponse {
                service: SERVICE,
                detail: err.to_string(),
            })?;
        let hits = payload.hits.hits;
        debug!(hits = hits.len(), "search returned");
        Ok(match self.strategy {
            LookupStrategy::All => group_hits(hits),
            LookupStrategy::TopScored => group_hits(top_scored(hits, self.top)),
        })
    }
}

#[async_trait]
impl CandidateLookup for SearchClient {
    async fn lookup_candidates(&self, mention: &str) -> LinkResult<CandidateLabels> {
        self.search(mention).await
    }
}

/// Group hits by resource, keeping first-seen order of ids and labels.
pub fn group_hits(hits: Vec<SearchHit>) -> CandidateLabels {
    let mut grouped = CandidateLabels::new();
    for hit in hits {
        let Some(resource) = hit.source.resource else {
            continue;
        };
        let labels = grouped.entry(resource).or_default();
        if let Some(label) = hit.source.label {
            labels.insert(label);
        }
    }
    grouped
}

/// Keep the `limit` best-scored hits; equal scores keep their hit order.
pub fn top_scored(mut hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));
    hits.truncate(limit);
    hits
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: SearchHits,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: HitSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitSource {
    pub label: Option<String>,
    pub resource: Option<String>,
}
