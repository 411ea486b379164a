//! Knowledge-base (SPARQL endpoint) client fetching English abstracts.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::{
    config::Settings,
    data::http_client,
    error::{LinkError, LinkResult},
    linking::pipeline::AbstractSource,
};

const SERVICE: &str = "knowledge base";
const FREEBASE_NS: &str = "http://rdf.freebase.com/ns/";
const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
const ABSTRACT: &str = "http://dbpedia.org/ontology/abstract";
const ENGLISH_TAG: &str = "@en";

/// Client for the SPARQL endpoint linking Freebase ids to DBpedia abstracts.
#[derive(Debug, Clone)]
pub struct KbClient {
    client: Client,
    domain: String,
    max_attempts: usize,
    retry_delay: Duration,
}

impl KbClient {
    pub fn new(settings: &Settings) -> LinkResult<Self> {
        Ok(Self {
            client: http_client(settings, SERVICE)?,
            domain: settings.kb_domain.clone(),
            max_attempts: settings.kb_max_attempts,
            retry_delay: settings.kb_retry_delay(),
        })
    }

    /// Run a raw query and return the decoded JSON document.
    #[instrument(skip(self))]
    pub async fn raw_query(&self, query: &str) -> LinkResult<serde_json::Value> {
        let body = self.post(query).await?;
        serde_json::from_str(&body).map_err(|err| LinkError::MalformedResponse {
            service: SERVICE,
            detail: err.to_string(),
        })
    }

    /// English abstracts recorded for a search-index identifier.
    #[instrument(skip(self))]
    pub async fn abstracts(&self, kb_id: &str) -> LinkResult<Vec<String>> {
        let query = abstract_query(kb_id)?;
        let query = query.as_str();
        let response = with_retries(self.max_attempts, self.retry_delay, || async move {
            let body = self.post(query).await?;
            serde_json::from_str::<SparqlResponse>(&body).map_err(|err| {
                LinkError::MalformedResponse {
                    service: SERVICE,
                    detail: err.to_string(),
                }
            })
        })
        .await?;
        let abstracts = english_abstracts(&response);
        debug!(%kb_id, count = abstracts.len(), "fetched english abstracts");
        Ok(abstracts)
    }

    async fn post(&self, query: &str) -> LinkResult<String> {
        let url = format!("http://{}/sparql", self.domain);
        let resp = self
            .client
            .post(url)
            .form(&[("print", "true"), ("query", query)])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| LinkError::Upstream {
                service: SERVICE,
                source,
            })?;
        resp.text().await.map_err(|source| LinkError::Upstream {
            service: SERVICE,
            source,
        })
    }
}

#[async_trait]
impl AbstractSource for KbClient {
    async fn fetch_abstracts(&self, kb_id: &str) -> LinkResult<Vec<String>> {
        self.abstracts(kb_id).await
    }
}

/// Run `op` up to `max_attempts` times, sleeping `delay` between attempts, as long
/// as it fails to parse the response. Other errors are returned immediately.
pub async fn with_retries<T, F, Fut>(max_attempts: usize, delay: Duration, mut op: F) -> LinkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LinkResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(err) if err.is_parse_failure() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %err, "retrying knowledge-base query");
                sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Map a search identifier such as `/m/02jgh` onto its RDF local name `m.02jgh`.
pub fn freebase_resource(kb_id: &str) -> LinkResult<String> {
    match kb_id.get(3..) {
        Some(local) if !local.is_empty() => Ok(format!("m.{local}")),
        _ => Err(LinkError::InvalidKbId(kb_id.to_string())),
    }
}

/// Query selecting every abstract of the resources `sameAs` the Freebase entity.
pub fn abstract_query(kb_id: &str) -> LinkResult<String> {
    let resource = freebase_resource(kb_id)?;
    Ok(format!(
        "select distinct ?abstract where {{ \
         ?s <{SAME_AS}> <{FREEBASE_NS}{resource}> . \
         ?s <{SAME_AS}> ?o . \
         ?o <{ABSTRACT}> ?abstract . }}"
    ))
}

/// Extract the English-tagged abstracts, stripped of quotes and language tag.
pub fn english_abstracts(response: &SparqlResponse) -> Vec<String> {
    response
        .results
        .bindings
        .iter()
        .filter_map(|binding| binding.abstract_value.as_ref())
        .filter_map(english_text)
        .collect()
}

fn english_text(term: &SparqlTerm) -> Option<String> {
    if term.lang.as_deref() == Some("en") {
        return Some(term.value.trim().to_string());
    }
    let raw = term.value.trim();
    let raw = raw.strip_suffix('"').unwrap_or(raw);
    let text = raw.strip_suffix(ENGLISH_TAG)?;
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);
    Some(text.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct SparqlResponse {
    #[serde(default)]
    pub results: SparqlResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<SparqlBinding>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlBinding {
    #[serde(rename = "abstract")]
    pub abstract_value: Option<SparqlTerm>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlTerm {
    pub value: String,
    #[serde(rename = "xml:lang")]
    pub lang: Option<String>,
}
