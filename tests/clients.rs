use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use warc_linker::{
    config::Settings,
    data::{
        kb::{
            abstract_query, english_abstracts, freebase_resource, with_retries, KbClient,
            SparqlResponse,
        },
        search::{group_hits, top_scored, LookupStrategy, SearchClient, SearchResponse},
    },
    error::LinkError,
};

fn search_payload() -> SearchResponse {
    serde_json::from_value(json!({
        "hits": {
            "hits": [
                {"_score": 1.5, "_source": {"label": "Vrije Universiteit", "resource": "/m/vu"}},
                {"_score": 3.0, "_source": {"label": "Harvard", "resource": "/m/harvard"}},
                {"_score": 2.0, "_source": {"label": "VU Amsterdam", "resource": "/m/vu"}},
                {"_score": 9.0, "_source": {"label": "orphan"}},
                {"_score": 3.0, "_source": {"label": "Harvard University", "resource": "/m/harvard"}}
            ]
        }
    }))
    .unwrap()
}

#[test]
fn hits_are_grouped_by_resource_in_hit_order() {
    let grouped = group_hits(search_payload().hits.hits);
    let ids: Vec<_> = grouped.keys().map(String::as_str).collect();
    assert_eq!(ids, ["/m/vu", "/m/harvard"]);
    let vu: Vec<_> = grouped["/m/vu"].iter().map(String::as_str).collect();
    assert_eq!(vu, ["Vrije Universiteit", "VU Amsterdam"]);
}

#[test]
fn top_scored_keeps_best_hits_with_stable_ties() {
    let best = top_scored(search_payload().hits.hits, 3);
    let labels: Vec<_> = best
        .iter()
        .map(|hit| hit.source.label.as_deref().unwrap())
        .collect();
    assert_eq!(labels, ["orphan", "Harvard", "Harvard University"]);

    let grouped = group_hits(best);
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped["/m/harvard"].len(), 2);
}

#[test]
fn empty_search_payload_is_accepted() {
    let payload: SearchResponse = serde_json::from_str("{}").unwrap();
    assert!(group_hits(payload.hits.hits).is_empty());
}

#[test]
fn freebase_ids_map_to_rdf_resources() {
    assert_eq!(freebase_resource("/m/02jgh").unwrap(), "m.02jgh");
    assert!(matches!(freebase_resource("/m/"), Err(LinkError::InvalidKbId(_))));
    assert!(matches!(freebase_resource(""), Err(LinkError::InvalidKbId(_))));
}

#[test]
fn abstract_query_follows_same_as_links() {
    let query = abstract_query("/m/02jgh").unwrap();
    assert!(query.starts_with("select distinct ?abstract where {"));
    assert!(query.contains("<http://rdf.freebase.com/ns/m.02jgh>"));
    assert!(query.contains("<http://dbpedia.org/ontology/abstract> ?abstract"));
    assert!(query.ends_with('}'));
}

#[test]
fn only_english_abstracts_are_kept() {
    let response: SparqlResponse = serde_json::from_value(json!({
        "results": {
            "bindings": [
                {"abstract": {"value": "\"Amsterdam is the capital.\"@en"}},
                {"abstract": {"value": "\"Amsterdam ist die Hauptstadt.\"@de"}},
                {"abstract": {"value": "Typed literal", "xml:lang": "en"}},
                {"abstract": {"value": "Littéral", "xml:lang": "fr"}},
                {"abstract": {"value": "\"Quoted tag\"@en\""}},
                {"other": {"value": "ignored"}}
            ]
        }
    }))
    .unwrap();
    assert_eq!(
        english_abstracts(&response),
        ["Amsterdam is the capital.", "Typed literal", "Quoted tag"]
    );
}

#[tokio::test]
async fn parse_failures_are_retried_until_success() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let result = with_retries(3, Duration::ZERO, || async move {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < 3 {
            Err(LinkError::MalformedResponse {
                service: "knowledge base",
                detail: "truncated".into(),
            })
        } else {
            Ok(attempt)
        }
    })
    .await;
    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retries_give_up_after_max_attempts() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let result: Result<(), _> = with_retries(3, Duration::ZERO, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(LinkError::MalformedResponse {
            service: "knowledge base",
            detail: "not json".into(),
        })
    })
    .await;
    assert!(matches!(result, Err(LinkError::MalformedResponse { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn other_errors_are_not_retried() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let result: Result<(), _> = with_retries(3, Duration::ZERO, || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(LinkError::InvalidKbId("x".into()))
    })
    .await;
    assert!(matches!(result, Err(LinkError::InvalidKbId(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Loopback HTTP server answering each connection with the next canned
/// response (the last one repeats) and recording the raw requests.
struct CannedServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            let mut served = 0usize;
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);
                let (status, body) = responses[served.min(responses.len() - 1)];
                served += 1;
                let reply = format!(
                    "HTTP/1.1 {status} Canned\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Self { addr, requests }
    }

    fn settings(&self) -> Settings {
        Settings {
            es_domain: self.addr.to_string(),
            kb_domain: self.addr.to_string(),
            kb_retry_delay_ms: 0,
            http_timeout_secs: 5,
            ..Settings::default()
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = socket.read(&mut chunk).await.unwrap_or(0);
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..read]);
        let text = String::from_utf8_lossy(&raw);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

const SEARCH_BODY: &str = r#"{"hits":{"hits":[
    {"_score":2.0,"_source":{"label":"Vrije Universiteit","resource":"/m/vu"}},
    {"_score":1.0,"_source":{"label":"VU Amsterdam","resource":"/m/vu"}}
]}}"#;

const SPARQL_BODY: &str = r#"{"results":{"bindings":[
    {"abstract":{"type":"literal","xml:lang":"en","value":"Amsterdam is the capital."}},
    {"abstract":{"type":"literal","xml:lang":"nl","value":"Amsterdam is de hoofdstad."}}
]}}"#;

#[tokio::test]
async fn search_queries_the_label_index() {
    let server = CannedServer::start(vec![(200, SEARCH_BODY)]).await;
    let client = SearchClient::new(&server.settings(), LookupStrategy::All).unwrap();

    let grouped = client.search("Vrije University").await.unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped["/m/vu"].len(), 2);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /freebase/label/_search?q=Vrije%20University&size=20 "));
}

#[tokio::test]
async fn search_status_errors_are_upstream_failures() {
    let server = CannedServer::start(vec![(500, "{}")]).await;
    let client = SearchClient::new(&server.settings(), LookupStrategy::All).unwrap();
    let err = client.search("Amsterdam").await.unwrap_err();
    assert!(matches!(err, LinkError::Upstream { .. }));
}

#[tokio::test]
async fn undecodable_search_body_is_malformed() {
    let server = CannedServer::start(vec![(200, "not json")]).await;
    let client = SearchClient::new(&server.settings(), LookupStrategy::All).unwrap();
    let err = client.search("Amsterdam").await.unwrap_err();
    assert!(matches!(err, LinkError::MalformedResponse { .. }));
}

#[tokio::test]
async fn abstracts_are_reposted_until_the_body_parses() {
    let server = CannedServer::start(vec![
        (200, "<html>busy</html>"),
        (200, "{\"results\":"),
        (200, SPARQL_BODY),
    ])
    .await;
    let client = KbClient::new(&server.settings()).unwrap();

    let abstracts = client.abstracts("/m/02jgh").await.unwrap();
    assert_eq!(abstracts, ["Amsterdam is the capital."]);

    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert!(request.starts_with("POST /sparql "));
        assert!(request.contains("print=true"));
        assert!(request.contains("query=select+distinct+%3Fabstract"));
        assert!(request.contains("m.02jgh"));
    }
}

#[tokio::test]
async fn abstracts_give_up_after_the_configured_attempts() {
    let server = CannedServer::start(vec![(200, "not json")]).await;
    let client = KbClient::new(&server.settings()).unwrap();
    let err = client.abstracts("/m/02jgh").await.unwrap_err();
    assert!(matches!(err, LinkError::MalformedResponse { .. }));
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn knowledge_base_status_errors_are_not_retried() {
    let server = CannedServer::start(vec![(500, "{}")]).await;
    let client = KbClient::new(&server.settings()).unwrap();
    let err = client.abstracts("/m/02jgh").await.unwrap_err();
    assert!(matches!(err, LinkError::Upstream { .. }));
    assert_eq!(server.requests().len(), 1);
}
