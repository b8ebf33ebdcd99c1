//! Minimal Elasticsearch REST client
//!
//! Only the two routes the cluster status check needs:
//! - `GET /` (node and cluster identity)
//! - `GET /_cat/master?format=json` (elected master)
//!
//! HTTP error statuses are not treated as failures: callers read whatever JSON
//! the node returned and fall back on missing fields.

use crate::error::ClientError;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Local node on the default Elasticsearch HTTP port
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Agent version, sent in the user agent and logged at init
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct ElasticClient {
    base: Url,
    http: reqwest::Client,
}

impl ElasticClient {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut base = Url::parse(url).map_err(|source| ClientError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ClientError::UnsupportedScheme(base.scheme().to_string()));
        }

        // Relative joins must land under a path prefix like `/es/`
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("symbion-agent-checks/{}", AGENT_VERSION))
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /`
    pub async fn info(&self) -> Result<Value, ClientError> {
        self.get_json("", &[]).await
    }

    /// `GET /_cat/master?format=json`
    pub async fn cat_master(&self) -> Result<Value, ClientError> {
        self.get_json("_cat/master", &[("format", "json")]).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let url = self.base.join(path).map_err(|source| ClientError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            source,
        })?;
        let route = format!("/{}", path);

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                path: route.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("elasticsearch {} answered {}", route, status);
        }

        // Reading the whole body hands the connection back to the pool
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                path: route.clone(),
                source,
            })?;

        Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!("elasticsearch {} returned non-JSON body: {}", route, e);
            Value::Null
        }))
    }
}

/// String at a JSON pointer, `None` when missing, null or empty.
/// Numbers and booleans are rendered as text.
pub fn string_at(doc: &Value, pointer: &str) -> Option<String> {
    match doc.pointer(pointer)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use symbion_devkit::{ElasticPayloads, MockElasticsearch};

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            ElasticClient::new("not a url", None),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ElasticClient::new("ftp://localhost:9200", None),
            Err(ClientError::UnsupportedScheme(s)) if s == "ftp"
        ));
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let client = ElasticClient::new("http://proxy.local/es", None).unwrap();
        assert_eq!(client.base_url().as_str(), "http://proxy.local/es/");
        assert_eq!(
            client.base_url().join("_cat/master").unwrap().as_str(),
            "http://proxy.local/es/_cat/master"
        );

        let client = ElasticClient::new(DEFAULT_URL, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9200/");
    }

    #[test]
    fn test_string_at() {
        let doc = json!({"name": "i-ABC", "empty": "", "nothing": null, "num": 3, "list": [{"node": "m"}]});
        assert_eq!(string_at(&doc, "/name").as_deref(), Some("i-ABC"));
        assert_eq!(string_at(&doc, "/empty"), None);
        assert_eq!(string_at(&doc, "/nothing"), None);
        assert_eq!(string_at(&doc, "/missing"), None);
        assert_eq!(string_at(&doc, "/num").as_deref(), Some("3"));
        assert_eq!(string_at(&doc, "/list/0/node").as_deref(), Some("m"));
        assert_eq!(string_at(&Value::Null, "/0/node"), None);
    }

    #[tokio::test]
    async fn test_requests_against_stub() {
        let stub = MockElasticsearch::start(
            ElasticPayloads::info("i-ABC", "dd-test", "XYZ"),
            ElasticPayloads::cat_master("i-ABC"),
        )
        .await
        .unwrap();
        let client = ElasticClient::new(&stub.url(), None).unwrap();

        let info = client.info().await.unwrap();
        assert_eq!(info["cluster_name"], "dd-test");

        let master = client.cat_master().await.unwrap();
        assert_eq!(master[0]["node"], "i-ABC");

        let recorded = stub.requests_to("/_cat/master");
        assert_eq!(recorded[0].query.as_deref(), Some("format=json"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_null() {
        let stub = MockElasticsearch::start_with(
            symbion_devkit::es_stub::StubReply::raw(500, "<html>oops</html>"),
            symbion_devkit::es_stub::StubReply::raw(200, "[]"),
        )
        .await
        .unwrap();
        let client = ElasticClient::new(&stub.url(), None).unwrap();

        assert_eq!(client.info().await.unwrap(), Value::Null);
        assert_eq!(client.cat_master().await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let url = symbion_devkit::test_utils::unreachable_url().await.unwrap();
        let client = ElasticClient::new(&url, None).unwrap();

        let err = client.info().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { ref path, .. } if path == "/"));
    }
}
