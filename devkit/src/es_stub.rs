/*!
Faux serveur Elasticsearch pour développement sans cluster

Expose en HTTP local les deux routes consultées par le check Elasticsearch
(`/` et `/_cat/master`). Les réponses sont modifiables à chaud et toutes les
requêtes reçues sont enregistrées pour les assertions de tests.
*/

use anyhow::Result;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Réponse servie par une route du stub
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
}

impl StubReply {
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    /// Corps brut, pas forcément du JSON valide
    pub fn raw<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Requête reçue par le stub
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
}

struct StubState {
    info: StubReply,
    master: StubReply,
    requests: Vec<RecordedRequest>,
}

type SharedStub = Arc<Mutex<StubState>>;

/// Mock Elasticsearch qui répond comme un noeud local sur un port éphémère
#[derive(Clone)]
pub struct MockElasticsearch {
    addr: SocketAddr,
    state: SharedStub,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl MockElasticsearch {
    /// Démarre le stub sur 127.0.0.1 avec les payloads `/` et `/_cat/master`
    pub async fn start(info: Value, master: Value) -> Result<Self> {
        Self::start_with(StubReply::json(&info), StubReply::json(&master)).await
    }

    pub async fn start_with(info: StubReply, master: StubReply) -> Result<Self> {
        let state: SharedStub = Arc::new(Mutex::new(StubState {
            info,
            master,
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/", get(info_handler))
            .route("/_cat/master", get(master_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[MOCK] elasticsearch stub stopped: {}", e);
            }
        });

        tracing::debug!("[MOCK] elasticsearch stub listening on {}", addr);

        Ok(Self {
            addr,
            state,
            shutdown: Arc::new(Mutex::new(Some(tx))),
        })
    }

    /// URL de base à donner au client (`http://127.0.0.1:<port>`)
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_info(&self, info: Value) {
        self.state.lock().info = StubReply::json(&info);
    }

    pub fn set_master(&self, master: Value) {
        self.state.lock().master = StubReply::json(&master);
    }

    pub fn set_master_reply(&self, reply: StubReply) {
        self.state.lock().master = reply;
    }

    /// Récupère toutes les requêtes reçues (pour assertions de tests)
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Trouve les requêtes reçues sur un chemin donné
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Arrête le serveur; les requêtes suivantes échouent au niveau transport
    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
    }
}

async fn info_handler(State(state): State<SharedStub>) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let reply = {
        let mut s = state.lock();
        s.requests.push(RecordedRequest {
            path: "/".to_string(),
            query: None,
        });
        s.info.clone()
    };
    respond(reply)
}

async fn master_handler(
    State(state): State<SharedStub>,
    RawQuery(query): RawQuery,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let reply = {
        let mut s = state.lock();
        s.requests.push(RecordedRequest {
            path: "/_cat/master".to_string(),
            query,
        });
        s.master.clone()
    };
    respond(reply)
}

fn respond(reply: StubReply) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stub_serves_info_and_master() {
        let stub = MockElasticsearch::start(
            json!({"name": "i-ABC", "cluster_name": "dd-test"}),
            json!([{"node": "i-ABC"}]),
        )
        .await
        .unwrap();

        let info: Value = reqwest::get(stub.url()).await.unwrap().json().await.unwrap();
        assert_eq!(info["cluster_name"], "dd-test");

        let master: Value = reqwest::get(format!("{}/_cat/master?format=json", stub.url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(master[0]["node"], "i-ABC");

        let recorded = stub.requests_to("/_cat/master");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].query.as_deref(), Some("format=json"));
        assert_eq!(stub.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stub_replies_can_change() {
        let stub = MockElasticsearch::start(json!({}), json!([{"node": "a"}])).await.unwrap();
        stub.set_master(json!([{"node": "b"}]));

        let master: Value = reqwest::get(format!("{}/_cat/master", stub.url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(master[0]["node"], "b");

        stub.set_master_reply(StubReply::raw(503, "unavailable"));
        let resp = reqwest::get(format!("{}/_cat/master", stub.url())).await.unwrap();
        assert_eq!(resp.status().as_u16(), 503);
        assert_eq!(resp.text().await.unwrap(), "unavailable");
    }

    #[tokio::test]
    async fn test_shutdown_refuses_connections() {
        let stub = MockElasticsearch::start(json!({}), json!([])).await.unwrap();
        stub.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(reqwest::get(stub.url()).await.is_err());
    }
}
