/*!
Test Harness pour checks Symbion

Facilite l'écriture de tests pour checks avec:
- Démarrage automatique du faux serveur Elasticsearch
- Capture des événements `tracing` émis pendant le test
- Assertions sur les logs (warnings, erreurs)
*/

use crate::es_stub::MockElasticsearch;
use anyhow::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Événement de log capturé
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Layer `tracing-subscriber` qui enregistre chaque événement
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installe la capture comme subscriber du thread courant
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Vrai si un événement du niveau donné contient `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.contains(Level::WARN, needle)
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.contains(Level::ERROR, needle)
    }

    pub fn count(&self, level: Level) -> usize {
        self.events.lock().iter().filter(|e| e.level == level).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.events.lock().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
        });
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Harness de test complet: faux cluster + capture des logs
pub struct TestHarness {
    pub elastic: MockElasticsearch,
    pub logs: LogCapture,
    _guard: DefaultGuard,
}

impl TestHarness {
    /// Démarre un faux noeud Elasticsearch et installe la capture de logs
    pub async fn start(info: Value, master: Value) -> Result<Self> {
        let logs = LogCapture::new();
        let guard = logs.install();
        let elastic = MockElasticsearch::start(info, master).await?;

        Ok(Self {
            elastic,
            logs,
            _guard: guard,
        })
    }

    pub fn elastic_url(&self) -> String {
        self.elastic.url()
    }
}

/// URL locale sur laquelle plus rien n'écoute (erreurs de transport)
pub async fn unreachable_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ElasticPayloads;

    #[test]
    fn test_log_capture_records_levels() {
        let logs = LogCapture::new();
        let _guard = logs.install();

        tracing::info!("starting {}", "check");
        tracing::warn!("unable to find elasticsearch cluster name");
        tracing::error!("boom");

        assert!(logs.has_warning("cluster name"));
        assert!(logs.has_error("boom"));
        assert!(!logs.has_warning("boom"));
        assert_eq!(logs.count(Level::INFO), 1);
        assert_eq!(logs.events()[0].message, "starting check");

        logs.clear();
        assert!(logs.events().is_empty());
    }

    #[tokio::test]
    async fn test_harness_starts_stub() {
        let harness = TestHarness::start(
            ElasticPayloads::info("i-ABC", "dd-test", "XYZ"),
            ElasticPayloads::cat_master("i-ABC"),
        )
        .await
        .unwrap();

        assert!(harness.elastic_url().starts_with("http://127.0.0.1:"));
        assert!(harness.elastic.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_url_refuses() {
        let url = unreachable_url().await.unwrap();
        assert!(reqwest::get(url).await.is_err());
    }
}
