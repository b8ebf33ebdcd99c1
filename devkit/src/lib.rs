/*!
# Symbion DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le développement des checks de l'agent Symbion avec:
- Faux serveur Elasticsearch pour tests sans cluster
- Payloads Elasticsearch prêts à l'emploi
- Capture des logs `tracing` pour assertions
*/

pub mod es_stub;
pub mod fixtures;
pub mod test_utils;

pub use es_stub::MockElasticsearch;
pub use fixtures::ElasticPayloads;
pub use test_utils::{LogCapture, TestHarness};
