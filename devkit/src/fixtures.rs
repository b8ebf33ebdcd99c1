/*!
Payloads Elasticsearch pour tests

Reproduit la forme des réponses d'un noeud Elasticsearch 5.x/6.x sur les
routes `/` et `/_cat/master?format=json`.
*/

use serde_json::{json, Value};

/// Helper pour créer des réponses Elasticsearch formatées
pub struct ElasticPayloads;

impl ElasticPayloads {
    /// Réponse complète de `GET /`
    pub fn info(node: &str, cluster: &str, uuid: &str) -> Value {
        json!({
            "name": node,
            "cluster_name": cluster,
            "cluster_uuid": uuid,
            "version": {
                "number": "5.6.2",
                "build_hash": "57e20f3",
                "build_date": "2017-09-23T13:16:45.703Z",
                "build_snapshot": false,
                "lucene_version": "6.6.1"
            },
            "tagline": "You Know, for Search"
        })
    }

    /// Réponse de `GET /` sans le champ donné
    pub fn info_without(node: &str, cluster: &str, uuid: &str, missing: &str) -> Value {
        let mut info = Self::info(node, cluster, uuid);
        if let Some(obj) = info.as_object_mut() {
            obj.remove(missing);
        }
        info
    }

    /// Réponse de `GET /_cat/master?format=json`
    pub fn cat_master(node: &str) -> Value {
        json!([{
            "id": "8iGt13GbTR63qMBN4F4imQ",
            "host": "172.21.119.104",
            "ip": "172.21.119.104",
            "node": node
        }])
    }

    /// `_cat/master` d'un cluster sans master élu
    pub fn cat_master_empty() -> Value {
        json!([])
    }
}
