//! Elasticsearch cluster status check
//!
//! At init the check reads the local node's identity (`GET /`) and whether
//! this node is the elected master (`GET /_cat/master`). Each run refreshes
//! the leadership flag unless `leadership_snapshot_only` is set.
//!
//! Leader detection is a single observation compared by node name: during a
//! split brain several nodes can all see themselves as master.
//!
//! Shard collection is not implemented yet. Runs report no messages and wait
//! `run_delay_ms` in its place.

use super::{Check, MessageBody};
use crate::config::AgentConfig;
use crate::discovery::SystemInfo;
use crate::elastic::{string_at, ElasticClient, AGENT_VERSION};
use crate::error::CheckError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Sentinel for identity fields the node did not report
pub const UNKNOWN: &str = "unknown";

/// Last observed cluster state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterStatus {
    pub node_name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub is_leader: bool,
    pub last_run: Option<DateTime<Utc>>,
}

impl ClusterStatus {
    /// Whether the node name was read from the cluster
    pub fn has_identity(&self) -> bool {
        !self.node_name.is_empty() && self.node_name != UNKNOWN
    }

    /// Fill identity fields from a `GET /` body, warning on each missing one
    pub fn apply_info(&mut self, doc: &Value) {
        self.cluster_name = field_or_unknown(doc, "/cluster_name", "cluster name");
        self.cluster_uuid = field_or_unknown(doc, "/cluster_uuid", "cluster UUID");
        self.node_name = field_or_unknown(doc, "/name", "node name");
    }
}

fn field_or_unknown(doc: &Value, pointer: &str, label: &str) -> String {
    string_at(doc, pointer).unwrap_or_else(|| {
        warn!("unable to find elasticsearch {}", label);
        UNKNOWN.to_string()
    })
}

/// Compare the master reported by `_cat/master` with our own node name
pub fn leader_from_cat_master(doc: &Value, node_name: &str) -> bool {
    match string_at(doc, "/0/node") {
        Some(master) => master == node_name,
        None => {
            warn!("unable to find elasticsearch leader, defaulting to false");
            false
        }
    }
}

/// Check reporting the local Elasticsearch node identity and leadership
#[derive(Default)]
pub struct ElasticCheck {
    sys_info: Option<SystemInfo>,
    client: Option<ElasticClient>,
    status: Mutex<ClusterStatus>,
}

impl ElasticCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the last observed cluster state
    pub async fn status(&self) -> ClusterStatus {
        self.status.lock().await.clone()
    }

    pub fn system_info(&self) -> Option<&SystemInfo> {
        self.sys_info.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

async fn fetch_cluster_info(client: &ElasticClient, status: &mut ClusterStatus) {
    let doc = match client.info().await {
        Ok(doc) => doc,
        Err(e) => {
            error!("failed to get elasticsearch info: {}", e);
            return;
        }
    };

    status.apply_info(&doc);
    info!("elasticsearch cluster: {} ({})", status.cluster_name, status.cluster_uuid);
}

async fn is_leader(client: &ElasticClient, node_name: &str) -> bool {
    match client.cat_master().await {
        Ok(doc) => leader_from_cat_master(&doc, node_name),
        Err(e) => {
            warn!("failed to get elasticsearch leader info: {}", e);
            false
        }
    }
}

#[async_trait]
impl Check for ElasticCheck {
    fn name(&self) -> &'static str {
        "elastic"
    }

    fn real_time(&self) -> bool {
        false
    }

    async fn init(&mut self, cfg: &AgentConfig, info: &SystemInfo) {
        self.sys_info = Some(info.clone());
        self.client = None;

        info!("elastic-check agent version: {}", AGENT_VERSION);

        let settings = &cfg.elasticsearch;
        let timeout = settings.request_timeout_secs.map(Duration::from_secs);
        let client = match ElasticClient::new(&settings.url, timeout) {
            Ok(client) => client,
            Err(e) => {
                error!("failed to create elasticsearch client: {}", e);
                return;
            }
        };

        let status = self.status.get_mut();
        fetch_cluster_info(&client, status).await;
        status.is_leader = is_leader(&client, &status.node_name).await;

        info!(
            "elasticsearch node: {} (leader: {}), elastic-check initialized",
            status.node_name, status.is_leader
        );
        self.client = Some(client);
    }

    async fn run(&self, cfg: &AgentConfig, group_id: i32) -> Result<Vec<MessageBody>, CheckError> {
        let mut status = self.status.lock().await;

        // Don't run the check if the client could not be built
        let client = self.client.as_ref().ok_or(CheckError::NoClient("elasticsearch"))?;

        let started = Instant::now();
        status.last_run = Some(Utc::now());

        if !cfg.elasticsearch.leadership_snapshot_only {
            // Identity was not readable at init, the node may be up now
            if !status.has_identity() {
                fetch_cluster_info(client, &mut status).await;
            }

            let leader = is_leader(client, &status.node_name).await;
            if leader != status.is_leader {
                info!(
                    "elasticsearch node {} leadership changed: {} -> {}",
                    status.node_name, status.is_leader, leader
                );
            }
            status.is_leader = leader;
        }

        tokio::time::sleep(Duration::from_millis(cfg.elasticsearch.run_delay_ms)).await;

        info!("Collected {} shards in {:?}", 0, started.elapsed());
        debug!("elastic run for group {} done", group_id);

        Ok(Vec::new())
    }
}
