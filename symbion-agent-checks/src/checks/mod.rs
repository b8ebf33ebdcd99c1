//! Checks run by the agent
//!
//! A check is initialized once with the agent config and the host descriptor,
//! then run periodically by the runner. `init` takes `&mut self`, so a check
//! can only be shared for `run` once its initialization has completed.

pub mod elastic;

use crate::config::AgentConfig;
use crate::discovery::SystemInfo;
use crate::error::CheckError;
use async_trait::async_trait;
use serde::Serialize;

pub use elastic::{ClusterStatus, ElasticCheck};

/// One report produced by a check run
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub check: String,
    pub group_id: i32,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait Check: Send + Sync {
    /// Stable identifier of the check
    fn name(&self) -> &'static str;

    /// Whether the check only runs in real-time mode
    fn real_time(&self) -> bool;

    async fn init(&mut self, cfg: &AgentConfig, info: &SystemInfo);

    async fn run(&self, cfg: &AgentConfig, group_id: i32) -> Result<Vec<MessageBody>, CheckError>;
}

/// All checks known to the agent, uninitialized
pub fn all() -> Vec<Box<dyn Check>> {
    vec![Box::new(ElasticCheck::new())]
}
