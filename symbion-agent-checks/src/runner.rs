//! Periodic check runner
//!
//! Initializes every check once, then runs them in turn on a fixed interval.
//! A failing check is logged and skipped; it does not stop the others.

use crate::checks::{Check, MessageBody};
use crate::config::AgentConfig;
use crate::discovery::SystemInfo;
use crate::error::CheckError;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Outcome of one check in one round
pub struct CheckOutcome {
    pub name: &'static str,
    pub result: Result<Vec<MessageBody>, CheckError>,
}

pub struct CheckRunner {
    config: AgentConfig,
    system_info: SystemInfo,
    checks: Vec<Box<dyn Check>>,
    group_id: i32,
}

impl CheckRunner {
    pub fn new(config: AgentConfig, system_info: SystemInfo, checks: Vec<Box<dyn Check>>) -> Self {
        Self {
            config,
            system_info,
            checks,
            group_id: 0,
        }
    }

    /// Initialize all checks; must complete before any round
    pub async fn init(&mut self) {
        for check in self.checks.iter_mut() {
            info!("Initializing check {}", check.name());
            check.init(&self.config, &self.system_info).await;
        }
    }

    /// Run every non real-time check once
    pub async fn run_round(&mut self) -> Vec<CheckOutcome> {
        self.group_id = self.group_id.wrapping_add(1);
        let group_id = self.group_id;

        let mut outcomes = Vec::with_capacity(self.checks.len());
        for check in self.checks.iter().filter(|c| !c.real_time()) {
            let result = check.run(&self.config, group_id).await;
            match &result {
                Ok(messages) => debug!("check {} produced {} messages", check.name(), messages.len()),
                Err(e) => error!("check {} failed: {}", check.name(), e),
            }
            outcomes.push(CheckOutcome {
                name: check.name(),
                result,
            });
        }
        outcomes
    }

    /// Run rounds on the configured interval until Ctrl-C
    pub async fn run_forever(&mut self) {
        let period = Duration::from_secs(self.config.agent.check_interval_secs.max(1));
        let mut ticker = interval(period);

        info!("Running {} checks every {:?}", self.checks.len(), period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_round().await;
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested, stopping checks");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::ElasticCheck;
    use symbion_devkit::{ElasticPayloads, TestHarness};

    fn sys_info() -> SystemInfo {
        SystemInfo {
            hostname: "test-host".to_string(),
            os: "linux".to_string(),
            architecture: "x86_64".to_string(),
            kernel_version: None,
            cpu_count: 1,
            total_memory_kb: 1024,
        }
    }

    #[tokio::test]
    async fn test_round_runs_elastic_check() {
        let harness = TestHarness::start(
            ElasticPayloads::info("i-ABC", "dd-test", "XYZ"),
            ElasticPayloads::cat_master("i-ABC"),
        )
        .await
        .unwrap();

        let mut config = AgentConfig::default();
        config.elasticsearch.url = harness.elastic_url();
        config.elasticsearch.run_delay_ms = 0;

        let mut runner = CheckRunner::new(config, sys_info(), vec![Box::new(ElasticCheck::new())]);
        runner.init().await;

        let outcomes = runner.run_round().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "elastic");
        assert!(outcomes[0].result.as_ref().unwrap().is_empty());
        assert_eq!(runner.group_id, 1);

        runner.run_round().await;
        assert_eq!(runner.group_id, 2);
    }

    #[tokio::test]
    async fn test_round_reports_unconfigured_check() {
        let mut config = AgentConfig::default();
        config.elasticsearch.url = "::bad::".to_string();

        let mut runner = CheckRunner::new(config, sys_info(), crate::checks::all());
        runner.init().await;

        let outcomes = runner.run_round().await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_err());
    }
}
