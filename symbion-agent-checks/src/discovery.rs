//! System identification for Symbion agents
//!
//! Collects the host descriptor handed to every check at init:
//! hostname, OS, architecture, kernel version, CPU count and total memory.

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

/// System information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub architecture: String,
    pub kernel_version: Option<String>,
    pub cpu_count: usize,
    pub total_memory_kb: u64,
}

impl SystemInfo {
    /// Discover system information
    pub fn discover() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let hostname = gethostname::gethostname().to_string_lossy().to_string();

        let info = SystemInfo {
            hostname,
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            kernel_version: System::kernel_version(),
            cpu_count: sys.cpus().len(),
            total_memory_kb: sys.total_memory() / 1024,
        };

        info!(
            "Discovery complete - Hostname: {}, OS: {}, CPUs: {}",
            info.hostname, info.os, info.cpu_count
        );

        info
    }
}
