//! Symbion Agent Checks - periodic checks embedded in the Symbion agent
//!
//! This crate provides:
//! - SNMP value helpers (numeric coercion of heterogeneous poll results)
//! - An Elasticsearch cluster status check (identity + leader detection)
//! - A small runner that initializes the checks once and runs them periodically

pub mod checks;
pub mod config;
pub mod discovery;
pub mod elastic;
pub mod error;
pub mod runner;
pub mod snmp;

pub use checks::{Check, MessageBody};
pub use config::AgentConfig;
pub use discovery::SystemInfo;
pub use error::{CheckError, ClientError, ConfigError};
