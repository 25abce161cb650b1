//! Configuration for the dispatcher.

use serde::{Deserialize, Serialize};

/// What to do when the directory walk hits an unreadable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    /// Log it, list it in the report, keep going.
    #[default]
    Skip,
    /// Stop submitting, finish in-flight work, fail the run.
    Abort,
}

/// Configuration for the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Maximum conversions running at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Handling of traversal errors.
    #[serde(default)]
    pub on_discovery_error: DiscoveryPolicy,
}

fn default_workers() -> usize {
    4
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            on_discovery_error: DiscoveryPolicy::default(),
        }
    }
}

impl DispatcherConfig {
    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the discovery error policy.
    pub fn with_discovery_policy(mut self, policy: DiscoveryPolicy) -> Self {
        self.on_discovery_error = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.on_discovery_error, DiscoveryPolicy::Skip);
    }

    #[test]
    fn test_config_builder() {
        let config = DispatcherConfig::default()
            .with_workers(1)
            .with_discovery_policy(DiscoveryPolicy::Abort);
        assert_eq!(config.workers, 1);
        assert_eq!(config.on_discovery_error, DiscoveryPolicy::Abort);
    }
}
