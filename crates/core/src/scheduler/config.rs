//! Configuration for the scheduler module.

use std::time::Duration;

/// Configuration for the job scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Number of encoder processes allowed to run at once.
    pub pool_size: usize,

    /// Delay between sweeps over the pool, in milliseconds.
    pub poll_interval_ms: u64,
}

fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl SchedulerConfig {
    /// Creates a config with the given pool size.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }

    /// Sets the poll interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert!(config.pool_size >= 1);
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_config_builder() {
        let config = SchedulerConfig::with_pool_size(3).with_poll_interval_ms(5);
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.poll_interval_ms, 5);
    }
}
