//! Runtime-configurable parameters for a process group.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `RINGWEAVE_`) or by constructing a custom `GroupConfig`.

use crate::error::{Result, RingweaveError};
use std::time::Duration;

/// Tuning parameters for collectives and transports.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Timeout for individual send/recv operations within collectives.
    /// `None` blocks until the peer answers or disconnects.
    pub collective_timeout: Option<Duration>,

    /// Timeout for each barrier round. `None` blocks indefinitely.
    pub barrier_timeout: Option<Duration>,

    /// Largest vector length a rank accepts for a collective. A rank whose
    /// local vector exceeds this fails the length agreement for the group.
    pub max_vector_len: usize,

    /// Capacity of every per-peer channel (inbound frames and per-tag lanes).
    pub lane_capacity: usize,

    /// How long TCP mesh formation keeps retrying connects to lower ranks.
    pub connect_timeout: Duration,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            collective_timeout: None,
            barrier_timeout: None,
            max_vector_len: 64 * 1024 * 1024,
            lane_capacity: 256,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl GroupConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `RINGWEAVE_COLLECTIVE_TIMEOUT_MS`
    /// - `RINGWEAVE_BARRIER_TIMEOUT_MS`
    /// - `RINGWEAVE_MAX_VECTOR_LEN`
    /// - `RINGWEAVE_LANE_CAPACITY`
    /// - `RINGWEAVE_CONNECT_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values are ignored.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("RINGWEAVE_COLLECTIVE_TIMEOUT_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            cfg.collective_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(v) = lookup("RINGWEAVE_BARRIER_TIMEOUT_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            cfg.barrier_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(v) = lookup("RINGWEAVE_MAX_VECTOR_LEN")
            && let Ok(n) = v.parse::<usize>()
        {
            cfg.max_vector_len = n;
        }
        if let Some(v) = lookup("RINGWEAVE_LANE_CAPACITY")
            && let Ok(n) = v.parse::<usize>()
            && n > 0
        {
            cfg.lane_capacity = n;
        }
        if let Some(v) = lookup("RINGWEAVE_CONNECT_TIMEOUT_MS")
            && let Ok(ms) = v.parse::<u64>()
        {
            cfg.connect_timeout = Duration::from_millis(ms);
        }

        cfg
    }

    /// Reject values no group can run with.
    pub fn validate(&self) -> Result<()> {
        if self.lane_capacity == 0 {
            return Err(RingweaveError::transport("lane_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Builder-style override of the collective timeout.
    pub fn with_collective_timeout(mut self, timeout: Duration) -> Self {
        self.collective_timeout = Some(timeout);
        self
    }

    /// Builder-style override of the barrier timeout.
    pub fn with_barrier_timeout(mut self, timeout: Duration) -> Self {
        self.barrier_timeout = Some(timeout);
        self
    }

    /// Builder-style override of the maximum vector length.
    pub fn with_max_vector_len(mut self, len: usize) -> Self {
        self.max_vector_len = len;
        self
    }
}
