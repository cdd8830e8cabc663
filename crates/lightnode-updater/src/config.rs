//! Updater tuning knobs.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Tick period of the sampling loop.
    pub poll_rate: Duration,
    /// Deadline for one tick's `queryPeers` fan-out.
    pub timeout: Duration,
    /// Sub-deadline for a single `queryStats` probe when resolving a split
    /// identity.
    pub probe_timeout: Duration,
    /// Peers sampled per tick.
    pub sample_size: usize,
    /// Bootstrap peers additionally sampled per tick, on top of
    /// `sample_size`, so the bootstrap set keeps getting re-contacted even
    /// once the dynamic set grows past what a single sample would cover.
    pub bootstrap_sample_size: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            poll_rate: Duration::from_secs(10),
            timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(1),
            sample_size: 50,
            bootstrap_sample_size: 5,
        }
    }
}
