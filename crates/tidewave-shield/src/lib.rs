//! Simulated ad blocking for Tidewave
//!
//! Nothing is actually filtered. The blocker keeps the counters the
//! dashboard displays and bumps them at random while a page is loading.

use rand::Rng;
use tidewave_core::types::AdBlockStats;
use tidewave_core::Config;

/// Simulated ad blocker
#[derive(Debug, Clone)]
pub struct AdBlocker {
    stats: AdBlockStats,
    block_probability: f64,
    strict_block_probability: f64,
}

impl AdBlocker {
    /// Creates a blocker with default probabilities and fresh counters
    pub fn new() -> Self {
        Self::from_stats(AdBlockStats::default(), &Config::default())
    }

    /// Creates a blocker around previously persisted counters
    pub fn from_stats(stats: AdBlockStats, config: &Config) -> Self {
        log::info!(
            "Initializing ad blocker (enabled: {}, strict: {}, total blocked: {})",
            stats.enabled,
            stats.strict_mode,
            stats.total_blocked
        );

        Self {
            stats,
            block_probability: config.block_probability,
            strict_block_probability: config.strict_block_probability,
        }
    }

    /// One simulation step. Returns true when a block was counted.
    ///
    /// Blocks only happen while enabled and while a page is loading.
    pub fn tick<R: Rng + ?Sized>(&mut self, loading: bool, rng: &mut R) -> bool {
        if !self.stats.enabled || !loading {
            return false;
        }

        if rng.gen_bool(self.current_probability()) {
            self.increment_block_count();
            log::debug!(
                "Simulated block (session: {}, total: {})",
                self.stats.session_blocked,
                self.stats.total_blocked
            );
            true
        } else {
            false
        }
    }

    fn current_probability(&self) -> f64 {
        let p = if self.stats.strict_mode {
            self.strict_block_probability
        } else {
            self.block_probability
        };
        p.clamp(0.0, 1.0)
    }

    /// Count one blocked request in both counters
    pub fn increment_block_count(&mut self) {
        self.stats.total_blocked = self.stats.total_blocked.saturating_add(1);
        self.stats.session_blocked = self.stats.session_blocked.saturating_add(1);
    }

    /// Start a fresh per-page counter; the lifetime total is kept
    pub fn reset_session(&mut self) {
        self.stats.session_blocked = 0;
    }

    /// Enable or disable ad blocking
    pub fn set_enabled(&mut self, enabled: bool) {
        self.stats.enabled = enabled;
        log::info!(
            "Ad blocking {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.stats.strict_mode = strict;
        log::info!("Strict blocking {}", if strict { "on" } else { "off" });
    }

    /// Check if ad blocking is enabled
    pub fn is_enabled(&self) -> bool {
        self.stats.enabled
    }

    pub fn stats(&self) -> &AdBlockStats {
        &self.stats
    }
}

impl Default for AdBlocker {
    fn default() -> Self {
        Self::new()
    }
}
