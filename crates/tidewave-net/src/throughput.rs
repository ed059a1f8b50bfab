//! Simulated network throughput.
//!
//! A sample is recomputed from scratch on every tick: idle jitter, plus a
//! spike while a page loads, plus a share per active download.

use rand::Rng;
use std::ops::Range;
use tidewave_core::types::NetworkSample;

/// Byte-rate ranges for each traffic source.
#[derive(Debug, Clone)]
pub struct ThroughputModel {
    pub idle_down: Range<u64>,
    pub idle_up: Range<u64>,
    pub load_down: Range<u64>,
    pub load_up: Range<u64>,
    pub per_download_down: Range<u64>,
    pub per_download_up: Range<u64>,
}

impl Default for ThroughputModel {
    fn default() -> Self {
        Self {
            idle_down: 0..4_096,
            idle_up: 0..2_048,
            load_down: 250_000..1_500_000,
            load_up: 20_000..120_000,
            per_download_down: 400_000..1_200_000,
            per_download_up: 5_000..15_000,
        }
    }
}

impl ThroughputModel {
    /// Compute one throughput sample.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        loading: bool,
        active_downloads: usize,
        rng: &mut R,
    ) -> NetworkSample {
        let mut down = draw(&self.idle_down, rng);
        let mut up = draw(&self.idle_up, rng);

        if loading {
            down += draw(&self.load_down, rng);
            up += draw(&self.load_up, rng);
        }

        if active_downloads > 0 {
            let count = active_downloads as u64;
            down += draw(&self.per_download_down, rng).saturating_mul(count);
            up += draw(&self.per_download_up, rng).saturating_mul(count);
        }

        NetworkSample {
            down_bytes_per_sec: down,
            up_bytes_per_sec: up,
        }
    }
}

fn draw<R: Rng + ?Sized>(range: &Range<u64>, rng: &mut R) -> u64 {
    if range.is_empty() {
        return range.start;
    }
    rng.gen_range(range.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_idle_sample_is_small() {
        let model = ThroughputModel::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let sample = model.sample(false, 0, &mut rng);
            assert!(sample.down_bytes_per_sec < 4_096);
            assert!(sample.up_bytes_per_sec < 2_048);
        }
    }

    #[test]
    fn test_loading_adds_spike() {
        let model = ThroughputModel::default();
        let mut rng = StdRng::seed_from_u64(12);

        let sample = model.sample(true, 0, &mut rng);
        assert!(sample.down_bytes_per_sec >= 250_000);
        assert!(sample.up_bytes_per_sec >= 20_000);
    }

    #[test]
    fn test_downloads_scale_with_count() {
        let model = ThroughputModel {
            idle_down: 0..0,
            idle_up: 0..0,
            per_download_down: 1_000..1_001,
            per_download_up: 10..11,
            ..ThroughputModel::default()
        };
        let mut rng = StdRng::seed_from_u64(13);

        let one = model.sample(false, 1, &mut rng);
        let three = model.sample(false, 3, &mut rng);
        assert_eq!(one.down_bytes_per_sec, 1_000);
        assert_eq!(three.down_bytes_per_sec, 3_000);
        assert_eq!(three.up_bytes_per_sec, 30);
    }
}
