//! Simulated downloads with progress tracking.
//!
//! Entries move Downloading -> Completed (or Error, which the simulation
//! never picks on its own). Progress is clamped at 100 and the status flips
//! in the same tick that reaches it.

use rand::Rng;
use tidewave_core::types::{now_millis, DownloadItem, DownloadKind, DownloadStatus};
use tidewave_core::{Config, TidewaveError, TidewaveResult};
use tracing::{debug, info, trace};

/// Download event emitted by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Download started.
    Started { id: u64, filename: String },
    /// Progress update.
    Progress { id: u64, progress: u8 },
    /// Download completed.
    Completed { id: u64 },
    /// Download failed.
    Failed { id: u64 },
}

/// Download simulator.
#[derive(Debug, Clone)]
pub struct DownloadSimulator {
    /// Most recent first.
    items: Vec<DownloadItem>,
    step_min: u32,
    step_max: u32,
}

impl DownloadSimulator {
    /// Create an empty simulator.
    pub fn new(config: &Config) -> Self {
        Self::from_items(Vec::new(), config)
    }

    /// Resume from persisted entries.
    pub fn from_items(items: Vec<DownloadItem>, config: &Config) -> Self {
        let step_min = config.download_step_min.max(1);
        let step_max = config.download_step_max.max(step_min);
        Self {
            items,
            step_min,
            step_max,
        }
    }

    fn next_id(&self) -> u64 {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }

    /// Start a download. The new entry is placed first.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        filename: impl Into<String>,
        kind: DownloadKind,
        rng: &mut R,
    ) -> (&DownloadItem, DownloadEvent) {
        let id = self.next_id();
        let filename = filename.into();

        info!(id, filename = %filename, ?kind, "Starting download");

        let item = DownloadItem {
            id,
            filename: filename.clone(),
            progress: 0,
            status: DownloadStatus::Downloading,
            size: display_size(kind, rng),
            kind,
            started_at: now_millis(),
        };
        self.items.insert(0, item);

        (&self.items[0], DownloadEvent::Started { id, filename })
    }

    /// Advance every active download by a random step.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<DownloadEvent> {
        let mut events = Vec::new();

        for item in self.items.iter_mut().filter(|item| item.is_active()) {
            let step = rng.gen_range(self.step_min..=self.step_max);
            let next = u32::from(item.progress) + step;

            if next >= 100 {
                item.progress = 100;
                item.status = DownloadStatus::Completed;
                info!(id = item.id, filename = %item.filename, "Download completed");
                events.push(DownloadEvent::Completed { id: item.id });
            } else {
                // next < 100 here, so the narrowing is lossless
                item.progress = next as u8;
                trace!(id = item.id, progress = item.progress, "Download progress");
                events.push(DownloadEvent::Progress {
                    id: item.id,
                    progress: item.progress,
                });
            }
        }

        events
    }

    /// Mark an active download as failed.
    pub fn fail(&mut self, id: u64) -> TidewaveResult<DownloadEvent> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| TidewaveError::not_found(format!("download {}", id)))?;

        if !item.is_active() {
            return Err(TidewaveError::invalid_state(format!(
                "download {} already finished",
                id
            )));
        }

        item.status = DownloadStatus::Error;
        debug!(id, "Download marked as failed");
        Ok(DownloadEvent::Failed { id })
    }

    /// Remove a download from the list.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Remove completed/failed downloads.
    pub fn clear_finished(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.is_active());
        before - self.items.len()
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_active()).count()
    }

    pub fn get(&self, id: u64) -> Option<&DownloadItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// List all downloads, most recent first.
    pub fn items(&self) -> &[DownloadItem] {
        &self.items
    }
}

fn display_size<R: Rng + ?Sized>(kind: DownloadKind, rng: &mut R) -> String {
    let megabytes = match kind {
        DownloadKind::Video => rng.gen_range(50.0..900.0),
        DownloadKind::File => rng.gen_range(0.5..120.0),
    };
    format!("{:.1} MB", megabytes)
}
