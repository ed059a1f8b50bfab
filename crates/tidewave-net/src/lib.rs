//! Simulated download progress and network throughput for Tidewave.
//!
//! Nothing here touches the network. Both simulators take their randomness
//! from the caller so hosts can seed them and tests can pin outcomes.

pub mod download;
pub mod throughput;

pub use download::{DownloadEvent, DownloadSimulator};
pub use throughput::ThroughputModel;
