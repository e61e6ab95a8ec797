//! In-memory mock ledger and its background monitor.

/// Seeded demo catalog and network constants.
pub mod seed;

mod monitor;
mod service;

pub use monitor::{MonitorEvent, NetworkMonitor};
pub use service::{LedgerError, LedgerService};
