//! Background polling of the simulated network status.

use std::time::Duration;

use anyhow::Result;
use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

use crate::models::NetworkStatus;

use super::LedgerService;

/// Events emitted by the network monitor task.
#[derive(Debug)]
pub enum MonitorEvent {
    /// Fresh status snapshot from the simulated chain.
    Status(NetworkStatus),
}

/// Periodically polls the ledger's network status and forwards it to
/// the frontend over a channel.
pub struct NetworkMonitor {
    ledger: LedgerService,
    poll_interval: Duration,
}

impl NetworkMonitor {
    /// Create a monitor polling every `poll_secs` seconds.
    pub fn new(ledger: LedgerService, poll_secs: u64) -> Self {
        Self {
            ledger,
            poll_interval: Duration::from_secs(poll_secs.max(1)),
        }
    }

    /// Run until the receiving side hangs up.
    pub async fn run(self, sender: mpsc::Sender<MonitorEvent>) -> Result<()> {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let status = self.ledger.network_status().await;
            debug!(block_height = status.block_height, "network status polled");
            if sender.send(MonitorEvent::Status(status)).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatencyProfile;

    #[tokio::test]
    async fn monitor_reports_non_decreasing_heights() {
        let ledger = LedgerService::seeded(LatencyProfile::none());
        let monitor = NetworkMonitor {
            ledger,
            poll_interval: Duration::from_millis(1),
        };
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(monitor.run(tx));

        let mut last = 0;
        for _ in 0..3 {
            let MonitorEvent::Status(status) = rx.recv().await.expect("monitor event");
            assert!(status.block_height >= last);
            last = status.block_height;
        }
        drop(rx);
        handle.await.expect("join").expect("monitor run");
    }
}
