//! Investment flow: compliance check, purchase, settlement.
//!
//! One flow instance guards one UI control. The phase guard is taken
//! synchronously before the first suspension point, so repeated clicks
//! or trigger pulls during simulated chain latency can never start a
//! second purchase on the same control.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::ledger::{LedgerError, LedgerService};
use crate::models::Transaction;

/// Phase of the control guarded by an [`InvestFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// No investment pending; the control accepts input.
    Idle,
    /// Compliance check in progress.
    Checking,
    /// Purchase submitted and awaiting simulated confirmation.
    Purchasing,
}

/// Terminal result of one invest call. Every variant returns the flow
/// to [`FlowPhase::Idle`]; no outcome is fatal.
#[derive(Debug)]
pub enum InvestOutcome {
    /// Purchase settled. The panel should be refreshed from the ledger.
    Settled(Transaction),
    /// Compliance rejected the investor; carries the reason.
    Rejected(String),
    /// The ledger refused the purchase.
    Failed(LedgerError),
    /// The purchase call did not resolve within the configured timeout.
    TimedOut,
    /// Another invest call on this control is still pending.
    Busy,
}

/// Orchestrates compliance → purchase → settlement for one control.
#[derive(Clone)]
pub struct InvestFlow {
    ledger: LedgerService,
    phase: Arc<Mutex<FlowPhase>>,
    purchase_timeout: Duration,
}

impl InvestFlow {
    /// Build a flow over the given ledger with a purchase timeout.
    pub fn new(ledger: LedgerService, purchase_timeout: Duration) -> Self {
        Self {
            ledger,
            phase: Arc::new(Mutex::new(FlowPhase::Idle)),
            purchase_timeout,
        }
    }

    /// Current phase of the guarded control.
    pub fn phase(&self) -> FlowPhase {
        *self.phase.lock()
    }

    /// Run one investment: compliance first, then the purchase, in
    /// strict sequence. Returns [`InvestOutcome::Busy`] without touching
    /// the ledger when a prior call is still pending.
    pub async fn invest(&self, property_id: &str, tokens: u64) -> InvestOutcome {
        {
            // Guard must be set before the first await.
            let mut phase = self.phase.lock();
            if *phase != FlowPhase::Idle {
                warn!(property_id, ?phase, "invest rejected: control busy");
                return InvestOutcome::Busy;
            }
            *phase = FlowPhase::Checking;
        }

        let outcome = self.run(property_id, tokens).await;
        *self.phase.lock() = FlowPhase::Idle;
        outcome
    }

    async fn run(&self, property_id: &str, tokens: u64) -> InvestOutcome {
        let investor = self.ledger.investor_snapshot();
        let verdict = match self.ledger.check_compliance(property_id, &investor.id).await {
            Ok(verdict) => verdict,
            Err(err) => return InvestOutcome::Failed(err),
        };
        if !verdict.eligible {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "not eligible".to_string());
            info!(property_id, %reason, "invest rejected by compliance");
            return InvestOutcome::Rejected(reason);
        }

        *self.phase.lock() = FlowPhase::Purchasing;
        let purchase = self.ledger.purchase_tokens(property_id, tokens);
        match tokio::time::timeout(self.purchase_timeout, purchase).await {
            Ok(Ok(transaction)) => {
                info!(
                    property_id,
                    tokens,
                    transaction_id = %transaction.transaction_id,
                    "investment settled"
                );
                InvestOutcome::Settled(transaction)
            }
            Ok(Err(err)) => InvestOutcome::Failed(err),
            Err(_) => {
                warn!(property_id, "purchase did not confirm before timeout");
                InvestOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatencyProfile;
    use crate::ledger::seed;

    fn flow_with_latency(purchase_ms: u64, timeout: Duration) -> InvestFlow {
        let latency = LatencyProfile {
            purchase_ms,
            ..LatencyProfile::none()
        };
        InvestFlow::new(LedgerService::seeded(latency), timeout)
    }

    fn flow() -> InvestFlow {
        flow_with_latency(0, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn settles_and_updates_counts() {
        let flow = flow();
        let outcome = flow.invest("prop-001", 5).await;
        let transaction = match outcome {
            InvestOutcome::Settled(tx) => tx,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(transaction.tokens, 5);
        assert_eq!(transaction.total_cost, 5_000);
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn compliance_rejection_issues_no_mutation() {
        let mut investor = seed::investor();
        investor.accredited = false;
        let ledger = LedgerService::new(seed::properties(), investor, LatencyProfile::none());
        let flow = InvestFlow::new(ledger.clone(), Duration::from_secs(5));

        // prop-001 is accredited-only.
        let outcome = flow.invest("prop-001", 5).await;
        match outcome {
            InvestOutcome::Rejected(reason) => {
                assert_eq!(reason, crate::compliance::REASON_ACCREDITED);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let property = ledger.snapshot("prop-001").expect("seeded property");
        assert_eq!(property.token.available_tokens, 2_240);
        assert_eq!(property.token.sold_tokens, 960);
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn insufficient_supply_surfaces_and_recovers() {
        let flow = flow();
        let outcome = flow.invest("prop-002", 10_000).await;
        assert!(matches!(
            outcome,
            InvestOutcome::Failed(LedgerError::InsufficientSupply { .. })
        ));
        assert_eq!(flow.phase(), FlowPhase::Idle);

        // The control is retryable after the failure.
        assert!(matches!(
            flow.invest("prop-002", 1).await,
            InvestOutcome::Settled(_)
        ));
    }

    #[tokio::test]
    async fn reentry_is_rejected_while_pending() {
        let flow = flow_with_latency(200, Duration::from_secs(5));
        let ledger = flow.ledger.clone();

        let first = {
            let flow = flow.clone();
            tokio::spawn(async move { flow.invest("prop-001", 5).await })
        };
        // Let the first call take the guard and park in the latency sleep.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = flow.invest("prop-001", 5).await;
        assert!(matches!(second, InvestOutcome::Busy));

        let first = first.await.expect("join");
        assert!(matches!(first, InvestOutcome::Settled(_)));

        // Exactly one mutation went through.
        let property = ledger.snapshot("prop-001").expect("seeded property");
        assert_eq!(property.token.available_tokens, 2_235);
        assert_eq!(property.token.sold_tokens, 965);
    }

    #[tokio::test]
    async fn timeout_unlocks_the_control() {
        let flow = flow_with_latency(10_000, Duration::from_millis(50));
        let outcome = flow.invest("prop-001", 1).await;
        assert!(matches!(outcome, InvestOutcome::TimedOut));
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }
}
