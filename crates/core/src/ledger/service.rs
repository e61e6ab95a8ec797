//! In-memory mock of the tokenized-asset backend.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    compliance::{self, Verdict},
    config::LatencyProfile,
    models::{Holding, Investor, NetworkStatus, Property, Transaction},
    selection::PropertyStore,
};

use super::seed;

/// Errors surfaced by the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The property id is unknown.
    #[error("property not found: {0}")]
    NotFound(String),
    /// More tokens were requested than are available.
    #[error("insufficient tokens available: requested {requested}, available {available}")]
    InsufficientSupply {
        /// Tokens asked for.
        requested: u64,
        /// Tokens still open for purchase.
        available: u64,
    },
}

struct Book {
    properties: Vec<Property>,
    investor: Investor,
    block_height: u64,
}

/// Cheaply cloneable handle to the shared in-memory ledger.
///
/// All async calls simulate network latency before touching the book.
/// The purchase path performs its balance check and mutation under one
/// lock with no suspension point in between, so interleaved calls can
/// never drive the available supply negative.
#[derive(Clone)]
pub struct LedgerService {
    book: Arc<Mutex<Book>>,
    latency: LatencyProfile,
}

impl LedgerService {
    /// Build a ledger over an explicit catalog and investor.
    pub fn new(properties: Vec<Property>, investor: Investor, latency: LatencyProfile) -> Self {
        Self {
            book: Arc::new(Mutex::new(Book {
                properties,
                investor,
                block_height: seed::INITIAL_BLOCK_HEIGHT,
            })),
            latency,
        }
    }

    /// Build a ledger over the seeded demo catalog.
    pub fn seeded(latency: LatencyProfile) -> Self {
        Self::new(seed::properties(), seed::investor(), latency)
    }

    /// Snapshot of all listed properties.
    pub async fn list_properties(&self) -> Vec<Property> {
        self.delay(self.latency.list_ms).await;
        self.book.lock().properties.clone()
    }

    /// Point lookup by property id.
    pub async fn property(&self, id: &str) -> Option<Property> {
        self.delay(self.latency.lookup_ms).await;
        self.snapshot(id)
    }

    /// The demo investor, including the current portfolio.
    pub async fn current_user(&self) -> Investor {
        self.delay(self.latency.lookup_ms).await;
        self.book.lock().investor.clone()
    }

    /// Current network status. The block height advances by a small
    /// jitter on every call and never decreases.
    pub async fn network_status(&self) -> NetworkStatus {
        self.delay(self.latency.status_ms).await;
        let advance = rand::thread_rng().gen_range(0..10);
        let mut book = self.book.lock();
        book.block_height += advance;
        NetworkStatus {
            name: seed::NETWORK_NAME.to_string(),
            block_height: book.block_height,
            last_sync: Utc::now(),
            participants: seed::participants(),
        }
    }

    /// Purchase `tokens` in the given property, updating the supply
    /// counters and the investor portfolio atomically.
    pub async fn purchase_tokens(
        &self,
        property_id: &str,
        tokens: u64,
    ) -> Result<Transaction, LedgerError> {
        self.delay(self.latency.purchase_ms).await;

        let book = &mut *self.book.lock();
        let property = book
            .properties
            .iter_mut()
            .find(|p| p.id == property_id)
            .ok_or_else(|| LedgerError::NotFound(property_id.to_string()))?;
        if tokens > property.token.available_tokens {
            return Err(LedgerError::InsufficientSupply {
                requested: tokens,
                available: property.token.available_tokens,
            });
        }

        property.token.available_tokens -= tokens;
        property.token.sold_tokens += tokens;
        let total_cost = tokens * property.valuation.price_per_token;

        let timestamp = Utc::now();
        let entry = book
            .investor
            .portfolio
            .entry(property_id.to_string())
            .or_insert_with(|| Holding {
                tokens: 0,
                invested_amount: 0,
                first_purchase: timestamp,
            });
        entry.tokens += tokens;
        entry.invested_amount += total_cost;

        let transaction = Transaction {
            transaction_id: format!("tx-{:x}", timestamp.timestamp_millis()),
            property_id: property_id.to_string(),
            tokens,
            total_cost,
            timestamp,
        };
        info!(
            property_id,
            tokens, total_cost, "purchase settled"
        );
        Ok(transaction)
    }

    /// Check whether the given investor may invest in the property.
    ///
    /// The demo runs with a single seeded investor; the id is carried
    /// for contract fidelity and tracing only.
    pub async fn check_compliance(
        &self,
        property_id: &str,
        investor_id: &str,
    ) -> Result<Verdict, LedgerError> {
        self.delay(self.latency.lookup_ms).await;
        debug!(property_id, investor_id, "compliance check");
        let book = self.book.lock();
        let property = book
            .properties
            .iter()
            .find(|p| p.id == property_id)
            .ok_or_else(|| LedgerError::NotFound(property_id.to_string()))?;
        Ok(compliance::check_eligibility(property, &book.investor))
    }

    /// Synchronous property snapshot backing panel renders. Never
    /// suspends; safe to call from the selection coordinator.
    pub fn snapshot(&self, id: &str) -> Option<Property> {
        self.book
            .lock()
            .properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Synchronous snapshot of the whole catalog.
    pub fn snapshot_all(&self) -> Vec<Property> {
        self.book.lock().properties.clone()
    }

    /// Synchronous snapshot of the investor.
    pub fn investor_snapshot(&self) -> Investor {
        self.book.lock().investor.clone()
    }

    async fn delay(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl PropertyStore for LedgerService {
    fn property_snapshot(&self, id: &str) -> Option<Property> {
        self.snapshot(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> LedgerService {
        LedgerService::seeded(LatencyProfile::none())
    }

    #[tokio::test]
    async fn purchase_updates_supply_and_portfolio() -> Result<(), LedgerError> {
        let ledger = ledger();
        let before = ledger.snapshot("prop-001").expect("seeded property");
        assert_eq!(before.token.available_tokens, 2_240);
        assert_eq!(before.token.sold_tokens, 960);
        assert_eq!(before.token.total_supply, 3_200);

        let held_before = ledger
            .investor_snapshot()
            .portfolio
            .get("prop-001")
            .map(|h| h.tokens)
            .unwrap_or(0);

        let tx = ledger.purchase_tokens("prop-001", 5).await?;
        assert_eq!(tx.tokens, 5);
        assert_eq!(tx.total_cost, 5 * before.valuation.price_per_token);

        let after = ledger.snapshot("prop-001").expect("seeded property");
        assert_eq!(after.token.available_tokens, 2_235);
        assert_eq!(after.token.sold_tokens, 965);
        assert!(after.token.supply_consistent());

        let holding = ledger.investor_snapshot().portfolio["prop-001"].clone();
        assert_eq!(holding.tokens, held_before + 5);
        Ok(())
    }

    #[tokio::test]
    async fn supply_invariant_survives_purchase_sequences() {
        let ledger = ledger();
        for tokens in [1, 7, 42, 100] {
            ledger
                .purchase_tokens("prop-002", tokens)
                .await
                .expect("purchase within supply");
        }
        for property in ledger.snapshot_all() {
            assert!(property.token.supply_consistent());
        }
    }

    #[tokio::test]
    async fn oversized_purchase_fails_and_leaves_counts_unchanged() {
        let ledger = ledger();
        let before = ledger.snapshot("prop-002").expect("seeded property");
        assert_eq!(before.token.available_tokens, 1_200);

        let err = ledger
            .purchase_tokens("prop-002", 10_000)
            .await
            .expect_err("purchase beyond supply");
        match err {
            LedgerError::InsufficientSupply {
                requested,
                available,
            } => {
                assert_eq!(requested, 10_000);
                assert_eq!(available, 1_200);
            }
            other => panic!("unexpected error: {other}"),
        }

        let after = ledger.snapshot("prop-002").expect("seeded property");
        assert_eq!(after.token.available_tokens, 1_200);
        assert_eq!(after.token.sold_tokens, before.token.sold_tokens);
    }

    #[tokio::test]
    async fn unknown_property_is_not_found() {
        let ledger = ledger();
        assert!(matches!(
            ledger.purchase_tokens("prop-999", 1).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(ledger.property("prop-999").await.is_none());
    }

    #[tokio::test]
    async fn purchase_creates_missing_portfolio_entry() -> Result<(), LedgerError> {
        let ledger = ledger();
        assert!(!ledger
            .investor_snapshot()
            .portfolio
            .contains_key("prop-002"));

        ledger.purchase_tokens("prop-002", 3).await?;

        let holding = ledger.investor_snapshot().portfolio["prop-002"].clone();
        assert_eq!(holding.tokens, 3);
        assert_eq!(holding.invested_amount, 3 * 500);
        Ok(())
    }

    #[tokio::test]
    async fn block_height_never_decreases() {
        let ledger = ledger();
        let mut last = 0;
        for _ in 0..20 {
            let status = ledger.network_status().await;
            assert!(status.block_height >= last);
            last = status.block_height;
        }
    }
}
