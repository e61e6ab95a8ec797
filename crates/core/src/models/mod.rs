//! Shared domain models.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tokenized property listed on the mock network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Short identifier (e.g. `prop-001`).
    pub id: String,
    /// Human-readable property name.
    pub name: String,
    /// Asset class label, e.g. `Residential - Luxury`.
    pub kind: String,
    /// Marketing description shown in detail panels.
    pub description: String,
    /// Physical location of the asset.
    pub location: Location,
    /// Appraised value and token pricing.
    pub valuation: Valuation,
    /// Token supply ledger for the asset.
    pub token: TokenInfo,
    /// Yield metadata.
    pub yields: YieldInfo,
    /// Offering restrictions checked before a purchase.
    pub compliance: CompliancePolicy,
    /// World placement consumed by the scene collaborator.
    pub model: ModelPlacement,
}

impl Property {
    /// Returns a user-facing label combining name and token symbol.
    pub fn display_name(&self) -> String {
        format!("{} · {}", self.name, self.token.symbol)
    }

    /// Whether every token of the offering has been sold.
    pub fn sold_out(&self) -> bool {
        self.token.available_tokens == 0
    }
}

/// Physical location of a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// City the asset is located in.
    pub city: String,
    /// District or neighbourhood.
    pub district: String,
    /// Country name.
    pub country: String,
}

impl Location {
    /// `district, city` label used by panels.
    pub fn short_label(&self) -> String {
        format!("{}, {}", self.district, self.city)
    }
}

/// Appraisal and token pricing for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Valuation {
    /// Appraised value of the whole asset.
    pub total_value: u64,
    /// ISO currency code for all monetary fields.
    pub currency: String,
    /// Cost of a single token.
    pub price_per_token: u64,
}

/// Token supply ledger for a property.
///
/// `available_tokens + sold_tokens == total_supply` holds at all times;
/// the ledger service is the only mutator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Ticker-style token symbol.
    pub symbol: String,
    /// Total number of tokens minted for the asset.
    pub total_supply: u64,
    /// Tokens still open for purchase.
    pub available_tokens: u64,
    /// Tokens already sold.
    pub sold_tokens: u64,
    /// Smallest allowed purchase.
    pub min_investment: u64,
    /// Largest allowed position per investor.
    pub max_investment: u64,
}

impl TokenInfo {
    /// Supply bookkeeping invariant, checked by tests.
    pub fn supply_consistent(&self) -> bool {
        self.available_tokens + self.sold_tokens == self.total_supply
    }
}

/// Yield metadata for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldInfo {
    /// Annual yield in percent.
    pub annual_yield: f64,
    /// Gross monthly rental income.
    pub monthly_rent: u64,
    /// Occupancy in percent.
    pub occupancy_rate: f64,
}

/// Offering restrictions evaluated by the compliance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompliancePolicy {
    /// Whether the offering requires a verified KYC status.
    pub kyc_required: bool,
    /// Whether the offering is restricted to accredited investors.
    pub accredited_only: bool,
    /// Jurisdiction codes the offering is open to.
    pub jurisdictions: BTreeSet<String>,
}

/// World placement of a property's 3D stand-in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelPlacement {
    /// Uniform scale of the model.
    pub scale: f64,
    /// World position of the model origin.
    pub position: WorldPosition,
}

/// Position in scene/world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    /// Horizontal axis.
    pub x: f64,
    /// Vertical axis.
    pub y: f64,
    /// Depth axis (negative is away from the viewer).
    pub z: f64,
}

impl WorldPosition {
    /// The same position raised by `dy` units, used to anchor panels
    /// above the entity they describe.
    pub fn raised(&self, dy: f64) -> Self {
        Self {
            x: self.x,
            y: self.y + dy,
            z: self.z,
        }
    }
}

/// The demo investor. Exactly one instance exists per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investor {
    /// Stable investor identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether KYC verification has completed.
    pub kyc_verified: bool,
    /// Accredited-investor flag checked against restricted offerings.
    pub accredited: bool,
    /// Regulatory region code, e.g. `TR`.
    pub jurisdiction: String,
    /// Holdings keyed by property id.
    pub portfolio: BTreeMap<String, Holding>,
}

impl Investor {
    /// Sum of invested amounts across the portfolio.
    pub fn total_invested(&self) -> u64 {
        self.portfolio.values().map(|h| h.invested_amount).sum()
    }
}

/// One portfolio entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Tokens held in the property.
    pub tokens: u64,
    /// Cumulative amount paid for those tokens.
    pub invested_amount: u64,
    /// Timestamp of the first purchase creating this entry.
    pub first_purchase: DateTime<Utc>,
}

/// Receipt for a settled purchase. Transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque transaction identifier.
    pub transaction_id: String,
    /// Property the tokens were bought in.
    pub property_id: String,
    /// Number of tokens purchased.
    pub tokens: u64,
    /// Total amount paid.
    pub total_cost: u64,
    /// Settlement time.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the simulated network state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Network display name.
    pub name: String,
    /// Chain height; monotonically non-decreasing across calls.
    pub block_height: u64,
    /// Time of the snapshot.
    pub last_sync: DateTime<Utc>,
    /// Participant nodes on the mock network.
    pub participants: Vec<String>,
}
