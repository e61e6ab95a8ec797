//! Seeded demo catalog for the mock ledger.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::models::{
    CompliancePolicy, Holding, Investor, Location, ModelPlacement, Property, TokenInfo, Valuation,
    WorldPosition, YieldInfo,
};

/// Display name of the simulated network.
pub const NETWORK_NAME: &str = "Atlas Settlement Network";

/// Chain height the simulation starts from.
pub const INITIAL_BLOCK_HEIGHT: u64 = 1_847_293;

/// Participant nodes shown in the network status.
pub fn participants() -> Vec<String> {
    [
        "Manhattan RE Trust",
        "Global Investors DAO",
        "Compliance Node US",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

static CATALOG: Lazy<Vec<Property>> = Lazy::new(|| {
    vec![
        Property {
            id: "prop-001".to_string(),
            name: "Central Park Penthouse".to_string(),
            kind: "Residential - Luxury".to_string(),
            description: "Luxury penthouse with Central Park views. 4 bedrooms, \
                          3,200 sq ft, full amenities."
                .to_string(),
            location: Location {
                city: "New York".to_string(),
                district: "Upper West Side".to_string(),
                country: "United States".to_string(),
            },
            valuation: Valuation {
                total_value: 3_200_000,
                currency: "USD".to_string(),
                price_per_token: 1_000,
            },
            token: TokenInfo {
                symbol: "CPPH".to_string(),
                total_supply: 3_200,
                available_tokens: 2_240,
                sold_tokens: 960,
                min_investment: 1,
                max_investment: 320,
            },
            yields: YieldInfo {
                annual_yield: 8.5,
                monthly_rent: 22_667,
                occupancy_rate: 100.0,
            },
            compliance: CompliancePolicy {
                kyc_required: true,
                accredited_only: true,
                jurisdictions: jurisdictions(&["US", "EU", "UK", "TR"]),
            },
            model: ModelPlacement {
                scale: 0.3,
                position: WorldPosition {
                    x: -1.5,
                    y: 0.5,
                    z: -2.0,
                },
            },
        },
        Property {
            id: "prop-002".to_string(),
            name: "Hudson Yards Tower".to_string(),
            kind: "Residential - Apartment".to_string(),
            description: "Modern luxury apartment in Hudson Yards. 2 bed, \
                          1,850 sq ft, amenities included."
                .to_string(),
            location: Location {
                city: "New York".to_string(),
                district: "Hudson Yards".to_string(),
                country: "United States".to_string(),
            },
            valuation: Valuation {
                total_value: 1_200_000,
                currency: "USD".to_string(),
                price_per_token: 500,
            },
            token: TokenInfo {
                symbol: "HYRD".to_string(),
                total_supply: 2_400,
                available_tokens: 1_200,
                sold_tokens: 1_200,
                min_investment: 1,
                max_investment: 240,
            },
            yields: YieldInfo {
                annual_yield: 6.8,
                monthly_rent: 6_800,
                occupancy_rate: 100.0,
            },
            compliance: CompliancePolicy {
                kyc_required: true,
                accredited_only: false,
                jurisdictions: jurisdictions(&["US", "EU", "TR"]),
            },
            model: ModelPlacement {
                scale: 0.3,
                position: WorldPosition {
                    x: 0.0,
                    y: 0.5,
                    z: -2.5,
                },
            },
        },
        Property {
            id: "prop-003".to_string(),
            name: "Wall Street Plaza".to_string(),
            kind: "Commercial - Office".to_string(),
            description: "Class A office building in the Financial District. \
                          35,000 sq ft, fully leased."
                .to_string(),
            location: Location {
                city: "New York".to_string(),
                district: "Financial District".to_string(),
                country: "United States".to_string(),
            },
            valuation: Valuation {
                total_value: 6_500_000,
                currency: "USD".to_string(),
                price_per_token: 2_000,
            },
            token: TokenInfo {
                symbol: "WSPL".to_string(),
                total_supply: 3_250,
                available_tokens: 1_300,
                sold_tokens: 1_950,
                min_investment: 1,
                max_investment: 325,
            },
            yields: YieldInfo {
                annual_yield: 9.3,
                monthly_rent: 50_375,
                occupancy_rate: 100.0,
            },
            compliance: CompliancePolicy {
                kyc_required: true,
                accredited_only: true,
                jurisdictions: jurisdictions(&["US", "EU", "UK", "SG", "TR"]),
            },
            model: ModelPlacement {
                scale: 0.3,
                position: WorldPosition {
                    x: 1.5,
                    y: 0.5,
                    z: -2.0,
                },
            },
        },
    ]
});

/// Snapshot of the seeded property catalog.
pub fn properties() -> Vec<Property> {
    CATALOG.clone()
}

/// The seeded demo investor, with two existing holdings.
pub fn investor() -> Investor {
    let mut portfolio = BTreeMap::new();
    portfolio.insert(
        "prop-001".to_string(),
        Holding {
            tokens: 10,
            invested_amount: 10_000,
            first_purchase: seed_date("2024-06-15"),
        },
    );
    portfolio.insert(
        "prop-003".to_string(),
        Holding {
            tokens: 5,
            invested_amount: 10_000,
            first_purchase: seed_date("2024-08-20"),
        },
    );

    Investor {
        id: "investor-001".to_string(),
        name: "Demo Investor".to_string(),
        kyc_verified: true,
        accredited: true,
        jurisdiction: "TR".to_string(),
        portfolio,
    }
}

fn jurisdictions(codes: &[&str]) -> BTreeSet<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

fn seed_date(date: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&format!("{date}T00:00:00Z"))
        .expect("valid seed date")
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_supply_is_consistent() {
        for property in properties() {
            assert!(
                property.token.supply_consistent(),
                "inconsistent supply for {}",
                property.id
            );
        }
    }

    #[test]
    fn investor_portfolio_references_catalog() {
        let catalog = properties();
        for id in investor().portfolio.keys() {
            assert!(catalog.iter().any(|p| &p.id == id), "unknown holding {id}");
        }
    }
}
