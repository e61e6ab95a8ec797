//! Investor eligibility rules.

use serde::{Deserialize, Serialize};

use crate::models::{Investor, Property};

/// Reason reported when an offering is restricted to accredited investors.
pub const REASON_ACCREDITED: &str = "Accredited investor status required";
/// Reason reported when the investor's jurisdiction is not allowed.
pub const REASON_JURISDICTION: &str = "Investment not available in your jurisdiction";

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the investor may purchase tokens in the offering.
    pub eligible: bool,
    /// Human-readable reason when ineligible.
    pub reason: Option<String>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    fn fail(reason: &str) -> Self {
        Self {
            eligible: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Evaluate the offering's restrictions against the investor.
///
/// Pure and deterministic. Rules run in order and the first failing
/// rule wins: accreditation before jurisdiction.
pub fn check_eligibility(property: &Property, investor: &Investor) -> Verdict {
    if property.compliance.accredited_only && !investor.accredited {
        return Verdict::fail(REASON_ACCREDITED);
    }
    if !property
        .compliance
        .jurisdictions
        .contains(&investor.jurisdiction)
    {
        return Verdict::fail(REASON_JURISDICTION);
    }
    Verdict::pass()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::seed;

    fn investor(accredited: bool, jurisdiction: &str) -> Investor {
        let mut investor = seed::investor();
        investor.accredited = accredited;
        investor.jurisdiction = jurisdiction.to_string();
        investor
    }

    #[test]
    fn accredited_investor_in_allowed_jurisdiction_is_eligible() {
        let properties = seed::properties();
        let restricted = &properties[0];
        assert!(restricted.compliance.accredited_only);

        let verdict = check_eligibility(restricted, &investor(true, "TR"));
        assert!(verdict.eligible);
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn accreditation_rule_short_circuits_jurisdiction_rule() {
        let properties = seed::properties();
        let restricted = &properties[0];

        // Fails both rules; the accreditation reason must win.
        let verdict = check_eligibility(restricted, &investor(false, "XX"));
        assert!(!verdict.eligible);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_ACCREDITED));
    }

    #[test]
    fn jurisdiction_rule_applies_to_open_offerings() {
        let properties = seed::properties();
        let open = &properties[1];
        assert!(!open.compliance.accredited_only);

        let verdict = check_eligibility(open, &investor(false, "XX"));
        assert!(!verdict.eligible);
        assert_eq!(verdict.reason.as_deref(), Some(REASON_JURISDICTION));
    }

    #[test]
    fn verdict_is_deterministic() {
        let properties = seed::properties();
        let investor = investor(false, "TR");
        let first = check_eligibility(&properties[0], &investor);
        for _ in 0..10 {
            assert_eq!(check_eligibility(&properties[0], &investor), first);
        }
    }
}
