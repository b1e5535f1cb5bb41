use crate::core::money::{format_usd, sanitize_amount, DealAmounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status line shown on each step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statuses {
    pub contract: String,
    pub payment: String,
    pub transfer: String,
    pub receipt: String,
}

/// The deal data displayed across the walkthrough.
///
/// Monetary fields hold display strings (`"$12,750,000"`). The record is
/// always replaced as a whole; see [`crate::scenario::ScenarioStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub transaction_id: u32,
    pub receipt_id: u32,

    // Parties
    pub buyer: String,
    pub seller: String,
    pub company: String,
    pub asset: String,

    // Financials
    pub deal_amount: String,
    pub platform_fee: String,
    pub disbursement_fee: String,
    pub total_amount: String,

    // Dates
    pub payment_date: String,
    pub transfer_date: String,
    pub completion_date: String,
    pub effective_date: String,

    // Contract details
    pub agreement_type: String,
    pub jurisdiction: String,
    pub asset_type: String,
    pub delivery_medium: String,

    pub statuses: Statuses,
}

impl ScenarioRecord {
    /// Numeric value of the displayed deal amount
    pub fn deal_value(&self) -> Decimal {
        sanitize_amount(&self.deal_amount)
    }

    /// Write a deal amount and its derived charges into the record
    pub fn apply_amounts(&mut self, amounts: &DealAmounts) {
        self.deal_amount = format_usd(amounts.deal);
        self.platform_fee = format_usd(amounts.platform_fee);
        self.disbursement_fee = format_usd(amounts.disbursement_fee);
        self.total_amount = format_usd(amounts.total);
    }

    /// Check that fees and total match the deal amount
    pub fn has_consistent_totals(&self) -> bool {
        let amounts = DealAmounts::from_deal(self.deal_value());
        self.platform_fee == format_usd(amounts.platform_fee)
            && self.disbursement_fee == format_usd(amounts.disbursement_fee)
            && self.total_amount == format_usd(amounts.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(deal: &str) -> ScenarioRecord {
        ScenarioRecord {
            transaction_id: 100_000,
            receipt_id: 999_999,
            buyer: "Buyer".into(),
            seller: "Seller".into(),
            company: "Company".into(),
            asset: "Asset".into(),
            deal_amount: deal.into(),
            platform_fee: "$0".into(),
            disbursement_fee: "$0".into(),
            total_amount: "$0".into(),
            payment_date: "Nov 6, 2025".into(),
            transfer_date: "Nov 7, 2025".into(),
            completion_date: "Nov 8, 2025".into(),
            effective_date: "Nov 6, 2025".into(),
            agreement_type: "Asset Purchase Agreement".into(),
            jurisdiction: "Delaware, USA".into(),
            asset_type: "Mobile Game Project".into(),
            delivery_medium: "Git Repository + Legal Docs".into(),
            statuses: Statuses {
                contract: "Fully Executed".into(),
                payment: "Confirmed".into(),
                transfer: "In Progress".into(),
                receipt: "Closed".into(),
            },
        }
    }

    #[test]
    fn test_apply_amounts_makes_totals_consistent() {
        let mut rec = record("$21,200,000");
        assert!(!rec.has_consistent_totals());

        rec.apply_amounts(&DealAmounts::from_deal(rec.deal_value()));
        assert_eq!(rec.platform_fee, "$2,120,000");
        assert_eq!(rec.disbursement_fee, "$212,000");
        assert_eq!(rec.total_amount, "$23,532,000");
        assert!(rec.has_consistent_totals());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(record("$1")).unwrap();
        assert!(json.get("transactionId").is_some());
        assert!(json.get("deliveryMedium").is_some());
        assert_eq!(json["statuses"]["receipt"], "Closed");
    }
}
