use crate::core::{DealAmounts, ScenarioRecord, Statuses};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;

/// Range of transaction and receipt numbers
pub const ID_MIN: u32 = 100_000;
pub const ID_MAX: u32 = 999_999;

/// Deal amount of the scenario shown at startup
pub const SEED_DEAL_AMOUNT: i64 = 12_750_000;

const REDACTION: char = '█';

/// Explicit overrides for a generated scenario
#[derive(Debug, Clone, PartialEq)]
pub struct DealBase {
    pub deal_amount: Decimal,
    pub company: String,
    pub asset: String,
}

/// A replay scenario; party names stay redacted
struct ReplayPreset {
    amount: i64,
    company_len: usize,
    asset_len: usize,
}

const REPLAY_PRESETS: [ReplayPreset; 4] = [
    ReplayPreset { amount: 8_500_000, company_len: 15, asset_len: 18 },
    ReplayPreset { amount: 12_750_000, company_len: 11, asset_len: 14 },
    ReplayPreset { amount: 21_200_000, company_len: 16, asset_len: 19 },
    ReplayPreset { amount: 15_800_000, company_len: 10, asset_len: 12 },
];

/// A named preset offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorPreset {
    pub name: &'static str,
    pub amount: i64,
    pub company: &'static str,
    pub asset: &'static str,
}

impl EditorPreset {
    pub fn base(&self) -> DealBase {
        DealBase {
            deal_amount: Decimal::from(self.amount),
            company: self.company.to_string(),
            asset: self.asset.to_string(),
        }
    }
}

pub const EDITOR_PRESETS: [EditorPreset; 4] = [
    EditorPreset {
        name: "Small Deal",
        amount: 8_500_000,
        company: "Tech Startup Inc.",
        asset: "Mobile App Platform",
    },
    EditorPreset {
        name: "Medium Deal",
        amount: 12_750_000,
        company: "Growth Studios",
        asset: "Game Development Studio",
    },
    EditorPreset {
        name: "Large Deal",
        amount: 21_200_000,
        company: "Enterprise Solutions",
        asset: "SaaS Platform",
    },
    EditorPreset {
        name: "Mega Deal",
        amount: 50_000_000,
        company: "Global Innovations",
        asset: "AI Technology Portfolio",
    },
];

fn redacted(len: usize) -> String {
    std::iter::repeat(REDACTION).take(len).collect()
}

fn display_date(year: i32, month: u32, day: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Produces scenario records with derived charges and fresh identifiers.
///
/// Identifiers are drawn independently per call and may repeat across calls.
pub struct ScenarioGenerator {
    rng: StdRng,
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a transaction id and a receipt id
    pub fn fresh_ids(&mut self) -> (u32, u32) {
        let transaction_id = self.rng.gen_range(ID_MIN..=ID_MAX);
        let receipt_id = self.rng.gen_range(ID_MIN..=ID_MAX);
        (transaction_id, receipt_id)
    }

    /// The scenario shown before any replay or edit
    pub fn seed_scenario(&mut self) -> ScenarioRecord {
        let (transaction_id, receipt_id) = self.fresh_ids();
        let mut record = ScenarioRecord {
            transaction_id,
            receipt_id,
            buyer: redacted(10),
            seller: redacted(10),
            company: redacted(15),
            asset: redacted(18),
            deal_amount: String::new(),
            platform_fee: String::new(),
            disbursement_fee: String::new(),
            total_amount: String::new(),
            payment_date: display_date(2025, 11, 6),
            transfer_date: display_date(2025, 11, 7),
            completion_date: display_date(2025, 11, 8),
            effective_date: display_date(2025, 11, 6),
            agreement_type: "Asset Purchase Agreement".to_string(),
            jurisdiction: "Delaware, USA".to_string(),
            asset_type: "Mobile Game Project".to_string(),
            delivery_medium: "Git Repository + Legal Docs".to_string(),
            statuses: Statuses {
                contract: "Fully Executed".to_string(),
                payment: "Confirmed".to_string(),
                transfer: "In Progress".to_string(),
                receipt: "Closed".to_string(),
            },
        };
        record.apply_amounts(&DealAmounts::from_deal(Decimal::from(SEED_DEAL_AMOUNT)));
        record
    }

    /// Build a new scenario on top of `template`.
    ///
    /// Without `base` a replay preset is picked at random; with it the given
    /// amount, company and asset are used. Fields not covered by either are
    /// carried over from the template.
    pub fn generate(
        &mut self,
        template: &ScenarioRecord,
        base: Option<&DealBase>,
    ) -> ScenarioRecord {
        let base = match base {
            Some(base) => base.clone(),
            None => {
                let preset = &REPLAY_PRESETS[self.rng.gen_range(0..REPLAY_PRESETS.len())];
                DealBase {
                    deal_amount: Decimal::from(preset.amount),
                    company: redacted(preset.company_len),
                    asset: redacted(preset.asset_len),
                }
            }
        };

        let (transaction_id, receipt_id) = self.fresh_ids();
        let mut record = ScenarioRecord {
            transaction_id,
            receipt_id,
            company: base.company,
            asset: base.asset,
            ..template.clone()
        };
        record.apply_amounts(&DealAmounts::from_deal(base.deal_amount));
        debug_assert!(record.has_consistent_totals());

        debug!(
            transaction_id,
            receipt_id,
            total = %record.total_amount,
            "generated scenario"
        );
        record
    }
}
