use crate::core::money::{parse_amount, DealAmounts};
use crate::core::ScenarioRecord;
use crate::playback::PlaybackConfig;
use crate::scenario::generator::{DealBase, EDITOR_PRESETS};
use crate::scenario::{ScenarioGenerator, ScenarioStore};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Granularity of the step duration setting
pub const STEP_DURATION_INCREMENT_MS: u64 = 500;

/// Errors for editor requests that name nothing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Free-text fields of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Buyer,
    Seller,
    Company,
    Asset,
    PaymentDate,
    TransferDate,
    CompletionDate,
    EffectiveDate,
    AgreementType,
    Jurisdiction,
    AssetType,
    DeliveryMedium,
}

impl EditableField {
    pub const ALL: [EditableField; 12] = [
        EditableField::Buyer,
        EditableField::Seller,
        EditableField::Company,
        EditableField::Asset,
        EditableField::PaymentDate,
        EditableField::TransferDate,
        EditableField::CompletionDate,
        EditableField::EffectiveDate,
        EditableField::AgreementType,
        EditableField::Jurisdiction,
        EditableField::AssetType,
        EditableField::DeliveryMedium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditableField::Buyer => "Buyer",
            EditableField::Seller => "Seller",
            EditableField::Company => "Target Company",
            EditableField::Asset => "Asset",
            EditableField::PaymentDate => "Payment Date",
            EditableField::TransferDate => "Transfer Date",
            EditableField::CompletionDate => "Completion Date",
            EditableField::EffectiveDate => "Effective Date",
            EditableField::AgreementType => "Agreement Type",
            EditableField::Jurisdiction => "Jurisdiction",
            EditableField::AssetType => "Asset Type",
            EditableField::DeliveryMedium => "Delivery Medium",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            EditableField::Buyer => "buyer",
            EditableField::Seller => "seller",
            EditableField::Company => "company",
            EditableField::Asset => "asset",
            EditableField::PaymentDate => "paymentdate",
            EditableField::TransferDate => "transferdate",
            EditableField::CompletionDate => "completiondate",
            EditableField::EffectiveDate => "effectivedate",
            EditableField::AgreementType => "agreementtype",
            EditableField::Jurisdiction => "jurisdiction",
            EditableField::AssetType => "assettype",
            EditableField::DeliveryMedium => "deliverymedium",
        }
    }

    fn slot<'a>(&self, record: &'a mut ScenarioRecord) -> &'a mut String {
        match self {
            EditableField::Buyer => &mut record.buyer,
            EditableField::Seller => &mut record.seller,
            EditableField::Company => &mut record.company,
            EditableField::Asset => &mut record.asset,
            EditableField::PaymentDate => &mut record.payment_date,
            EditableField::TransferDate => &mut record.transfer_date,
            EditableField::CompletionDate => &mut record.completion_date,
            EditableField::EffectiveDate => &mut record.effective_date,
            EditableField::AgreementType => &mut record.agreement_type,
            EditableField::Jurisdiction => &mut record.jurisdiction,
            EditableField::AssetType => &mut record.asset_type,
            EditableField::DeliveryMedium => &mut record.delivery_medium,
        }
    }
}

/// Accepts `paymentDate`, `payment_date`, `payment-date` and so on
impl FromStr for EditableField {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        EditableField::ALL
            .iter()
            .copied()
            .find(|field| field.key() == key)
            .ok_or_else(|| EditorError::UnknownField(s.to_string()))
    }
}

/// Result of a committed edit
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub record: ScenarioRecord,
    pub step_duration: Duration,
}

/// An editing session over a draft copy of the current scenario.
///
/// Nothing reaches the store until [`ScenarioEditor::commit`]; dropping the
/// editor discards the draft.
pub struct ScenarioEditor {
    original: ScenarioRecord,
    draft: ScenarioRecord,
    step_duration_ms: u64,
}

impl ScenarioEditor {
    pub fn new(current: &ScenarioRecord, step_duration: Duration) -> Self {
        let mut editor = Self {
            original: current.clone(),
            draft: current.clone(),
            step_duration_ms: 0,
        };
        editor.set_step_duration_ms(step_duration.as_millis() as u64);
        editor
    }

    pub fn draft(&self) -> &ScenarioRecord {
        &self.draft
    }

    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }

    /// Set a free-text field verbatim
    pub fn set_field(&mut self, field: EditableField, value: &str) {
        *field.slot(&mut self.draft) = value.to_string();
    }

    /// Set the deal amount from typed text and recompute the charges.
    ///
    /// Text that does not read as a number counts as zero.
    pub fn set_deal_amount(&mut self, input: &str) -> Decimal {
        let amount = match parse_amount(input) {
            Some(amount) => amount,
            None => {
                warn!(input, "deal amount not numeric, using 0");
                Decimal::ZERO
            }
        };

        let amounts = DealAmounts::from_deal(amount);
        self.draft.apply_amounts(&amounts);
        amounts.deal
    }

    /// Apply a preset by list position (1-based) or by name
    pub fn apply_preset(&mut self, selector: &str) -> Result<(), EditorError> {
        let selector = selector.trim();
        let preset = match selector.parse::<usize>() {
            Ok(n) if n >= 1 => EDITOR_PRESETS.get(n - 1),
            Ok(_) => None,
            Err(_) => EDITOR_PRESETS.iter().find(|p| {
                p.name.eq_ignore_ascii_case(selector)
                    || p.name
                        .split_whitespace()
                        .next()
                        .is_some_and(|first| first.eq_ignore_ascii_case(selector))
            }),
        }
        .ok_or_else(|| EditorError::UnknownPreset(selector.to_string()))?;

        let DealBase {
            deal_amount,
            company,
            asset,
        } = preset.base();
        self.draft.company = company;
        self.draft.asset = asset;
        self.draft.apply_amounts(&DealAmounts::from_deal(deal_amount));
        Ok(())
    }

    /// Snap to the nearest increment within the accepted range
    pub fn set_step_duration_ms(&mut self, ms: u64) {
        let snapped = ms.saturating_add(STEP_DURATION_INCREMENT_MS / 2) / STEP_DURATION_INCREMENT_MS
            * STEP_DURATION_INCREMENT_MS;
        self.step_duration_ms = snapped.clamp(
            PlaybackConfig::MIN_STEP_DURATION_MS,
            PlaybackConfig::MAX_STEP_DURATION_MS,
        );
    }

    /// Throw away draft changes
    pub fn reset(&mut self) {
        self.draft = self.original.clone();
    }

    /// Write the draft to the store with fresh identifiers
    pub fn commit(self, store: &ScenarioStore, generator: &mut ScenarioGenerator) -> EditOutcome {
        let base = DealBase {
            deal_amount: self.draft.deal_value(),
            company: self.draft.company.clone(),
            asset: self.draft.asset.clone(),
        };
        let record = generator.generate(&self.draft, Some(&base));

        info!(
            transaction_id = record.transaction_id,
            deal_amount = %record.deal_amount,
            "scenario edited"
        );
        store.replace(record.clone());

        EditOutcome {
            record,
            step_duration: self.step_duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (ScenarioEditor, ScenarioStore, ScenarioGenerator) {
        let mut generator = ScenarioGenerator::seeded(11);
        let store = ScenarioStore::new(generator.seed_scenario());
        let editor = ScenarioEditor::new(&store.current(), Duration::from_millis(3000));
        (editor, store, generator)
    }

    #[test]
    fn test_deal_amount_recomputes_fees() {
        let (mut editor, _, _) = session();
        editor.set_deal_amount("$1,000,000");

        let draft = editor.draft();
        assert_eq!(draft.deal_amount, "$1,000,000");
        assert_eq!(draft.platform_fee, "$100,000");
        assert_eq!(draft.disbursement_fee, "$10,000");
        assert_eq!(draft.total_amount, "$1,110,000");
    }

    #[test]
    fn test_malformed_amount_becomes_zero() {
        let (mut editor, _, _) = session();
        assert_eq!(editor.set_deal_amount("lots"), Decimal::ZERO);
        assert_eq!(editor.draft().deal_amount, "$0");
        assert_eq!(editor.draft().total_amount, "$0");
    }

    #[test]
    fn test_fractional_amount_is_rounded_before_fees() {
        let (mut editor, _, _) = session();
        editor.set_deal_amount("999.5");
        assert_eq!(editor.draft().deal_amount, "$1,000");
        assert_eq!(editor.draft().total_amount, "$1,110");
    }

    #[test]
    fn test_presets_by_number_and_name() {
        let (mut editor, _, _) = session();
        editor.apply_preset("4").unwrap();
        assert_eq!(editor.draft().company, "Global Innovations");
        assert_eq!(editor.draft().total_amount, "$55,500,000");

        editor.apply_preset("small").unwrap();
        assert_eq!(editor.draft().asset, "Mobile App Platform");
        assert_eq!(editor.draft().deal_amount, "$8,500,000");

        assert_eq!(
            editor.apply_preset("0"),
            Err(EditorError::UnknownPreset("0".to_string()))
        );
        assert!(editor.apply_preset("giga").is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("paymentDate".parse::<EditableField>(), Ok(EditableField::PaymentDate));
        assert_eq!("delivery_medium".parse::<EditableField>(), Ok(EditableField::DeliveryMedium));
        assert_eq!("Asset-Type".parse::<EditableField>(), Ok(EditableField::AssetType));
        assert_eq!(
            "dealAmount".parse::<EditableField>(),
            Err(EditorError::UnknownField("dealAmount".to_string()))
        );
    }

    #[test]
    fn test_reset_restores_opened_record() {
        let (mut editor, store, _) = session();
        editor.set_field(EditableField::Buyer, "Changed");
        editor.set_deal_amount("5");
        editor.reset();
        assert_eq!(editor.draft(), &*store.current());
    }

    #[test]
    fn test_step_duration_snaps_and_clamps() {
        let (mut editor, _, _) = session();
        editor.set_step_duration_ms(2740);
        assert_eq!(editor.step_duration(), Duration::from_millis(2500));
        editor.set_step_duration_ms(2760);
        assert_eq!(editor.step_duration(), Duration::from_millis(3000));
        editor.set_step_duration_ms(200);
        assert_eq!(editor.step_duration(), Duration::from_millis(1000));
        editor.set_step_duration_ms(60_000);
        assert_eq!(editor.step_duration(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_commit_replaces_store_with_fresh_ids() {
        let (mut editor, store, mut generator) = session();
        editor.set_field(EditableField::Jurisdiction, "Zug, Switzerland");
        editor.set_deal_amount("2000000");
        editor.set_step_duration_ms(5000);

        let outcome = editor.commit(&store, &mut generator);
        let current = store.current();
        assert_eq!(*current, outcome.record);
        assert_eq!(current.jurisdiction, "Zug, Switzerland");
        assert_eq!(current.total_amount, "$2,220,000");
        assert!(current.has_consistent_totals());
        assert_eq!(outcome.step_duration, Duration::from_millis(5000));
    }

    #[test]
    fn test_dropped_editor_leaves_store_untouched() {
        let (mut editor, store, _) = session();
        let before = store.current();
        editor.set_field(EditableField::Seller, "Nobody");
        drop(editor);
        assert_eq!(store.current(), before);
    }
}
