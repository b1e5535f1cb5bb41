use serde::{Deserialize, Serialize};

/// Phase of the transaction walkthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Contract,
    Payment,
    Transfer,
    Receipt,
}

/// A single entry of the walkthrough sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub label: &'static str,
    pub kind: StepKind,
}

/// Number of steps in the walkthrough
pub const STEP_COUNT: usize = 4;

/// The walkthrough, in playback order
pub static STEPS: [StepDescriptor; STEP_COUNT] = [
    StepDescriptor { label: "Contract", kind: StepKind::Contract },
    StepDescriptor { label: "Payment", kind: StepKind::Payment },
    StepDescriptor { label: "Transfer", kind: StepKind::Transfer },
    StepDescriptor { label: "Receipt", kind: StepKind::Receipt },
];

/// Index of the receipt step, where playback ends
pub const TERMINAL_STEP: usize = STEP_COUNT - 1;

/// Look up a step by index
pub fn step_at(index: usize) -> Option<&'static StepDescriptor> {
    STEPS.get(index)
}

/// Check whether an index is the terminal step
pub fn is_terminal(index: usize) -> bool {
    index == TERMINAL_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order() {
        let kinds: Vec<_> = STEPS.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Contract, StepKind::Payment, StepKind::Transfer, StepKind::Receipt]
        );
        assert_eq!(TERMINAL_STEP, 3);
        assert!(is_terminal(3));
        assert!(!is_terminal(0));
    }

    #[test]
    fn test_step_at_bounds() {
        assert_eq!(step_at(1).map(|s| s.label), Some("Payment"));
        assert!(step_at(STEP_COUNT).is_none());
    }
}
