pub mod money;
pub mod scenario;
pub mod step;

pub use money::DealAmounts;
pub use scenario::{ScenarioRecord, Statuses};
pub use step::{StepDescriptor, StepKind, STEPS, TERMINAL_STEP};
