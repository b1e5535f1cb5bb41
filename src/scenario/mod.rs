pub mod editor;
pub mod generator;
pub mod store;

pub use editor::{EditableField, ScenarioEditor};
pub use generator::ScenarioGenerator;
pub use store::ScenarioStore;
