pub mod render;
pub mod shortcuts;

pub use render::TextPresenter;
pub use shortcuts::{Invocation, ShortcutAction, ShortcutManager};
