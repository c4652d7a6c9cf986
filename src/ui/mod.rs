pub mod icons;
pub mod progress;

pub use progress::{FlowUI, UiMode};
