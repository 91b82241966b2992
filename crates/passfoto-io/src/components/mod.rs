//! Dioxus UI components for passfoto.
//!
//! Provides the step indicator, file upload zone, background
//! composition panel, tonal adjustment panel, crop panel, and export
//! panel. Components are presentation-only: every state change is
//! reported through an `EventHandler` and applied by the application
//! shell, which owns the session.

mod adjust;
mod background;
mod controls;
mod crop;
mod export;
mod steps;
mod upload;

pub use adjust::AdjustPanel;
pub use background::{BackgroundPanel, ColorPick};
pub use crop::CropPanel;
pub use export::ExportPanel;
pub use steps::StepIndicator;
pub use upload::FileUpload;
