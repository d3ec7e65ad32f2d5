//! UI layer for desktop GUI: app shell and pane widgets.

pub mod app;
pub mod panes;

pub use app::{DesktopGuiApp, StartupConfig};
