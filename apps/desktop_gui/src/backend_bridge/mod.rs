//! Bridge from the UI thread to the async emulator client.

pub mod commands;
pub mod runtime;
