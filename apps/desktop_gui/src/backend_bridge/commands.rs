//! Backend commands queued from UI to backend worker.

use shared::domain::Command;

pub enum BackendCommand {
    /// Rebuild the client against another server.
    Connect { server_url: String },
    Dispatch(Command),
    Refresh,
}
