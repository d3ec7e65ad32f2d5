//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn command_name(cmd: &BackendCommand) -> &'static str {
    match cmd {
        BackendCommand::Connect { .. } => "connect",
        BackendCommand::Dispatch(command) => command.name(),
        BackendCommand::Refresh => "refresh",
    }
}

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = command_name(&cmd);

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use shared::domain::Command;

    #[test]
    fn reports_full_queue_in_status() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        dispatch_backend_command(&tx, BackendCommand::Refresh, &mut status);
        assert!(status.is_empty());
        dispatch_backend_command(&tx, BackendCommand::Dispatch(Command::Run), &mut status);
        assert!(status.contains("full"));
    }

    #[test]
    fn reports_disconnected_worker_in_status() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let mut status = String::new();
        dispatch_backend_command(&tx, BackendCommand::Refresh, &mut status);
        assert!(status.contains("disconnected"));
    }
}
