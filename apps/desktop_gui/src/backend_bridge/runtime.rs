//! Runtime bridge between UI command queue and backend event intake.

use std::{thread, time::Duration};

use client_core::{ClientSettings, EmulatorClient, ViewModel};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::{sync::watch, task::JoinHandle};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const VIEW_RETRY_INTERVAL: Duration = Duration::from_millis(16);

/// Forwards every view model change to the UI thread.
fn spawn_view_forwarder(client: &EmulatorClient, ui_tx: Sender<UiEvent>) -> JoinHandle<()> {
    let mut views = client.subscribe();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            if !forward_latest(&mut views, &ui_tx).await {
                break;
            }
        }
    })
}

/// Sends the newest view. While the UI queue is full it retries on the next
/// tick with whatever view is current by then. Returns false once the UI is gone.
async fn forward_latest(views: &mut watch::Receiver<ViewModel>, ui_tx: &Sender<UiEvent>) -> bool {
    loop {
        let view = views.borrow_and_update().clone();
        match ui_tx.try_send(UiEvent::ViewUpdated(view)) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("ui event queue full; retrying view update");
                tokio::time::sleep(VIEW_RETRY_INTERVAL).await;
            }
        }
    }
}

fn connect(settings: &ClientSettings, ui_tx: &Sender<UiEvent>) -> Option<EmulatorClient> {
    match EmulatorClient::from_settings(settings) {
        Ok(client) => {
            let _ = ui_tx.try_send(UiEvent::Connected {
                server_url: settings.server_url.clone(),
            });
            Some(client)
        }
        Err(err) => {
            tracing::error!("failed to build emulator client: {err:#}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::Connect,
                format!("{err:#}"),
            )));
            None
        }
    }
}

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut settings = settings;
            let mut client = connect(&settings, &ui_tx);
            let mut forwarder = client
                .as_ref()
                .map(|client| spawn_view_forwarder(client, ui_tx.clone()));
            if let Some(client) = &client {
                drop(client.refresh_all());
            }

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Connect { server_url } => {
                        settings.server_url = server_url;
                        if let Some(task) = forwarder.take() {
                            task.abort();
                        }
                        client = connect(&settings, &ui_tx);
                        if let Some(client) = &client {
                            forwarder = Some(spawn_view_forwarder(client, ui_tx.clone()));
                            drop(client.refresh_all());
                        }
                    }
                    BackendCommand::Dispatch(command) => match &client {
                        // Requests run detached; results arrive through the forwarder.
                        Some(client) => drop(client.dispatch(command)),
                        None => {
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::General,
                                "emulator client unavailable; check the server url",
                            )));
                        }
                    },
                    BackendCommand::Refresh => {
                        if let Some(client) = &client {
                            drop(client.refresh_all());
                        }
                    }
                }
            }
        });
    });
}
