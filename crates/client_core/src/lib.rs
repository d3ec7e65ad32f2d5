use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::Result;
use futures::future::join_all;
use shared::domain::Command;
use tokio::{sync::watch, task::JoinHandle};
use tracing::warn;

pub mod config;
pub mod dispatcher;
pub mod error_channel;
pub mod router;
pub mod sync;
pub mod transport;
pub mod view;

pub use config::{load_settings, ClientSettings, ConfigError};
pub use dispatcher::ActionDispatcher;
pub use error_channel::ErrorChannel;
pub use router::{ResponseRouter, Sink};
pub use sync::MemoryViewSynchronizer;
pub use transport::{EmulatorTransport, HttpTransport};
pub use view::{ErrorSurface, OrderingPolicy, Ticket, ViewEvent, ViewModel, ViewStore};

/// State shared by every request issued for one emulator session.
pub(crate) struct Session {
    pub(crate) transport: Arc<dyn EmulatorTransport>,
    pub(crate) store: ViewStore,
    next_seq: AtomicU64,
    current_action: AtomicU64,
}

impl Session {
    fn new(transport: Arc<dyn EmulatorTransport>, policy: OrderingPolicy) -> Self {
        Self {
            transport,
            store: ViewStore::new(policy),
            next_seq: AtomicU64::new(0),
            current_action: AtomicU64::new(0),
        }
    }

    pub(crate) fn begin_action(&self) -> u64 {
        self.current_action.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn current_action(&self) -> u64 {
        self.current_action.load(Ordering::SeqCst)
    }

    pub(crate) fn issue_ticket(&self, action: u64) -> Ticket {
        Ticket {
            action,
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }
}

/// Handles of the requests spawned by one dispatch or refresh.
///
/// Dropping it detaches the requests; they still run to completion.
#[derive(Default)]
pub struct InFlight {
    tasks: Vec<JoinHandle<()>>,
}

impl InFlight {
    pub(crate) fn push(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits until every request, including any error reveal it triggered, has finished.
    pub async fn settled(self) {
        for result in join_all(self.tasks).await {
            if let Err(err) = result {
                warn!("request task ended abnormally: {err}");
            }
        }
    }
}

pub struct EmulatorClient {
    session: Arc<Session>,
    dispatcher: ActionDispatcher,
    sync: MemoryViewSynchronizer,
}

impl EmulatorClient {
    pub fn new(transport: Arc<dyn EmulatorTransport>, policy: OrderingPolicy) -> Self {
        let session = Arc::new(Session::new(transport, policy));
        let errors = ErrorChannel::new(Arc::clone(&session));
        let router = ResponseRouter::new(Arc::clone(&session), errors);
        let sync = MemoryViewSynchronizer::new(Arc::clone(&session), router.clone());
        let dispatcher = ActionDispatcher::new(Arc::clone(&session), router, sync.clone());
        Self {
            session,
            dispatcher,
            sync,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let transport = HttpTransport::new(
            &settings.server_url,
            Duration::from_millis(settings.request_timeout_ms),
        )?;
        Ok(Self::new(Arc::new(transport), settings.ordering))
    }

    /// Must be called from within a tokio runtime; every request is spawned.
    pub fn dispatch(&self, command: Command) -> InFlight {
        self.dispatcher.dispatch(command)
    }

    pub fn assemble_rom(&self, source: impl Into<String>) -> InFlight {
        self.dispatch(Command::AssembleRom {
            source: source.into(),
        })
    }

    pub fn assemble_flash(&self, source: impl Into<String>) -> InFlight {
        self.dispatch(Command::AssembleFlash {
            source: source.into(),
        })
    }

    pub fn run_cycle(&self) -> InFlight {
        self.dispatch(Command::RunCycle)
    }

    pub fn run(&self) -> InFlight {
        self.dispatch(Command::Run)
    }

    pub fn reset(&self) -> InFlight {
        self.dispatch(Command::Reset)
    }

    pub fn flush(&self) -> InFlight {
        self.dispatch(Command::Flush)
    }

    /// Refreshes all panes under the current action without hiding the error surface.
    pub fn refresh_all(&self) -> InFlight {
        self.sync.refresh_all(self.session.current_action())
    }

    pub fn snapshot(&self) -> ViewModel {
        self.session.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.session.store.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
