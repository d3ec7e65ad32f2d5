//! User-triggered commands.

use std::sync::Arc;

use shared::{domain::Command, protocol::AssembleForm};
use tracing::info;

use crate::{
    router::{ResponseRouter, Sink},
    sync::MemoryViewSynchronizer,
    transport::exchange,
    view::ViewEvent,
    InFlight, Session,
};

#[derive(Clone)]
pub struct ActionDispatcher {
    session: Arc<Session>,
    router: ResponseRouter,
    sync: MemoryViewSynchronizer,
}

impl ActionDispatcher {
    pub(crate) fn new(
        session: Arc<Session>,
        router: ResponseRouter,
        sync: MemoryViewSynchronizer,
    ) -> Self {
        Self {
            session,
            router,
            sync,
        }
    }

    /// Hides the error surface, issues the command and, without waiting for
    /// it, refreshes every pane.
    pub fn dispatch(&self, command: Command) -> InFlight {
        let action = self.session.begin_action();
        info!(command = command.name(), action, "dispatching command");
        self.router.errors().hide(action);

        let endpoint = command.endpoint();
        let sink = command.target_pane().map_or(Sink::Discard, Sink::Pane);
        let form = command.source().map(|code| AssembleForm {
            code: code.to_string(),
        });
        let ticket = self.session.issue_ticket(action);
        if let Sink::Pane(pane) = sink {
            self.session.store.apply(ViewEvent::PaneRequested {
                pane,
                seq: ticket.seq,
            });
        }

        let session = Arc::clone(&self.session);
        let router = self.router.clone();
        let command_task = tokio::spawn(async move {
            let reply = exchange(session.transport.as_ref(), endpoint, form.as_ref()).await;
            router.route(ticket, reply, sink).await;
        });

        let mut in_flight = self.sync.refresh_behind(action, command.target_pane());
        in_flight.push(command_task);
        in_flight
    }
}
