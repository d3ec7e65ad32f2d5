//! Read-refresh of the four panes.

use std::sync::Arc;

use shared::domain::Pane;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    router::{ResponseRouter, Sink},
    transport::exchange,
    view::ViewEvent,
    InFlight, Session,
};

#[derive(Clone)]
pub struct MemoryViewSynchronizer {
    session: Arc<Session>,
    router: ResponseRouter,
}

impl MemoryViewSynchronizer {
    pub(crate) fn new(session: Arc<Session>, router: ResponseRouter) -> Self {
        Self { session, router }
    }

    /// Issues one independent request per pane. None waits for another and
    /// there is no aggregate completion beyond the returned handles.
    pub fn refresh_all(&self, action: u64) -> InFlight {
        self.refresh_behind(action, None)
    }

    /// Like [`Self::refresh_all`], but the refresh of `commanded` yields to the
    /// reply of the command that was just issued for it.
    pub(crate) fn refresh_behind(&self, action: u64, commanded: Option<Pane>) -> InFlight {
        let mut in_flight = InFlight::default();
        for pane in Pane::ALL {
            in_flight.push(self.refresh_pane(pane, action, commanded == Some(pane)));
        }
        in_flight
    }

    fn refresh_pane(&self, pane: Pane, action: u64, follow_up: bool) -> JoinHandle<()> {
        let ticket = self.session.issue_ticket(action);
        let seq = ticket.seq;
        self.session.store.apply(if follow_up {
            ViewEvent::FollowUpRequested { pane, seq }
        } else {
            ViewEvent::PaneRequested { pane, seq }
        });
        let endpoint = pane.refresh_endpoint();
        debug!(%endpoint, seq = ticket.seq, "refreshing pane");

        let session = Arc::clone(&self.session);
        let router = self.router.clone();
        tokio::spawn(async move {
            let reply = exchange(session.transport.as_ref(), endpoint, None).await;
            router.route(ticket, reply, Sink::Pane(pane)).await;
        })
    }
}
