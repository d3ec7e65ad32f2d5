//! Shared error surface: optimistic hide on dispatch, fetch-and-acknowledge on reveal.

use std::sync::Arc;

use shared::{error::ErrorKind, protocol::Endpoint};
use tracing::{debug, warn};

use crate::{
    transport::exchange,
    view::{Ticket, ViewEvent},
    Session,
};

#[derive(Clone)]
pub struct ErrorChannel {
    session: Arc<Session>,
}

impl ErrorChannel {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Hides the surface for a new action. The stored message is kept and
    /// reveals already in flight are not cancelled.
    pub fn hide(&self, action: u64) {
        self.session.store.apply(ViewEvent::ActionStarted { action });
    }

    /// Shows the surface, then fetches the server's message and only once it
    /// has arrived acknowledges it with `/clearerr`.
    pub async fn reveal(&self, ticket: Ticket) {
        let store = &self.session.store;
        store.apply(ViewEvent::ErrorRevealed {
            ticket,
            kind: ErrorKind::Application,
        });

        let transport = self.session.transport.as_ref();
        match exchange(transport, Endpoint::Error, None).await {
            Ok(message) => {
                debug!(seq = ticket.seq, %message, "fetched backend error message");
                store.apply(ViewEvent::ErrorMessageLoaded { ticket, message });
            }
            Err(error) => {
                // Leave the message on the server so a later reveal can still fetch it.
                warn!(seq = ticket.seq, %error, "could not fetch backend error message");
                store.apply(ViewEvent::TransportFailed { ticket, error });
                return;
            }
        }

        if let Err(error) = exchange(transport, Endpoint::ClearError, None).await {
            warn!(seq = ticket.seq, %error, "failed to acknowledge backend error");
        }
    }
}
