//! Routes decoded replies to their pane or to the error channel.

use std::sync::Arc;

use shared::{domain::Pane, error::BackendError, protocol::Reply};
use tracing::{debug, warn};

use crate::{
    error_channel::ErrorChannel,
    view::{Ticket, ViewEvent},
    Session,
};

/// Where a successful payload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Pane(Pane),
    Discard,
}

#[derive(Clone)]
pub struct ResponseRouter {
    session: Arc<Session>,
    errors: ErrorChannel,
}

impl ResponseRouter {
    pub(crate) fn new(session: Arc<Session>, errors: ErrorChannel) -> Self {
        Self { session, errors }
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    pub async fn route(&self, ticket: Ticket, reply: Reply, sink: Sink) {
        match reply {
            Ok(content) => match sink {
                Sink::Pane(pane) => self.session.store.apply(ViewEvent::PaneLoaded {
                    pane,
                    ticket,
                    content,
                }),
                Sink::Discard => debug!(seq = ticket.seq, "discarding reply payload"),
            },
            Err(BackendError::Application { endpoint }) => {
                warn!(%endpoint, seq = ticket.seq, "backend returned error sentinel");
                self.errors.reveal(ticket).await;
            }
            Err(error) => {
                warn!(endpoint = %error.endpoint(), seq = ticket.seq, %error, "request failed");
                self.session
                    .store
                    .apply(ViewEvent::TransportFailed { ticket, error });
            }
        }
    }
}
