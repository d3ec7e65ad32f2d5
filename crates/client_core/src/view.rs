//! View model for the four panes and the error surface, plus the reducer that
//! folds response events into it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{domain::Pane, error::BackendError, error::ErrorKind};
use tokio::sync::watch;

/// How concurrent responses for the same target are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Whatever response is applied last wins, including late error reveals.
    #[default]
    LastWriteWins,
    /// Only the most recently issued request per pane may write it, and error
    /// events from a superseded action are dropped.
    LatestIssued,
}

/// Identifies the request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ticket {
    /// Generation of the dispatch that caused the request.
    pub action: u64,
    /// Client-wide monotonic request number.
    pub seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSurface {
    pub visible: bool,
    pub message: String,
    pub kind: Option<ErrorKind>,
}

/// Per-pane supervisor state used by [`OrderingPolicy::LatestIssued`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PaneSlot {
    /// Last request issued for the pane.
    issued: u64,
    /// Refresh sent right behind a command for the same pane. It may fill the
    /// pane until the command reply lands, never after.
    follow_up: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub rom: String,
    pub ram: String,
    pub flash: String,
    pub registers: String,
    pub error: ErrorSurface,
    pub policy: OrderingPolicy,
    pub action: u64,
    #[serde(skip)]
    slots: [PaneSlot; 4],
}

impl ViewModel {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn pane(&self, pane: Pane) -> &str {
        match pane {
            Pane::Rom => &self.rom,
            Pane::Ram => &self.ram,
            Pane::Flash => &self.flash,
            Pane::Registers => &self.registers,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> &mut String {
        match pane {
            Pane::Rom => &mut self.rom,
            Pane::Ram => &mut self.ram,
            Pane::Flash => &mut self.flash,
            Pane::Registers => &mut self.registers,
        }
    }

    fn accepts_pane_write(&self, pane: Pane, ticket: Ticket) -> bool {
        match self.policy {
            OrderingPolicy::LastWriteWins => true,
            OrderingPolicy::LatestIssued => {
                let slot = self.slots[pane.index()];
                slot.issued == ticket.seq || (slot.follow_up != 0 && slot.follow_up == ticket.seq)
            }
        }
    }

    fn accepts_error_event(&self, ticket: Ticket) -> bool {
        match self.policy {
            OrderingPolicy::LastWriteWins => true,
            OrderingPolicy::LatestIssued => ticket.action == self.action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A dispatch began; the error surface is hidden optimistically.
    ActionStarted { action: u64 },
    /// A request whose reply targets `pane` was issued.
    PaneRequested { pane: Pane, seq: u64 },
    /// A refresh of `pane` was issued behind a command that also writes it.
    FollowUpRequested { pane: Pane, seq: u64 },
    PaneLoaded {
        pane: Pane,
        ticket: Ticket,
        content: String,
    },
    ErrorRevealed { ticket: Ticket, kind: ErrorKind },
    ErrorMessageLoaded { ticket: Ticket, message: String },
    TransportFailed { ticket: Ticket, error: BackendError },
}

pub fn reduce(state: &ViewModel, event: &ViewEvent) -> ViewModel {
    let mut next = state.clone();
    match event {
        ViewEvent::ActionStarted { action } => {
            next.action = next.action.max(*action);
            next.error.visible = false;
        }
        ViewEvent::PaneRequested { pane, seq } => {
            let slot = &mut next.slots[pane.index()];
            slot.issued = slot.issued.max(*seq);
            slot.follow_up = 0;
        }
        ViewEvent::FollowUpRequested { pane, seq } => {
            let slot = &mut next.slots[pane.index()];
            if *seq > slot.issued {
                slot.follow_up = *seq;
            }
        }
        ViewEvent::PaneLoaded {
            pane,
            ticket,
            content,
        } => {
            if next.accepts_pane_write(*pane, *ticket) {
                *next.pane_mut(*pane) = content.clone();
                let slot = &mut next.slots[pane.index()];
                if slot.issued == ticket.seq {
                    slot.follow_up = 0;
                }
            }
        }
        ViewEvent::ErrorRevealed { ticket, kind } => {
            if next.accepts_error_event(*ticket) {
                next.error.visible = true;
                next.error.kind = Some(*kind);
            }
        }
        ViewEvent::ErrorMessageLoaded { ticket, message } => {
            if next.accepts_error_event(*ticket) {
                next.error.message = message.clone();
            }
        }
        ViewEvent::TransportFailed { ticket, error } => {
            if next.accepts_error_event(*ticket) {
                next.error.visible = true;
                next.error.kind = Some(error.kind());
                next.error.message = error.to_string();
            }
        }
    }
    next
}

/// Single owner of the [`ViewModel`]; every response handler writes through it.
#[derive(Clone)]
pub struct ViewStore {
    tx: Arc<watch::Sender<ViewModel>>,
}

impl ViewStore {
    pub fn new(policy: OrderingPolicy) -> Self {
        let (tx, _rx) = watch::channel(ViewModel::new(policy));
        Self { tx: Arc::new(tx) }
    }

    pub fn apply(&self, event: ViewEvent) {
        tracing::trace!(?event, "applying view event");
        self.tx.send_modify(|state| *state = reduce(state, &event));
    }

    pub fn snapshot(&self) -> ViewModel {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::Endpoint;

    fn ticket(action: u64, seq: u64) -> Ticket {
        Ticket { action, seq }
    }

    fn loaded(pane: Pane, seq: u64, content: &str) -> ViewEvent {
        ViewEvent::PaneLoaded {
            pane,
            ticket: ticket(1, seq),
            content: content.to_string(),
        }
    }

    #[test]
    fn action_start_hides_surface_but_keeps_message() {
        let mut state = ViewModel::default();
        state.error = ErrorSurface {
            visible: true,
            message: "bad opcode".to_string(),
            kind: Some(ErrorKind::Application),
        };

        let next = reduce(&state, &ViewEvent::ActionStarted { action: 3 });
        assert!(!next.error.visible);
        assert_eq!(next.error.message, "bad opcode");
        assert_eq!(next.action, 3);
    }

    #[test]
    fn last_write_wins_applies_stale_responses() {
        let state = ViewModel::new(OrderingPolicy::LastWriteWins);
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Ram, seq: 1 });
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Ram, seq: 2 });
        let state = reduce(&state, &loaded(Pane::Ram, 2, "new"));
        let state = reduce(&state, &loaded(Pane::Ram, 1, "old"));
        assert_eq!(state.ram, "old");
    }

    #[test]
    fn latest_issued_discards_superseded_responses() {
        let state = ViewModel::new(OrderingPolicy::LatestIssued);
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Ram, seq: 1 });
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Ram, seq: 2 });
        let state = reduce(&state, &loaded(Pane::Ram, 1, "old"));
        assert_eq!(state.ram, "");
        let state = reduce(&state, &loaded(Pane::Ram, 2, "new"));
        let state = reduce(&state, &loaded(Pane::Ram, 1, "old"));
        assert_eq!(state.ram, "new");
    }

    #[test]
    fn latest_issued_command_reply_overrides_follow_up_refresh() {
        let state = ViewModel::new(OrderingPolicy::LatestIssued);
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Flash, seq: 1 });
        let state = reduce(&state, &ViewEvent::FollowUpRequested { pane: Pane::Flash, seq: 4 });
        let state = reduce(&state, &loaded(Pane::Flash, 4, "stale flash"));
        assert_eq!(state.flash, "stale flash");
        let state = reduce(&state, &loaded(Pane::Flash, 1, "0x00: HALT"));
        assert_eq!(state.flash, "0x00: HALT");
    }

    #[test]
    fn latest_issued_drops_follow_up_after_command_reply() {
        let state = ViewModel::new(OrderingPolicy::LatestIssued);
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Rom, seq: 1 });
        let state = reduce(&state, &ViewEvent::FollowUpRequested { pane: Pane::Rom, seq: 3 });
        let state = reduce(&state, &loaded(Pane::Rom, 1, "0x00: NOP"));
        let state = reduce(&state, &loaded(Pane::Rom, 3, "stale rom"));
        assert_eq!(state.rom, "0x00: NOP");
    }

    #[test]
    fn new_request_supersedes_command_and_follow_up() {
        let state = ViewModel::new(OrderingPolicy::LatestIssued);
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Rom, seq: 1 });
        let state = reduce(&state, &ViewEvent::FollowUpRequested { pane: Pane::Rom, seq: 2 });
        let state = reduce(&state, &ViewEvent::PaneRequested { pane: Pane::Rom, seq: 7 });
        let state = reduce(&state, &loaded(Pane::Rom, 2, "follow-up"));
        let state = reduce(&state, &loaded(Pane::Rom, 1, "command"));
        assert_eq!(state.rom, "");
        let state = reduce(&state, &loaded(Pane::Rom, 7, "latest"));
        assert_eq!(state.rom, "latest");
    }

    #[test]
    fn latest_issued_ignores_reveal_from_previous_action() {
        let state = ViewModel::new(OrderingPolicy::LatestIssued);
        let state = reduce(&state, &ViewEvent::ActionStarted { action: 1 });
        let state = reduce(&state, &ViewEvent::ActionStarted { action: 2 });
        let state = reduce(
            &state,
            &ViewEvent::ErrorRevealed {
                ticket: ticket(1, 4),
                kind: ErrorKind::Application,
            },
        );
        assert!(!state.error.visible);
    }

    #[test]
    fn last_write_wins_lets_late_reveal_reshow_surface() {
        let state = ViewModel::new(OrderingPolicy::LastWriteWins);
        let state = reduce(&state, &ViewEvent::ActionStarted { action: 2 });
        let state = reduce(
            &state,
            &ViewEvent::ErrorRevealed {
                ticket: ticket(1, 4),
                kind: ErrorKind::Application,
            },
        );
        assert!(state.error.visible);
    }

    #[test]
    fn transport_failure_reveals_with_transport_kind() {
        let state = ViewModel::default();
        let state = reduce(
            &state,
            &ViewEvent::TransportFailed {
                ticket: ticket(0, 1),
                error: BackendError::transport(Endpoint::Ram, "connection refused"),
            },
        );
        assert!(state.error.visible);
        assert_eq!(state.error.kind, Some(ErrorKind::Transport));
        assert!(state.error.message.contains("/ram"));
        assert_eq!(state.ram, "");
    }

    #[test]
    fn store_notifies_subscribers() {
        let store = ViewStore::new(OrderingPolicy::LastWriteWins);
        let mut rx = store.subscribe();
        store.apply(loaded(Pane::Registers, 1, "<table></table>"));
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().registers, "<table></table>");
        assert_eq!(store.snapshot().registers, "<table></table>");
    }
}
