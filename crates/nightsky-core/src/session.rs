//! Session identity and cancellation for the progressive loader.
//!
//! Each load session gets a fresh id and cancellation token. Beginning a new
//! session cancels the previous token, so the superseded loop stops issuing
//! requests and aborts its in-flight transfer. The id is what guards state
//! writes: a loop may only mutate the published state while its id is current.

use tokio_util::sync::CancellationToken;

/// Monotonically increasing session identifier. `0` means "no session yet".
pub type SessionId = u64;

/// Handle given to one session's loop.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    id: SessionId,
    cancel: CancellationToken,
}

impl SessionTicket {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once this session has been superseded or cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

/// Issues tickets and cancels the one currently running.
#[derive(Debug, Default)]
pub struct SessionControl {
    last_id: SessionId,
    current: Option<SessionTicket>,
}

impl SessionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session, cancelling the current one (if any).
    pub fn begin(&mut self) -> SessionTicket {
        self.supersede();
        self.last_id += 1;
        let ticket = SessionTicket {
            id: self.last_id,
            cancel: CancellationToken::new(),
        };
        self.current = Some(ticket.clone());
        ticket
    }

    /// Cancel the current session without starting another. Returns its id.
    pub fn supersede(&mut self) -> Option<SessionId> {
        self.current.take().map(|t| {
            t.cancel.cancel();
            t.id
        })
    }

    pub fn current_id(&self) -> Option<SessionId> {
        self.current.as_ref().map(|t| t.id)
    }

    /// Id reserved for the next call to `begin`; used to invalidate state
    /// when a session is cancelled without a replacement.
    pub(crate) fn retire(&mut self) -> SessionId {
        self.supersede();
        self.last_id += 1;
        self.last_id
    }
}
