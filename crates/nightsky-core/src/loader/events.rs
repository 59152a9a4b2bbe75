//! Observability events emitted by the loader.

use crate::error::FetchError;
use crate::params::FetchParameters;
use crate::session::SessionId;

/// Lifecycle events, broadcast to every `ProgressiveLoader::events` subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    SessionStarted {
        session: SessionId,
        params: FetchParameters,
    },
    PageFetched {
        session: SessionId,
        /// 1-based page number.
        page: u64,
        offset: u64,
        records: usize,
        loaded: u64,
        total: Option<u64>,
        has_more: bool,
    },
    DataPublished {
        session: SessionId,
        loaded: u64,
        /// Milestone percentage that triggered the publish, if any.
        milestone: Option<u8>,
        /// Set on the publish that ends the session.
        complete: bool,
    },
    SessionCompleted {
        session: SessionId,
        loaded: u64,
        pages: u64,
    },
    SessionFailed {
        session: SessionId,
        loaded: u64,
        error: FetchError,
    },
    SessionSuperseded {
        session: SessionId,
    },
}

impl LoaderEvent {
    pub fn session(&self) -> SessionId {
        match self {
            LoaderEvent::SessionStarted { session, .. }
            | LoaderEvent::PageFetched { session, .. }
            | LoaderEvent::DataPublished { session, .. }
            | LoaderEvent::SessionCompleted { session, .. }
            | LoaderEvent::SessionFailed { session, .. }
            | LoaderEvent::SessionSuperseded { session } => *session,
        }
    }
}
