//! Published load state (the snapshot consumers read).

use std::sync::Arc;

use crate::error::FetchError;
use crate::params::FetchParameters;
use crate::session::SessionId;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Completed,
    Failed,
    Cancelled,
}

/// Progress counters, updated after every successful page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    /// Records received so far in this session.
    pub loaded: u64,
    /// Total reported by the first page (`None` until then, or if not reported).
    pub total: Option<u64>,
    pub has_more: bool,
    /// Pages received so far.
    pub current_page: u64,
}

impl Default for LoadProgress {
    fn default() -> Self {
        Self {
            loaded: 0,
            total: None,
            has_more: true,
            current_page: 0,
        }
    }
}

impl LoadProgress {
    /// Percent complete, when the total is known and non-zero.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64) * 100.0),
            _ => None,
        }
    }
}

/// Snapshot of one loader's state.
///
/// `data` only changes at publish points (milestones and completion), so it
/// can lag `progress.loaded`; `data_revision` increments once per publish.
#[derive(Debug, Clone)]
pub struct LoadSnapshot<R> {
    pub session: SessionId,
    pub params: Option<FetchParameters>,
    pub phase: LoadPhase,
    pub data: Arc<Vec<R>>,
    pub data_revision: u64,
    pub is_loading: bool,
    pub error: Option<FetchError>,
    pub progress: LoadProgress,
}

impl<R> LoadSnapshot<R> {
    pub fn idle() -> Self {
        Self {
            session: 0,
            params: None,
            phase: LoadPhase::Idle,
            data: Arc::new(Vec::new()),
            data_revision: 0,
            is_loading: false,
            error: None,
            progress: LoadProgress::default(),
        }
    }

    /// Fresh state for a session that is about to request its first page.
    pub(crate) fn loading(session: SessionId, params: FetchParameters) -> Self {
        Self {
            session,
            params: Some(params),
            phase: LoadPhase::Loading,
            is_loading: true,
            ..Self::idle()
        }
    }
}

impl<R> Default for LoadSnapshot<R> {
    fn default() -> Self {
        Self::idle()
    }
}
