//! The per-session page loop.
//!
//! One request in flight at a time, pages applied in offset order. Every
//! state write goes through `send_if_modified` and is dropped unless the
//! snapshot still belongs to this session.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use super::events::LoaderEvent;
use super::state::{LoadPhase, LoadSnapshot};
use super::LoaderOptions;
use crate::error::FetchError;
use crate::params::{FetchParameters, PageWindow};
use crate::session::{SessionId, SessionTicket};
use crate::source::PageSource;

pub(super) type StateTx<R> = Arc<watch::Sender<LoadSnapshot<R>>>;

/// Result of applying one successful page to the published state.
pub(super) struct PageUpdate<R> {
    pub(super) loaded: u64,
    pub(super) total: Option<u64>,
    pub(super) has_more: bool,
    pub(super) current_page: u64,
    /// New record list to publish, if this page hits a publish point.
    pub(super) data: Option<Arc<Vec<R>>>,
}

/// Apply a page's progress (and possibly data) if `session` is still current.
pub(super) fn apply_page<R>(
    state: &watch::Sender<LoadSnapshot<R>>,
    session: SessionId,
    update: PageUpdate<R>,
) -> bool {
    state.send_if_modified(|snap| {
        if snap.session != session || !snap.is_loading {
            return false;
        }
        snap.progress.loaded = update.loaded;
        snap.progress.total = update.total;
        snap.progress.has_more = update.has_more;
        snap.progress.current_page = update.current_page;
        if let Some(data) = update.data {
            snap.data = data;
            snap.data_revision += 1;
        }
        if !update.has_more {
            snap.phase = LoadPhase::Completed;
            snap.is_loading = false;
        }
        true
    })
}

/// Record a failure if `session` is still current. Published data is kept.
pub(super) fn apply_failure<R>(
    state: &watch::Sender<LoadSnapshot<R>>,
    session: SessionId,
    error: FetchError,
) -> bool {
    state.send_if_modified(|snap| {
        if snap.session != session || !snap.is_loading {
            return false;
        }
        snap.phase = LoadPhase::Failed;
        snap.is_loading = false;
        snap.error = Some(error);
        true
    })
}

fn emit(events: &broadcast::Sender<LoaderEvent>, event: LoaderEvent) {
    // No subscribers is fine.
    let _ = events.send(event);
}

fn superseded(events: &broadcast::Sender<LoaderEvent>, session: SessionId) {
    tracing::debug!(session, "session superseded");
    emit(events, LoaderEvent::SessionSuperseded { session });
}

/// Drives one session from the first page to completion, failure or supersede.
pub(super) async fn run_session<S: PageSource>(
    source: Arc<S>,
    params: FetchParameters,
    ticket: SessionTicket,
    options: LoaderOptions,
    state: StateTx<S::Record>,
    events: broadcast::Sender<LoaderEvent>,
) {
    let session = ticket.id();
    let mut accumulated: Vec<S::Record> = Vec::new();
    let mut total: Option<u64> = None;
    let mut page: u64 = 0;
    let mut tracker = options.policy.tracker();

    tracing::info!(
        session,
        start = %params.start_time,
        end = %params.end_time,
        batch_size = options.batch_size,
        "starting progressive load"
    );

    loop {
        if ticket.is_cancelled() {
            superseded(&events, session);
            return;
        }

        let window = PageWindow::for_page(page, options.batch_size);
        tracing::debug!(session, page = page + 1, offset = window.offset, "fetching page");

        let result = tokio::select! {
            biased;
            _ = ticket.cancelled() => Err(FetchError::Cancelled),
            r = source.fetch_page(&params, window, ticket.token()) => r,
        };

        let fetched = match result {
            Ok(p) => p,
            Err(FetchError::Cancelled) => {
                superseded(&events, session);
                return;
            }
            Err(error) => {
                let loaded = accumulated.len() as u64;
                if !apply_failure(&state, session, error.clone()) {
                    superseded(&events, session);
                    return;
                }
                tracing::warn!(session, loaded, offset = window.offset, error = %error, "session failed");
                emit(
                    &events,
                    LoaderEvent::SessionFailed {
                        session,
                        loaded,
                        error,
                    },
                );
                return;
            }
        };

        if page == 0 {
            total = fetched.total;
            tracing::info!(session, total = ?total, "total records available");
        }
        let records = fetched.records.len();
        accumulated.extend(fetched.records);
        // An empty page cannot advance the offset usefully; treat it as the end.
        let has_more = fetched.has_more && records > 0;
        page += 1;
        let loaded = accumulated.len() as u64;

        let milestone = tracker.observe(loaded, total);
        let publish = milestone.is_some() || !has_more;
        let data = publish.then(|| Arc::new(accumulated.clone()));

        let applied = apply_page(
            &state,
            session,
            PageUpdate {
                loaded,
                total,
                has_more,
                current_page: page,
                data,
            },
        );
        if !applied {
            superseded(&events, session);
            return;
        }

        tracing::debug!(session, page, records, loaded, total = ?total, "page fetched");
        emit(
            &events,
            LoaderEvent::PageFetched {
                session,
                page,
                offset: window.offset,
                records,
                loaded,
                total,
                has_more,
            },
        );
        if publish {
            tracing::info!(session, loaded, total = ?total, milestone = ?milestone, "data published");
            emit(
                &events,
                LoaderEvent::DataPublished {
                    session,
                    loaded,
                    milestone,
                    complete: !has_more,
                },
            );
        }

        if !has_more {
            tracing::info!(session, loaded, pages = page, "session completed");
            emit(
                &events,
                LoaderEvent::SessionCompleted {
                    session,
                    loaded,
                    pages: page,
                },
            );
            return;
        }

        if !options.page_delay.is_zero() {
            tokio::select! {
                biased;
                _ = ticket.cancelled() => {
                    superseded(&events, session);
                    return;
                }
                _ = tokio::time::sleep(options.page_delay) => {}
            }
        }
    }
}
