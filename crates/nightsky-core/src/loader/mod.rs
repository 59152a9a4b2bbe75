//! Progressive loader: pages through a large time-ranged result set in
//! fixed-size batches and publishes incremental state to consumers.
//!
//! Lifecycle: `Idle -> Loading -> (Completed | Failed | Cancelled)`. Changing
//! the parameters while loading supersedes the running session: its token is
//! cancelled (aborting the in-flight request) and its id stops matching the
//! published snapshot, so any late result it produces is discarded.

mod events;
mod milestone;
mod run;
mod state;


use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::config::NightskyConfig;
use crate::params::FetchParameters;
use crate::session::{SessionControl, SessionId};
use crate::source::PageSource;

pub use events::LoaderEvent;
pub use milestone::PublishPolicy;
pub use state::{LoadPhase, LoadProgress, LoadSnapshot};

const EVENT_CAPACITY: usize = 1024;

/// Tuning for a loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Records requested per page.
    pub batch_size: u32,
    /// Pause between pages.
    pub page_delay: Duration,
    pub policy: PublishPolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: 5000,
            page_delay: Duration::from_millis(100),
            policy: PublishPolicy::default(),
        }
    }
}

impl LoaderOptions {
    pub fn from_config(cfg: &NightskyConfig) -> Self {
        Self {
            batch_size: cfg.batch_size,
            page_delay: cfg.page_delay(),
            policy: PublishPolicy::new(cfg.publish_milestones.iter().copied()),
        }
    }
}

/// Owns the load state for one data feed.
///
/// Must be driven from within a Tokio runtime: starting a session spawns its
/// page loop. Dropping the loader cancels the running session.
pub struct ProgressiveLoader<S: PageSource> {
    source: Arc<S>,
    options: LoaderOptions,
    sessions: SessionControl,
    state: run::StateTx<S::Record>,
    events: broadcast::Sender<LoaderEvent>,
    /// Parameters of the session last started, while it is still wanted.
    tracked: Option<FetchParameters>,
    /// Most recent parameters passed in, enabled or not.
    latest: Option<FetchParameters>,
    enabled: bool,
}

impl<S: PageSource> ProgressiveLoader<S> {
    pub fn new(source: S, options: LoaderOptions) -> Self {
        let (state, _) = watch::channel(LoadSnapshot::idle());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source: Arc::new(source),
            options,
            sessions: SessionControl::new(),
            state: Arc::new(state),
            events,
            tracked: None,
            latest: None,
            enabled: true,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Receiver for state snapshots; `changed()` fires on every update.
    pub fn subscribe(&self) -> watch::Receiver<LoadSnapshot<S::Record>> {
        self.state.subscribe()
    }

    /// Receiver for lifecycle events emitted after this call.
    pub fn events(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> LoadSnapshot<S::Record> {
        self.state.borrow().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reactive entry point: feed the latest parameters and enabled flag.
    ///
    /// Starts a session when enabled and `params` differ from the tracked
    /// ones; returns the new session id in that case. Disabling stops a
    /// running session.
    pub fn update(&mut self, params: FetchParameters, enabled: bool) -> Option<SessionId> {
        self.latest = Some(params.clone());
        self.enabled = enabled;
        if !enabled {
            if self.snapshot().is_loading {
                self.cancel();
            }
            return None;
        }
        if self.tracked.as_ref() == Some(&params) {
            return None;
        }
        Some(self.begin(params))
    }

    /// Load `params` (enables the loader). No-op if they are already tracked.
    pub fn start(&mut self, params: FetchParameters) -> Option<SessionId> {
        self.update(params, true)
    }

    /// Enable or disable with the most recent parameters.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<SessionId> {
        match self.latest.clone() {
            Some(params) => self.update(params, enabled),
            None => {
                self.enabled = enabled;
                None
            }
        }
    }

    /// Stop the running session. Already-published data stays visible.
    pub fn cancel(&mut self) {
        let running = self.sessions.current_id();
        let retired = self.sessions.retire();
        self.tracked = None;
        if running.is_none() {
            return;
        }
        self.state.send_if_modified(|snap| {
            if !snap.is_loading {
                return false;
            }
            snap.session = retired;
            snap.phase = LoadPhase::Cancelled;
            snap.is_loading = false;
            true
        });
        tracing::debug!(retired, "load cancelled");
    }

    /// Wait until no session is loading and return the final snapshot.
    pub async fn settled(&self) -> LoadSnapshot<S::Record> {
        let mut rx = self.state.subscribe();
        let snap = match rx.wait_for(|s| !s.is_loading).await {
            Ok(snap) => snap.clone(),
            Err(_) => self.snapshot(),
        };
        snap
    }

    fn begin(&mut self, params: FetchParameters) -> SessionId {
        let previous = self.sessions.current_id();
        let ticket = self.sessions.begin();
        let session = ticket.id();
        self.state
            .send_modify(|snap| *snap = LoadSnapshot::loading(session, params.clone()));
        self.tracked = Some(params.clone());
        if let Some(prev) = previous {
            tracing::debug!(previous = prev, session, "replacing previous session");
        }
        let _ = self.events.send(LoaderEvent::SessionStarted {
            session,
            params: params.clone(),
        });

        tokio::spawn(run::run_session(
            Arc::clone(&self.source),
            params,
            ticket,
            self.options.clone(),
            Arc::clone(&self.state),
            self.events.clone(),
        ));
        session
    }
}

impl<S: PageSource> Drop for ProgressiveLoader<S> {
    fn drop(&mut self) {
        self.sessions.supersede();
    }
}
