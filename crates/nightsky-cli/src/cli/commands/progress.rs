//! Live progress lines for a progressive load.

use nightsky_core::config::NightskyConfig;
use nightsky_core::loader::{LoadPhase, LoadSnapshot, LoaderOptions, ProgressiveLoader};
use nightsky_core::params::FetchParameters;
use nightsky_core::source::PageSource;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

pub(super) fn loader_options(cfg: &NightskyConfig, batch_size: Option<u32>) -> LoaderOptions {
    let mut options = LoaderOptions::from_config(cfg);
    if let Some(n) = batch_size {
        options.batch_size = n;
    }
    options
}

fn progress_line<R>(label: &str, snap: &LoadSnapshot<R>) -> String {
    let p = &snap.progress;
    match (p.total, p.percent()) {
        (Some(total), Some(pct)) => format!(
            "  {}: {} / {} records ({:.1}%)  page {}",
            label, p.loaded, total, pct, p.current_page
        ),
        _ => format!(
            "  {}: {} records  page {}",
            label, p.loaded, p.current_page
        ),
    }
}

/// Prints at most every 500ms, plus once when the load settles.
fn spawn_progress_printer<R>(
    mut rx: watch::Receiver<LoadSnapshot<R>>,
    label: &'static str,
) -> JoinHandle<()>
where
    R: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while rx.changed().await.is_ok() {
            let (line, loading) = {
                let snap = rx.borrow_and_update();
                (progress_line(label, &*snap), snap.is_loading)
            };
            let now = Instant::now();
            let due = last_print.map_or(true, |t| now.duration_since(t) >= PROGRESS_INTERVAL);
            if due || !loading {
                eprintln!("{}", line);
                last_print = Some(now);
            }
            if !loading {
                break;
            }
        }
    })
}

/// Start `params` on `loader`, print progress until it settles, and return
/// the final snapshot.
pub(super) async fn load_with_progress<S: PageSource>(
    loader: &mut ProgressiveLoader<S>,
    params: FetchParameters,
    label: &'static str,
) -> LoadSnapshot<S::Record> {
    let printer = spawn_progress_printer(loader.subscribe(), label);
    loader.start(params);
    let snap = loader.settled().await;
    let _ = printer.await;
    tracing::info!(
        label,
        phase = ?snap.phase,
        loaded = snap.progress.loaded,
        pages = snap.progress.current_page,
        "load settled"
    );
    snap
}

/// Turn a failed load into an error once partial output is written.
pub(super) fn check_outcome<R>(snap: &LoadSnapshot<R>) -> anyhow::Result<()> {
    match (snap.phase, &snap.error) {
        (LoadPhase::Failed, Some(err)) => anyhow::bail!(
            "load stopped after {} records (status {}): {}",
            snap.progress.loaded,
            err.status(),
            err
        ),
        (LoadPhase::Completed, _) => Ok(()),
        (phase, _) => anyhow::bail!("load ended in unexpected state {:?}", phase),
    }
}
