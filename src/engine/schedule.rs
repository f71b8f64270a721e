//! Periodic runs with a single shutdown listener.
//!
//! The shutdown future is created once and polled both while waiting for the
//! next tick and while a run is in progress, so a signal arriving mid-run is
//! never missed.

use std::future::Future;
use std::time::Duration;

use log::info;

/// Run `run` on every tick of `interval` until `shutdown` resolves.
///
/// The first run starts immediately. A run in progress when `shutdown`
/// resolves is dropped at its next await point.
pub async fn run_periodically<S, R, Fut>(interval: Duration, shutdown: S, mut run: R)
where
    S: Future<Output = ()>,
    R: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!(target: "webwatcher::engine", "Shutdown requested between runs");
                return;
            }
            _ = ticker.tick() => {}
        }

        tokio::select! {
            () = &mut shutdown => {
                info!(target: "webwatcher::engine", "Shutdown requested during a run, abandoning it");
                return;
            }
            () = run() => {}
        }
    }
}
