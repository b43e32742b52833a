//! Async driver advancing [`PanelLoader`] timelines with tokio timers.
//!
//! Time is read from [`tokio::time::Instant`] so that a paused tokio clock
//! drives the loaders as well.

use std::time::{Duration, Instant};

use futures_util::future::join_all;

use crate::{
    document::Document,
    loader::{LoaderState, PanelLoader},
};

/// Interval between two image status polls while a loader waits on images
pub const IMAGE_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Current instant on the tokio clock
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Ticks `loader` at each of its deadlines until it is idle again.
///
/// Returns immediately if the loader is idle.
pub async fn run_until_idle<D: Document>(loader: &mut PanelLoader<D>) {
    run_until_idle_with(loader, |_| ()).await
}

/// Same as [`run_until_idle`], calling `on_tick` after every tick
pub async fn run_until_idle_with<D, F>(loader: &mut PanelLoader<D>, mut on_tick: F)
where
    D: Document,
    F: FnMut(&PanelLoader<D>),
{
    loop {
        let now = tokio::time::Instant::now();
        let state = loader.tick_at(now.into_std());
        on_tick(loader);
        if state == LoaderState::Idle {
            break;
        }
        let wake_up = match loader.next_deadline() {
            Some(deadline) => tokio::time::Instant::from_std(deadline),
            None => now + IMAGE_POLL_INTERVAL,
        };
        tokio::time::sleep_until(wake_up).await;
    }
}

/// Shows the placeholder then drives the loader until the content is revealed
pub async fn load<D: Document>(loader: &mut PanelLoader<D>) {
    loader.show_at(now());
    run_until_idle(loader).await
}

/// Shows every loader then drives them concurrently, each on its own timeline
pub async fn load_all<D: Document>(loaders: &mut [PanelLoader<D>]) {
    let start = now();
    for loader in loaders.iter_mut() {
        loader.show_at(start);
    }
    run_all(loaders).await
}

/// Drives every loader concurrently until all of them are idle
pub async fn run_all<D: Document>(loaders: &mut [PanelLoader<D>]) {
    join_all(loaders.iter_mut().map(|loader| run_until_idle(loader))).await;
}
