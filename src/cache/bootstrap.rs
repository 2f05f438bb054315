//! One-time loading of the persisted manifest
//!
//! The first caller to find the cache unloaded starts the load; everyone who
//! arrives while it runs is queued and released, in arrival order, when it
//! finishes. A missing or unreadable manifest is not fatal: the cache simply
//! starts empty.

use futures::channel::oneshot;
use std::mem;
use std::sync::Arc;
use tracing::{debug, warn};

use super::response_cache::Shared;
use super::state::Bootstrap;

/// Suspends until the manifest has been loaded
pub(super) async fn ensure_ready(shared: &Arc<Shared>) {
    loop {
        let released = {
            let mut state = shared.lock();
            if let Bootstrap::Loaded = state.bootstrap {
                return;
            }
            let (tx, rx) = oneshot::channel();
            if let Bootstrap::Loading(waiters) = &mut state.bootstrap {
                waiters.push(tx);
            } else {
                state.bootstrap = Bootstrap::Loading(vec![tx]);
                // Loaded on its own task so a caller dropping its future
                // cannot strand the queue in `Loading`.
                tokio::spawn(load(shared.clone()));
            }
            rx
        };
        // Cancelled when the load task was torn down; the phase is back to
        // `Unloaded` and the next pass starts a new load.
        let _ = released.await;
    }
}

/// Puts the phase back to `Unloaded` if the load task ends without finishing,
/// dropping the queued senders so their callers retry
struct LoadGuard {
    shared: Arc<Shared>,
    done: bool,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let abandoned = {
            let mut state = self.shared.lock();
            match mem::replace(&mut state.bootstrap, Bootstrap::Unloaded) {
                Bootstrap::Loading(waiters) => waiters,
                other => {
                    state.bootstrap = other;
                    Vec::new()
                }
            }
        };
        warn!(waiters = abandoned.len(), "cache manifest load abandoned");
    }
}

async fn load(shared: Arc<Shared>) {
    let mut guard = LoadGuard {
        shared,
        done: false,
    };
    let loaded = guard.shared.store.load_manifest().await;

    let waiters = {
        let mut state = guard.shared.lock();
        match &loaded {
            Ok(Some(manifest)) => {
                let restored = state.restore(manifest);
                debug!(entries = restored, "cache manifest loaded");
            }
            Ok(None) => debug!("no cache manifest found, starting empty"),
            Err(error) => warn!(%error, "cache manifest unreadable, starting empty"),
        }
        match mem::replace(&mut state.bootstrap, Bootstrap::Loaded) {
            Bootstrap::Loading(waiters) => waiters,
            _ => Vec::new(),
        }
    };
    guard.done = true;

    for waiter in waiters {
        let _ = waiter.send(());
    }
}
