use super::action::Action;
use super::app_state::AppState;
use super::reducer::transition;
use std::sync::Arc;
use tokio::sync::watch;

/// The injectable store object.
///
/// Owns the current [`AppState`] behind a `tokio::sync::watch` channel:
/// `dispatch` applies the reducer atomically and broadcasts the new
/// snapshot, `subscribe` hands out receivers for observer-style re-render
/// triggers. Clones share the same underlying state.
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<AppState>>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Apply an action through the reducer and notify subscribers.
    ///
    /// Updates are serialized by the channel, so concurrent dispatches from
    /// different tasks cannot lose each other's transitions.
    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        tracing::trace!(action = name, "dispatch");
        self.tx.send_modify(|state| *state = transition(state, action));
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read from the current state without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Observe state changes. Each `changed().await` wakes once per new
    /// snapshot (coalescing intermediate ones).
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
