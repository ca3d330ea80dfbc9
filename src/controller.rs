//! Async orchestration between the store and the remote data service.
//!
//! The controller owns no reactive state of its own: it dispatches into the
//! [`Store`] and calls the [`RemoteData`] service, coordinating the initial
//! load, a recurring background refresh, the aggregate-view article fan-out,
//! lazy per-feed loads, and the user-initiated mutations.
//!
//! Background work runs in two spawned tasks (the refresh timer and the
//! feed watcher), both held as abortable handles tied to the controller's
//! lifetime. There is no cancellation of in-flight fetches; the debounce
//! window around user mutations is what keeps the timer from clobbering
//! fresh optimistic state.

use crate::api::{ApiError, RemoteData};
use crate::model::{Article, Feed, Settings, SettingsUpdate};
use crate::prefs::{Preferences, PrefsError};
use crate::state::{Action, Selection, Store};
use futures::future::join_all;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// How long after a user mutation the background refresh stays quiet, so a
/// timer tick cannot overwrite state the user just changed.
const MUTATION_DEBOUNCE: Duration = Duration::from_secs(10);

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Mutation Clock
// ============================================================================

/// Monotonic timestamp of the most recent user mutation.
///
/// Plain shared mutable state, deliberately outside the store: the refresh
/// timer reads it on every tick, and routing it through the reducer would
/// wake every subscriber for a value no view renders.
#[derive(Clone, Default)]
struct MutationClock {
    last: Arc<Mutex<Option<Instant>>>,
}

impl MutationClock {
    fn stamp(&self) {
        *lock_unpoisoned(&self.last) = Some(Instant::now());
    }

    fn within(&self, window: Duration) -> bool {
        match *lock_unpoisoned(&self.last) {
            Some(stamped) => stamped.elapsed() < window,
            None => false,
        }
    }
}

// ============================================================================
// Shared Fetch Steps
// ============================================================================

/// Re-fetch feeds and folders as one unit.
///
/// Both requests run concurrently and both must succeed; on either failure
/// nothing is committed and the failure carries that error's message.
/// Returns the fetched feeds on success so callers can decide about article
/// loading without re-reading the store.
async fn refresh_collections<S: RemoteData + ?Sized>(store: &Store, api: &S) -> Option<Vec<Feed>> {
    store.dispatch(Action::InitStart);
    let (feeds, folders) = match tokio::join!(api.get_feeds(), api.get_folders()) {
        (Ok(feeds), Ok(folders)) => (feeds, folders),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Feed collection refresh failed");
            store.dispatch(Action::InitFailure(e.to_string()));
            return None;
        }
    };
    store.dispatch(Action::InitSuccess {
        feeds: feeds.clone(),
        folders,
    });
    Some(feeds)
}

/// Fetch every feed's articles concurrently and publish the union.
///
/// Settle-all: a feed that fails is logged and dropped from the aggregate;
/// it never fails the operation or cancels its siblings.
async fn fan_out_articles<S: RemoteData + ?Sized>(store: &Store, api: &S, feeds: &[Feed]) {
    store.dispatch(Action::LoadAllArticlesStart);

    let fetches = feeds.iter().map(|feed| {
        let feed_id = feed.id.clone();
        async move {
            let result = api.get_articles(&feed_id).await;
            (feed_id, result)
        }
    });

    let mut collected = Vec::new();
    for (feed_id, result) in join_all(fetches).await {
        match result {
            Ok(mut articles) => collected.append(&mut articles),
            Err(e) => {
                tracing::warn!(feed_id = %feed_id, error = %e, "Skipping feed in aggregate load")
            }
        }
    }
    store.dispatch(Action::LoadAllArticlesSuccess(collected));
}

// ============================================================================
// Controller
// ============================================================================

/// Drives the store from user intents, the bootstrap sequence, and the
/// background refresh. Generic over the service so tests can script it.
pub struct Controller<S> {
    store: Store,
    api: Arc<S>,
    prefs: Mutex<Preferences>,
    last_mutation: MutationClock,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    watcher_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: RemoteData + 'static> Controller<S> {
    pub fn new(store: Store, api: S, prefs: Preferences) -> Self {
        Self {
            store,
            api: Arc::new(api),
            prefs: Mutex::new(prefs),
            last_mutation: MutationClock::default(),
            refresh_task: Mutex::new(None),
            watcher_task: Mutex::new(None),
        }
    }

    /// The store this controller dispatches into.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Full activation: initial load, then the reactive watcher and the
    /// refresh timer. The watcher is spawned after bootstrap so the initial
    /// fan-out is not repeated.
    pub async fn start(&self) {
        self.bootstrap().await;
        self.spawn_feed_watcher();
        self.restart_refresh_timer();
    }

    /// Abort background tasks. Also happens on drop; exposed for explicit
    /// teardown in hosts that outlive the controller's usefulness.
    pub fn stop(&self) {
        if let Some(task) = lock_unpoisoned(&self.refresh_task).take() {
            task.abort();
        }
        if let Some(task) = lock_unpoisoned(&self.watcher_task).take() {
            task.abort();
        }
    }

    // ------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------

    /// Initial load: feeds and folders together, then (when the aggregate
    /// view is the selected scope) the per-feed article fan-out. With no
    /// feeds, the aggregate resolves to empty without any article request.
    pub async fn bootstrap(&self) {
        let Some(feeds) = refresh_collections(&self.store, self.api.as_ref()).await else {
            return;
        };
        if self.store.with(|s| s.selected_feed != Selection::AllArticles) {
            return;
        }
        if feeds.is_empty() {
            self.store.dispatch(Action::LoadAllArticlesSuccess(Vec::new()));
        } else {
            fan_out_articles(&self.store, self.api.as_ref(), &feeds).await;
        }
    }

    // ------------------------------------------------------------------
    // Background Tasks
    // ------------------------------------------------------------------

    /// (Re)start the recurring collection refresh using the persisted
    /// interval. An existing timer is cancelled first, so interval changes
    /// take effect immediately.
    pub fn restart_refresh_timer(&self) {
        let period = lock_unpoisoned(&self.prefs).refresh_interval();
        let store = self.store.clone();
        let api = Arc::clone(&self.api);
        let clock = self.last_mutation.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; bootstrap already loaded
            // this data, so wait a full period before the first refresh.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if clock.within(MUTATION_DEBOUNCE) {
                    tracing::debug!("Skipping background refresh inside mutation window");
                    continue;
                }
                refresh_collections(&store, api.as_ref()).await;
            }
        });

        if let Some(old) = lock_unpoisoned(&self.refresh_task).replace(task) {
            old.abort();
        }
    }

    /// Watch the store and re-run the aggregate fan-out whenever the feed
    /// collection changes by value (or the selection lands on the aggregate
    /// view) while feeds are not mid-load. An empty collection resolves the
    /// aggregate to empty without network traffic.
    pub fn spawn_feed_watcher(&self) {
        let mut rx = self.store.subscribe();
        let store = self.store.clone();
        let api = Arc::clone(&self.api);

        let task = tokio::spawn(async move {
            // The state at spawn is the baseline; bootstrap has already
            // fanned out for it.
            let (mut seen_feeds, mut seen_selection) = {
                let snap = rx.borrow_and_update();
                (snap.feeds.clone(), snap.selected_feed.clone())
            };

            while rx.changed().await.is_ok() {
                let snap = rx.borrow_and_update().clone();

                if snap.selected_feed != Selection::AllArticles {
                    seen_feeds = snap.feeds;
                    seen_selection = snap.selected_feed;
                    continue;
                }
                if snap.is_loading_feeds {
                    // Re-evaluate once the collection load settles.
                    continue;
                }

                let selection_changed = snap.selected_feed != seen_selection;
                let feeds_changed = snap.feeds != seen_feeds;
                seen_selection = snap.selected_feed.clone();
                if !feeds_changed && !selection_changed {
                    continue;
                }
                seen_feeds = snap.feeds.clone();

                if snap.feeds.is_empty() {
                    store.dispatch(Action::LoadAllArticlesSuccess(Vec::new()));
                } else {
                    fan_out_articles(&store, api.as_ref(), &snap.feeds).await;
                }
            }
        });

        if let Some(old) = lock_unpoisoned(&self.watcher_task).replace(task) {
            old.abort();
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Select an article scope. A concrete feed whose articles are not yet
    /// cached (and with no per-feed load already in flight) is fetched
    /// lazily; the aggregate view is fed by the watcher instead.
    pub async fn select_feed(&self, selection: Selection) {
        self.store.dispatch(Action::SelectFeed(selection.clone()));

        let Selection::Feed(feed_id) = selection else {
            return;
        };
        let needs_fetch = self.store.with(|s| {
            !s.articles_by_feed.contains_key(&feed_id) && !s.is_loading_feed_articles
        });
        if !needs_fetch {
            return;
        }

        self.store
            .dispatch(Action::LoadFeedArticlesStart(feed_id.clone()));
        match self.api.get_articles(&feed_id).await {
            Ok(articles) => self
                .store
                .dispatch(Action::LoadFeedArticlesSuccess { feed_id, articles }),
            Err(e) => self.store.dispatch(Action::LoadFeedArticlesFailure {
                feed_id,
                error: e.to_string(),
            }),
        }
    }

    /// Open (or close, with `None`) the reading view.
    pub fn select_article(&self, article: Option<Article>) {
        self.store.dispatch(Action::SelectArticle(article));
    }

    /// Mark an article read: the local flag flips immediately and
    /// unconditionally; persistence runs after the fact and a failure only
    /// leaves the server behind until the next full load.
    pub async fn mark_article_read(&self, article_id: &str) {
        self.store
            .dispatch(Action::MarkArticleRead(article_id.to_string()));
        if let Err(e) = self.api.mark_article_as_read(article_id).await {
            tracing::warn!(article_id = %article_id, error = %e, "Failed to persist read state");
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------
    //
    // Add/rename/move return the error so the submitting form can render it
    // inline and stay open; the deletes swallow it (the store's error field
    // is the only surface a delete has).

    pub async fn add_feed(
        &self,
        url: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.last_mutation.stamp();
        self.store.dispatch(Action::AddFeedStart);
        match self.api.add_feed(url, title, folder_id).await {
            Ok(feed) => {
                self.store.dispatch(Action::AddFeedSuccess(feed));
                Ok(())
            }
            Err(e) => {
                self.store.dispatch(Action::AddFeedFailure(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn delete_feed(&self, feed_id: &str) {
        self.last_mutation.stamp();
        self.store.dispatch(Action::DeleteFeedStart);
        match self.api.delete_feed(feed_id).await {
            Ok(()) => self
                .store
                .dispatch(Action::DeleteFeedSuccess(feed_id.to_string())),
            Err(e) => {
                tracing::warn!(feed_id = %feed_id, error = %e, "Feed deletion failed");
                self.store.dispatch(Action::DeleteFeedFailure(e.to_string()));
            }
        }
    }

    pub async fn move_feed_to_folder(
        &self,
        feed_id: &str,
        target_folder_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.last_mutation.stamp();
        self.store.dispatch(Action::MoveFeedStart);
        match self.api.move_feed_to_folder(feed_id, target_folder_id).await {
            Ok(feed) => {
                self.store.dispatch(Action::MoveFeedSuccess(feed));
                Ok(())
            }
            Err(e) => {
                self.store.dispatch(Action::MoveFeedFailure(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn add_folder(&self, name: &str) -> Result<(), ApiError> {
        self.last_mutation.stamp();
        self.store.dispatch(Action::AddFolderStart);
        match self.api.add_folder(name).await {
            Ok(folder) => {
                self.store.dispatch(Action::AddFolderSuccess(folder));
                Ok(())
            }
            Err(e) => {
                self.store.dispatch(Action::AddFolderFailure(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn rename_folder(&self, folder_id: &str, new_name: &str) -> Result<(), ApiError> {
        self.last_mutation.stamp();
        self.store.dispatch(Action::RenameFolderStart);
        match self.api.rename_folder(folder_id, new_name).await {
            Ok(folder) => {
                self.store.dispatch(Action::RenameFolderSuccess(folder));
                Ok(())
            }
            Err(e) => {
                self.store
                    .dispatch(Action::RenameFolderFailure(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn delete_folder(&self, folder_id: &str) {
        self.last_mutation.stamp();
        self.store.dispatch(Action::DeleteFolderStart);
        match self.api.delete_folder(folder_id).await {
            Ok(()) => self
                .store
                .dispatch(Action::DeleteFolderSuccess(folder_id.to_string())),
            Err(e) => {
                tracing::warn!(folder_id = %folder_id, error = %e, "Folder deletion failed");
                self.store
                    .dispatch(Action::DeleteFolderFailure(e.to_string()));
            }
        }
    }

    // ------------------------------------------------------------------
    // Settings and Preferences
    // ------------------------------------------------------------------

    /// Server-side settings, fetched on demand (the settings page owns the
    /// result; nothing in the store mirrors it).
    pub async fn settings(&self) -> Result<Settings, ApiError> {
        self.api.get_settings().await
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, ApiError> {
        self.last_mutation.stamp();
        self.api.update_settings(update).await
    }

    /// Currently configured refresh interval, in minutes.
    pub fn refresh_interval_minutes(&self) -> u64 {
        lock_unpoisoned(&self.prefs).refresh_interval_minutes()
    }

    /// Persist a new refresh interval and reschedule the timer around it.
    pub fn set_refresh_interval(&self, minutes: u64) -> Result<(), PrefsError> {
        lock_unpoisoned(&self.prefs).set_refresh_interval_minutes(minutes)?;
        self.restart_refresh_timer();
        Ok(())
    }
}

impl<S> Drop for Controller<S> {
    fn drop(&mut self) {
        if let Some(task) = lock_unpoisoned(&self.refresh_task).take() {
            task.abort();
        }
        if let Some(task) = lock_unpoisoned(&self.watcher_task).take() {
            task.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
