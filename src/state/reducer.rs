use super::action::Action;
use super::app_state::{AppState, Modal, ModalKind, ReadFilter, Selection, SortOrder};

/// Apply one action to the state, producing the next state.
///
/// Pure and total: never panics, never touches the outside world. The input
/// state is left untouched; the returned value is a fresh copy with the
/// transition applied, so observers holding the previous snapshot are never
/// surprised.
pub fn transition(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    match action {
        // ------------------------------------------------------------------
        // App init (feeds + folders)
        // ------------------------------------------------------------------
        Action::InitStart => {
            next.is_loading_feeds = true;
            next.is_loading_folders = true;
            next.error = None;
        }
        Action::InitSuccess { feeds, folders } => {
            next.is_loading_feeds = false;
            next.is_loading_folders = false;
            // Drop cached article lists for feeds the server no longer
            // reports, so the cache never outlives its feed.
            next.articles_by_feed
                .retain(|feed_id, _| feeds.iter().any(|f| &f.id == feed_id));
            next.feeds = feeds;
            next.folders = folders;
        }
        Action::InitFailure(message) => {
            next.is_loading_feeds = false;
            next.is_loading_folders = false;
            next.error = Some(message);
        }

        // ------------------------------------------------------------------
        // Bulk article load (aggregate view)
        // ------------------------------------------------------------------
        Action::LoadAllArticlesStart => {
            next.is_loading_all_articles = true;
            next.error = None;
        }
        Action::LoadAllArticlesSuccess(articles) => {
            next.is_loading_all_articles = false;
            next.all_articles = articles;
        }
        Action::LoadAllArticlesFailure(message) => {
            next.is_loading_all_articles = false;
            next.error = Some(message);
            // Stale aggregate data would be worse than none.
            next.all_articles = Vec::new();
        }

        // ------------------------------------------------------------------
        // Per-feed article load
        // ------------------------------------------------------------------
        Action::LoadFeedArticlesStart(_feed_id) => {
            next.is_loading_feed_articles = true;
            next.error = None;
        }
        Action::LoadFeedArticlesSuccess { feed_id, articles } => {
            next.is_loading_feed_articles = false;
            next.articles_by_feed.insert(feed_id, articles);
        }
        Action::LoadFeedArticlesFailure { feed_id, error } => {
            next.is_loading_feed_articles = false;
            next.error = Some(error);
            // An empty entry marks the feed as fetched, preventing an
            // immediate retry loop on reselection.
            next.articles_by_feed.insert(feed_id, Vec::new());
        }

        // ------------------------------------------------------------------
        // Navigation
        // ------------------------------------------------------------------
        Action::SelectFeed(selection) => {
            next.selected_feed = selection;
            next.selected_article = None;
            next.sort_order = SortOrder::default();
            next.read_filter = ReadFilter::default();
        }
        Action::SelectArticle(article) => {
            next.selected_article = article;
        }
        Action::MarkArticleRead(article_id) => {
            for article in &mut next.all_articles {
                if article.id == article_id {
                    article.is_read = true;
                }
            }
            for articles in next.articles_by_feed.values_mut() {
                for article in articles {
                    if article.id == article_id {
                        article.is_read = true;
                    }
                }
            }
            if let Some(selected) = &mut next.selected_article {
                if selected.id == article_id {
                    selected.is_read = true;
                }
            }
        }

        // ------------------------------------------------------------------
        // Feed mutations
        // ------------------------------------------------------------------
        Action::AddFeedStart => {
            next.is_loading_feeds = true;
            next.error = None;
        }
        Action::AddFeedSuccess(feed) => {
            next.is_loading_feeds = false;
            next.selected_feed = Selection::Feed(feed.id.clone());
            next.selected_article = None;
            next.feeds.push(feed);
            if next.modal.kind() == Some(ModalKind::AddFeed) {
                next.modal = Modal::Closed;
            }
        }
        Action::AddFeedFailure(message) => {
            // The add-feed modal stays open; it renders the error inline.
            next.is_loading_feeds = false;
            next.error = Some(message);
        }
        Action::DeleteFeedStart => {
            next.error = None;
        }
        Action::DeleteFeedSuccess(feed_id) => {
            next.feeds.retain(|f| f.id != feed_id);
            next.articles_by_feed.remove(&feed_id);
            next.all_articles.retain(|a| a.feed_id != feed_id);

            let new_selection = match &state.selected_feed {
                Selection::Feed(id) if *id == feed_id => {
                    if next.feeds.is_empty() {
                        Selection::None
                    } else {
                        Selection::AllArticles
                    }
                }
                Selection::AllArticles if next.feeds.is_empty() => Selection::None,
                other => other.clone(),
            };
            if new_selection != state.selected_feed || new_selection == Selection::None {
                next.selected_article = None;
            }
            next.selected_feed = new_selection;
        }
        Action::DeleteFeedFailure(message) => {
            next.error = Some(message);
        }
        Action::MoveFeedStart => {
            next.error = None;
        }
        Action::MoveFeedSuccess(feed) => {
            if let Some(existing) = next.feeds.iter_mut().find(|f| f.id == feed.id) {
                *existing = feed;
            }
            if next.modal.kind() == Some(ModalKind::MoveFeed) {
                next.modal = Modal::Closed;
            }
        }
        Action::MoveFeedFailure(message) => {
            next.error = Some(message);
        }

        // ------------------------------------------------------------------
        // Folder mutations
        // ------------------------------------------------------------------
        Action::AddFolderStart => {
            next.error = None;
        }
        Action::AddFolderSuccess(folder) => {
            next.folders.push(folder);
            if next.modal.kind() == Some(ModalKind::AddFolder) {
                next.modal = Modal::Closed;
            }
        }
        Action::AddFolderFailure(message) => {
            next.error = Some(message);
        }
        Action::RenameFolderStart => {
            next.error = None;
        }
        Action::RenameFolderSuccess(folder) => {
            if let Some(existing) = next.folders.iter_mut().find(|f| f.id == folder.id) {
                *existing = folder;
            }
            if next.modal.kind() == Some(ModalKind::RenameFolder) {
                next.modal = Modal::Closed;
            }
        }
        Action::RenameFolderFailure(message) => {
            next.error = Some(message);
        }
        Action::DeleteFolderStart => {
            next.error = None;
        }
        Action::DeleteFolderSuccess(folder_id) => {
            next.folders.retain(|f| f.id != folder_id);
            // Feeds survive their folder; they just become ungrouped.
            for feed in &mut next.feeds {
                if feed.folder_id.as_deref() == Some(folder_id.as_str()) {
                    feed.folder_id = None;
                }
            }
        }
        Action::DeleteFolderFailure(message) => {
            next.error = Some(message);
        }

        // ------------------------------------------------------------------
        // Modals and full-screen views
        // ------------------------------------------------------------------
        Action::OpenModal(modal) => {
            next.modal = modal;
        }
        Action::CloseModal(kind) => {
            if next.modal.kind() == Some(kind) {
                next.modal = Modal::Closed;
            }
        }
        Action::ToggleSettingsView => {
            let opening = !next.is_settings_view_open;
            next.is_settings_view_open = opening;
            next.is_docs_view_open = false;
            if opening {
                // Entering settings discards the reading view; closing does
                // not bring it back.
                next.selected_article = None;
            }
        }
        Action::CloseSettingsView => {
            next.is_settings_view_open = false;
        }
        Action::ToggleDocsView => {
            let opening = !next.is_docs_view_open;
            next.is_docs_view_open = opening;
            next.is_settings_view_open = false;
            if opening {
                next.selected_article = None;
            }
        }
        Action::CloseDocsView => {
            next.is_docs_view_open = false;
        }
        Action::ToggleSidebar => {
            next.is_sidebar_collapsed = !next.is_sidebar_collapsed;
        }

        // ------------------------------------------------------------------
        // View preferences
        // ------------------------------------------------------------------
        Action::SetSortOrder(order) => {
            next.sort_order = order;
        }
        Action::SetReadFilter(filter) => {
            next.read_filter = filter;
        }
        Action::SetViewStyle(style) => {
            next.view_style = style;
        }
        Action::SetError(message) => {
            next.error = message;
        }
    }
    next
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, Feed, Folder};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn feed(id: &str, folder_id: Option<&str>) -> Feed {
        Feed {
            id: id.to_string(),
            title: format!("Feed {id}"),
            url: format!("https://example.com/{id}/feed.xml"),
            description: None,
            link: None,
            last_fetched: None,
            favicon: None,
            folder_id: folder_id.map(str::to_string),
        }
    }

    fn folder(id: &str, name: &str) -> Folder {
        Folder {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn article(id: &str, feed_id: &str, is_read: bool) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Article {id}"),
            link: format!("https://example.com/{feed_id}/{id}"),
            pub_date: Utc.with_ymd_and_hms(2024, 7, 29, 12, 0, 0).unwrap(),
            feed_id: feed_id.to_string(),
            feed_title: None,
            content: None,
            content_snippet: None,
            author: None,
            image_url: None,
            is_read,
        }
    }

    /// A populated state: two feeds, one folder, cached articles, aggregate
    /// view selected and loaded.
    fn populated() -> AppState {
        let mut state = AppState {
            feeds: vec![feed("1", Some("f1")), feed("2", None)],
            folders: vec![folder("f1", "Tech")],
            all_articles: vec![
                article("a1", "1", false),
                article("a2", "1", true),
                article("a3", "2", false),
            ],
            is_loading_feeds: false,
            is_loading_folders: false,
            ..AppState::default()
        };
        state
            .articles_by_feed
            .insert("1".to_string(), vec![article("a1", "1", false), article("a2", "1", true)]);
        state
            .articles_by_feed
            .insert("2".to_string(), vec![article("a3", "2", false)]);
        state
    }

    // ------------------------------------------------------------------
    // Init
    // ------------------------------------------------------------------

    #[test]
    fn init_start_sets_loading_and_clears_error() {
        let mut state = populated();
        state.error = Some("old".to_string());

        let next = transition(&state, Action::InitStart);

        assert!(next.is_loading_feeds);
        assert!(next.is_loading_folders);
        assert_eq!(next.error, None);
    }

    #[test]
    fn init_success_replaces_collections() {
        let state = AppState::default();
        let next = transition(
            &state,
            Action::InitSuccess {
                feeds: vec![feed("1", None)],
                folders: vec![folder("f1", "Tech")],
            },
        );

        assert!(!next.is_loading_feeds);
        assert!(!next.is_loading_folders);
        assert_eq!(next.feeds.len(), 1);
        assert_eq!(next.folders.len(), 1);
    }

    #[test]
    fn init_success_prunes_cache_of_vanished_feeds() {
        let state = populated();
        // The refresh no longer reports feed "2".
        let next = transition(
            &state,
            Action::InitSuccess {
                feeds: vec![feed("1", Some("f1"))],
                folders: vec![folder("f1", "Tech")],
            },
        );

        assert!(next.articles_by_feed.contains_key("1"));
        assert!(!next.articles_by_feed.contains_key("2"));
    }

    #[test]
    fn init_failure_commits_no_data() {
        let state = AppState::default();
        let next = transition(&state, Action::InitFailure("boom".to_string()));

        assert_eq!(next.feeds, state.feeds);
        assert_eq!(next.folders, state.folders);
        assert!(!next.is_loading_feeds);
        assert!(!next.is_loading_folders);
        assert_eq!(next.error.as_deref(), Some("boom"));
    }

    // ------------------------------------------------------------------
    // Article loads
    // ------------------------------------------------------------------

    #[test]
    fn bulk_load_failure_resets_aggregate() {
        let state = populated();
        let next = transition(&state, Action::LoadAllArticlesFailure("down".to_string()));

        assert!(next.all_articles.is_empty());
        assert!(!next.is_loading_all_articles);
        assert_eq!(next.error.as_deref(), Some("down"));
    }

    #[test]
    fn feed_load_failure_marks_feed_as_fetched_empty() {
        let state = populated();
        let next = transition(
            &state,
            Action::LoadFeedArticlesFailure {
                feed_id: "9".to_string(),
                error: "404".to_string(),
            },
        );

        // Present-but-empty is distinct from absent: the feed was fetched.
        assert_eq!(next.articles_by_feed.get("9").map(Vec::len), Some(0));
        assert_eq!(next.error.as_deref(), Some("404"));
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    #[test]
    fn select_feed_resets_article_sort_and_filter() {
        let mut state = populated();
        state.selected_article = Some(article("a1", "1", false));
        state.sort_order = SortOrder::TitleAsc;
        state.read_filter = ReadFilter::Unread;

        let next = transition(&state, Action::SelectFeed(Selection::Feed("2".to_string())));

        assert_eq!(next.selected_feed, Selection::Feed("2".to_string()));
        assert_eq!(next.selected_article, None);
        assert_eq!(next.sort_order, SortOrder::DateDesc);
        assert_eq!(next.read_filter, ReadFilter::All);
    }

    #[test]
    fn select_article_does_not_touch_read_state() {
        let state = populated();
        let next = transition(
            &state,
            Action::SelectArticle(Some(article("a1", "1", false))),
        );

        assert!(!next.selected_article.as_ref().unwrap().is_read);
        assert_eq!(next.all_articles, state.all_articles);
    }

    // ------------------------------------------------------------------
    // Mark as read
    // ------------------------------------------------------------------

    #[test]
    fn mark_read_mirrors_to_all_copies() {
        let mut state = populated();
        state.selected_article = Some(article("a1", "1", false));

        let next = transition(&state, Action::MarkArticleRead("a1".to_string()));

        assert!(next.all_articles.iter().find(|a| a.id == "a1").unwrap().is_read);
        assert!(next.articles_by_feed["1"].iter().find(|a| a.id == "a1").unwrap().is_read);
        assert!(next.selected_article.unwrap().is_read);
        // Unrelated articles untouched.
        assert!(!next.all_articles.iter().find(|a| a.id == "a3").unwrap().is_read);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let state = populated();
        let once = transition(&state, Action::MarkArticleRead("a1".to_string()));
        let twice = transition(&once, Action::MarkArticleRead("a1".to_string()));
        assert_eq!(once, twice);
    }

    // ------------------------------------------------------------------
    // Feed mutations
    // ------------------------------------------------------------------

    #[test]
    fn add_feed_success_selects_new_feed_and_closes_modal() {
        let mut state = populated();
        state.selected_feed = Selection::Feed("1".to_string());
        state.modal = Modal::AddFeed;

        let next = transition(&state, Action::AddFeedSuccess(feed("42", None)));

        assert_eq!(next.selected_feed, Selection::Feed("42".to_string()));
        assert_eq!(next.selected_article, None);
        assert!(next.feeds.iter().any(|f| f.id == "42"));
        assert_eq!(next.modal, Modal::Closed);
    }

    #[test]
    fn add_feed_failure_keeps_modal_open() {
        let mut state = populated();
        state.modal = Modal::AddFeed;

        let next = transition(&state, Action::AddFeedFailure("exists".to_string()));

        assert_eq!(next.modal, Modal::AddFeed);
        assert_eq!(next.error.as_deref(), Some("exists"));
    }

    #[test]
    fn delete_feed_cascades_to_articles() {
        let state = populated();
        let next = transition(&state, Action::DeleteFeedSuccess("1".to_string()));

        assert!(!next.feeds.iter().any(|f| f.id == "1"));
        assert!(!next.articles_by_feed.contains_key("1"));
        assert!(next.all_articles.iter().all(|a| a.feed_id != "1"));
        // Other feeds' articles survive.
        assert!(next.articles_by_feed.contains_key("2"));
    }

    #[test]
    fn delete_selected_feed_falls_back_to_aggregate() {
        let mut state = populated();
        state.selected_feed = Selection::Feed("1".to_string());
        state.selected_article = Some(article("a1", "1", false));

        let next = transition(&state, Action::DeleteFeedSuccess("1".to_string()));

        assert_eq!(next.selected_feed, Selection::AllArticles);
        assert_eq!(next.selected_article, None);
    }

    #[test]
    fn delete_last_feed_clears_selection() {
        let mut state = populated();
        state.feeds = vec![feed("7", None)];
        state.selected_feed = Selection::Feed("7".to_string());

        let next = transition(&state, Action::DeleteFeedSuccess("7".to_string()));

        assert_eq!(next.selected_feed, Selection::None);
        assert_eq!(next.selected_article, None);
    }

    #[test]
    fn delete_last_feed_under_aggregate_view_clears_selection() {
        let mut state = populated();
        state.feeds = vec![feed("7", None)];
        state.selected_feed = Selection::AllArticles;

        let next = transition(&state, Action::DeleteFeedSuccess("7".to_string()));

        assert_eq!(next.selected_feed, Selection::None);
    }

    #[test]
    fn delete_unselected_feed_keeps_selection_and_article() {
        let mut state = populated();
        state.selected_feed = Selection::AllArticles;
        state.selected_article = Some(article("a1", "1", false));

        let next = transition(&state, Action::DeleteFeedSuccess("2".to_string()));

        assert_eq!(next.selected_feed, Selection::AllArticles);
        assert!(next.selected_article.is_some());
    }

    #[test]
    fn move_feed_replaces_entry_wholesale_and_closes_modal() {
        let mut state = populated();
        state.modal = Modal::MoveFeed(feed("1", Some("f1")));

        let next = transition(&state, Action::MoveFeedSuccess(feed("1", None)));

        assert_eq!(
            next.feeds.iter().find(|f| f.id == "1").unwrap().folder_id,
            None
        );
        assert_eq!(next.modal, Modal::Closed);
        assert_eq!(next.feeds.len(), state.feeds.len());
    }

    // ------------------------------------------------------------------
    // Folder mutations
    // ------------------------------------------------------------------

    #[test]
    fn add_folder_success_appends_and_closes_modal() {
        let mut state = populated();
        state.modal = Modal::AddFolder;

        let next = transition(&state, Action::AddFolderSuccess(folder("f2", "News")));

        assert!(next.folders.iter().any(|f| f.id == "f2"));
        assert_eq!(next.modal, Modal::Closed);
    }

    #[test]
    fn rename_folder_replaces_entry() {
        let mut state = populated();
        state.modal = Modal::RenameFolder(folder("f1", "Tech"));

        let next = transition(&state, Action::RenameFolderSuccess(folder("f1", "Technology")));

        assert_eq!(next.folders[0].name, "Technology");
        assert_eq!(next.modal, Modal::Closed);
    }

    #[test]
    fn delete_folder_ungroups_feeds_without_deleting_them() {
        let state = populated();
        let next = transition(&state, Action::DeleteFolderSuccess("f1".to_string()));

        assert!(next.folders.is_empty());
        assert_eq!(next.feeds.len(), state.feeds.len());
        assert!(next.feeds.iter().all(|f| f.folder_id.is_none()));
    }

    // ------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------

    #[test]
    fn opening_a_modal_replaces_the_previous_one() {
        let state = populated();
        let with_move = transition(
            &state,
            Action::OpenModal(Modal::MoveFeed(feed("1", Some("f1")))),
        );
        let with_folder = transition(&with_move, Action::OpenModal(Modal::AddFolder));

        assert_eq!(with_folder.modal, Modal::AddFolder);
        assert!(!matches!(with_folder.modal, Modal::MoveFeed(_)));
    }

    #[test]
    fn closing_a_non_active_modal_is_a_no_op() {
        let mut state = populated();
        state.modal = Modal::AddFolder;

        let next = transition(&state, Action::CloseModal(ModalKind::AddFeed));

        assert_eq!(next.modal, Modal::AddFolder);
    }

    #[test]
    fn closing_the_active_modal_closes_it() {
        let mut state = populated();
        state.modal = Modal::RenameFolder(folder("f1", "Tech"));

        let next = transition(&state, Action::CloseModal(ModalKind::RenameFolder));

        assert_eq!(next.modal, Modal::Closed);
    }

    // ------------------------------------------------------------------
    // Full-screen views
    // ------------------------------------------------------------------

    #[test]
    fn opening_settings_clears_reading_view() {
        let mut state = populated();
        state.selected_article = Some(article("a1", "1", false));

        let next = transition(&state, Action::ToggleSettingsView);

        assert!(next.is_settings_view_open);
        assert_eq!(next.selected_article, None);
    }

    #[test]
    fn closing_settings_does_not_restore_article() {
        let mut state = populated();
        state.is_settings_view_open = true;
        state.selected_article = Some(article("a1", "1", false));

        let next = transition(&state, Action::ToggleSettingsView);

        assert!(!next.is_settings_view_open);
        // Closing leaves whatever selection existed; it does not clear it.
        assert!(next.selected_article.is_some());
    }

    #[test]
    fn settings_and_docs_views_are_mutually_exclusive() {
        let mut state = populated();
        state.is_settings_view_open = true;

        let next = transition(&state, Action::ToggleDocsView);

        assert!(next.is_docs_view_open);
        assert!(!next.is_settings_view_open);
    }

    // ------------------------------------------------------------------
    // View preferences
    // ------------------------------------------------------------------

    #[test]
    fn preference_setters_replace_fields_only() {
        let state = populated();

        let next = transition(&state, Action::SetSortOrder(SortOrder::TitleDesc));
        assert_eq!(next.sort_order, SortOrder::TitleDesc);

        let next = transition(&next, Action::SetReadFilter(ReadFilter::Read));
        assert_eq!(next.read_filter, ReadFilter::Read);

        let next = transition(&next, Action::ToggleSidebar);
        assert!(next.is_sidebar_collapsed);

        let next = transition(&next, Action::SetError(Some("oops".to_string())));
        assert_eq!(next.error.as_deref(), Some("oops"));
    }
}
