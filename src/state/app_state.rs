use crate::model::{Article, Feed, Folder};
use std::collections::HashMap;

// ============================================================================
// Selection and Modal
// ============================================================================

/// Which article scope the main pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Nothing selected (e.g. the last feed was just deleted).
    None,
    /// The aggregate view across every subscribed feed.
    AllArticles,
    /// A single feed, by id.
    Feed(String),
}

impl Selection {
    /// Id of the selected concrete feed, if any.
    pub fn feed_id(&self) -> Option<&str> {
        match self {
            Selection::Feed(id) => Some(id),
            _ => None,
        }
    }
}

/// The currently open modal dialog.
///
/// A single enum rather than one optional field per dialog: opening a modal
/// replaces whatever was open before, so two dialogs can never show at once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    Closed,
    AddFeed,
    AddFolder,
    /// Renaming this folder.
    RenameFolder(Folder),
    /// Moving this feed to another folder.
    MoveFeed(Feed),
}

impl Modal {
    /// Discriminant of the open modal, or `None` when closed.
    pub fn kind(&self) -> Option<ModalKind> {
        match self {
            Modal::Closed => None,
            Modal::AddFeed => Some(ModalKind::AddFeed),
            Modal::AddFolder => Some(ModalKind::AddFolder),
            Modal::RenameFolder(_) => Some(ModalKind::RenameFolder),
            Modal::MoveFeed(_) => Some(ModalKind::MoveFeed),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }
}

/// Field-less modal discriminant, used by close requests: closing a dialog
/// that is no longer the open one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    AddFeed,
    AddFolder,
    RenameFolder,
    MoveFeed,
}

// ============================================================================
// View Preferences
// ============================================================================

/// Article list ordering. Ties keep their input order (stable sort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

/// Read-state filter over the article list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

/// Article list presentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStyle {
    #[default]
    List,
    Card,
}

// ============================================================================
// Application State
// ============================================================================

/// The single source of truth for the client.
///
/// Owned exclusively by [`crate::state::Store`]; every change goes through
/// [`crate::state::transition`], which returns a fresh value instead of
/// mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Full feed collection, unique by id, in server order.
    pub feeds: Vec<Feed>,
    /// Full folder collection, unique by id, in server order.
    pub folders: Vec<Folder>,
    /// Lazily populated per-feed article cache. A missing key means "not yet
    /// fetched"; an empty list means "fetched, empty".
    pub articles_by_feed: HashMap<String, Vec<Article>>,
    /// Materialized union across all feeds, for the aggregate view.
    pub all_articles: Vec<Article>,

    pub selected_feed: Selection,
    /// Drill-in to the reading view. Cleared when the selection changes or a
    /// full-screen view (settings, docs) opens.
    pub selected_article: Option<Article>,

    // Independent loading flags: several fetch categories can overlap, so a
    // single enum would lose information.
    pub is_loading_feeds: bool,
    pub is_loading_folders: bool,
    pub is_loading_feed_articles: bool,
    pub is_loading_all_articles: bool,

    /// Last surfaced error message, cleared at the start of each operation.
    pub error: Option<String>,

    pub modal: Modal,

    pub is_settings_view_open: bool,
    pub is_docs_view_open: bool,
    pub is_sidebar_collapsed: bool,

    pub sort_order: SortOrder,
    pub read_filter: ReadFilter,
    pub view_style: ViewStyle,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            folders: Vec::new(),
            articles_by_feed: HashMap::new(),
            all_articles: Vec::new(),
            // The aggregate view is selected before anything loads, so the
            // first successful load lands directly in the default view.
            selected_feed: Selection::AllArticles,
            selected_article: None,
            is_loading_feeds: true,
            is_loading_folders: true,
            is_loading_feed_articles: false,
            is_loading_all_articles: false,
            error: None,
            modal: Modal::Closed,
            is_settings_view_open: false,
            is_docs_view_open: false,
            is_sidebar_collapsed: false,
            sort_order: SortOrder::default(),
            read_filter: ReadFilter::default(),
            view_style: ViewStyle::default(),
        }
    }
}
