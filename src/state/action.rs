use super::app_state::{Modal, ModalKind, ReadFilter, Selection, SortOrder, ViewStyle};
use crate::model::{Article, Feed, Folder};

/// The closed set of transitions the store understands.
///
/// Asynchronous operations follow a start/success/failure triple: start sets
/// the relevant loading flag and clears the error, success merges the
/// payload, failure records the message. Failure payloads are plain strings
/// because they are exactly what the UI shows.
#[derive(Debug, Clone)]
pub enum Action {
    // App init: feeds + folders together.
    InitStart,
    InitSuccess {
        feeds: Vec<Feed>,
        folders: Vec<Folder>,
    },
    InitFailure(String),

    // Bulk article load for the aggregate view.
    LoadAllArticlesStart,
    LoadAllArticlesSuccess(Vec<Article>),
    LoadAllArticlesFailure(String),

    // Lazy article load for a single feed.
    LoadFeedArticlesStart(String),
    LoadFeedArticlesSuccess {
        feed_id: String,
        articles: Vec<Article>,
    },
    LoadFeedArticlesFailure {
        feed_id: String,
        error: String,
    },

    // Navigation.
    SelectFeed(Selection),
    SelectArticle(Option<Article>),
    /// Flip `is_read` on every copy of the article the state holds. Applied
    /// before the server confirms; re-applying to a read article changes
    /// nothing.
    MarkArticleRead(String),

    // Feed mutations.
    AddFeedStart,
    AddFeedSuccess(Feed),
    AddFeedFailure(String),
    DeleteFeedStart,
    DeleteFeedSuccess(String),
    DeleteFeedFailure(String),
    MoveFeedStart,
    /// Server-returned feed replaces the local entry wholesale.
    MoveFeedSuccess(Feed),
    MoveFeedFailure(String),

    // Folder mutations.
    AddFolderStart,
    AddFolderSuccess(Folder),
    AddFolderFailure(String),
    RenameFolderStart,
    RenameFolderSuccess(Folder),
    RenameFolderFailure(String),
    DeleteFolderStart,
    DeleteFolderSuccess(String),
    DeleteFolderFailure(String),

    // Modals and full-screen views.
    OpenModal(Modal),
    CloseModal(ModalKind),
    ToggleSettingsView,
    CloseSettingsView,
    ToggleDocsView,
    CloseDocsView,
    ToggleSidebar,

    // View preferences.
    SetSortOrder(SortOrder),
    SetReadFilter(ReadFilter),
    SetViewStyle(ViewStyle),
    SetError(Option<String>),
}

impl Action {
    /// Short name for logging; payloads can be large (full article lists),
    /// so dispatch logs this instead of the `Debug` form.
    pub fn name(&self) -> &'static str {
        match self {
            Action::InitStart => "InitStart",
            Action::InitSuccess { .. } => "InitSuccess",
            Action::InitFailure(_) => "InitFailure",
            Action::LoadAllArticlesStart => "LoadAllArticlesStart",
            Action::LoadAllArticlesSuccess(_) => "LoadAllArticlesSuccess",
            Action::LoadAllArticlesFailure(_) => "LoadAllArticlesFailure",
            Action::LoadFeedArticlesStart(_) => "LoadFeedArticlesStart",
            Action::LoadFeedArticlesSuccess { .. } => "LoadFeedArticlesSuccess",
            Action::LoadFeedArticlesFailure { .. } => "LoadFeedArticlesFailure",
            Action::SelectFeed(_) => "SelectFeed",
            Action::SelectArticle(_) => "SelectArticle",
            Action::MarkArticleRead(_) => "MarkArticleRead",
            Action::AddFeedStart => "AddFeedStart",
            Action::AddFeedSuccess(_) => "AddFeedSuccess",
            Action::AddFeedFailure(_) => "AddFeedFailure",
            Action::DeleteFeedStart => "DeleteFeedStart",
            Action::DeleteFeedSuccess(_) => "DeleteFeedSuccess",
            Action::DeleteFeedFailure(_) => "DeleteFeedFailure",
            Action::MoveFeedStart => "MoveFeedStart",
            Action::MoveFeedSuccess(_) => "MoveFeedSuccess",
            Action::MoveFeedFailure(_) => "MoveFeedFailure",
            Action::AddFolderStart => "AddFolderStart",
            Action::AddFolderSuccess(_) => "AddFolderSuccess",
            Action::AddFolderFailure(_) => "AddFolderFailure",
            Action::RenameFolderStart => "RenameFolderStart",
            Action::RenameFolderSuccess(_) => "RenameFolderSuccess",
            Action::RenameFolderFailure(_) => "RenameFolderFailure",
            Action::DeleteFolderStart => "DeleteFolderStart",
            Action::DeleteFolderSuccess(_) => "DeleteFolderSuccess",
            Action::DeleteFolderFailure(_) => "DeleteFolderFailure",
            Action::OpenModal(_) => "OpenModal",
            Action::CloseModal(_) => "CloseModal",
            Action::ToggleSettingsView => "ToggleSettingsView",
            Action::CloseSettingsView => "CloseSettingsView",
            Action::ToggleDocsView => "ToggleDocsView",
            Action::CloseDocsView => "CloseDocsView",
            Action::ToggleSidebar => "ToggleSidebar",
            Action::SetSortOrder(_) => "SetSortOrder",
            Action::SetReadFilter(_) => "SetReadFilter",
            Action::SetViewStyle(_) => "SetViewStyle",
            Action::SetError(_) => "SetError",
        }
    }
}
