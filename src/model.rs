use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Entities
// ============================================================================

/// A subscribed feed.
///
/// Identity is the server-assigned `id`. The entity is replaced wholesale
/// when the server returns an updated copy (e.g. after a folder move); the
/// client never edits individual fields locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub id: String,
    pub title: String,
    /// The RSS feed URL itself.
    pub url: String,
    pub description: Option<String>,
    /// Link to the website behind the feed.
    pub link: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub favicon: Option<String>,
    /// Folder membership; `None` means ungrouped.
    pub folder_id: Option<String>,
}

/// A folder grouping feeds in the sidebar.
///
/// Deleting a folder never deletes its feeds; they fall back to ungrouped.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// A single article.
///
/// Immutable except for `is_read`, which flips locally before the server
/// confirms the change.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub feed_id: String,
    /// Denormalized feed title for display convenience.
    pub feed_title: Option<String>,
    /// Full HTML content, when the server supplies it.
    pub content: Option<String>,
    pub content_snippet: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub is_read: bool,
}

// ============================================================================
// Server Settings
// ============================================================================

/// Server-side application settings.
///
/// These live on the backend and travel as-is over the wire; the client's
/// own durable preference (refresh interval) is handled separately by
/// [`crate::prefs::Preferences`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub auto_cleanup_enabled: bool,
    pub auto_cleanup_days: u32,
    pub refresh_interval_minutes: u32,
}

/// Partial settings update. `None` fields are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_cleanup_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_cleanup_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval_minutes: Option<u32>,
}
