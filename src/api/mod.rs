//! Remote data service seam.
//!
//! The client core talks to the backend exclusively through the
//! [`RemoteData`] trait, so the orchestration layer can be driven against a
//! scripted implementation in tests. [`HttpRemoteData`] is the production
//! implementation speaking the backend's JSON protocol.

mod http;

pub use http::HttpRemoteData;

use crate::model::{Article, Feed, Folder, Settings, SettingsUpdate};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by the remote data service.
///
/// The `Display` form is the user-facing message: it ends up in
/// `AppState::error` and in inline form errors, so variants are worded for
/// people, not logs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The submitted feed URL is already subscribed (server 400 with an
    /// "already exists" detail).
    #[error("This feed source already exists")]
    FeedExists,

    /// Network-level failure (DNS, connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Network(String),

    /// Non-2xx response from the server.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// The response body could not be decoded.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Client-side validation failed before any request was made.
    #[error("{0}")]
    Invalid(String),
}

// ============================================================================
// Service Contract
// ============================================================================

/// The remote data service contract.
///
/// Each method either returns a value or fails with an [`ApiError`] whose
/// message is suitable for direct display. Implementations must be cheap to
/// share (`&self` methods, `Send + Sync`) because the controller calls them
/// from spawned background tasks.
#[async_trait]
pub trait RemoteData: Send + Sync {
    async fn get_feeds(&self) -> Result<Vec<Feed>, ApiError>;
    async fn get_folders(&self) -> Result<Vec<Folder>, ApiError>;
    async fn get_articles(&self, feed_id: &str) -> Result<Vec<Article>, ApiError>;

    async fn add_feed(
        &self,
        url: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<Feed, ApiError>;
    async fn delete_feed(&self, feed_id: &str) -> Result<(), ApiError>;
    async fn move_feed_to_folder(
        &self,
        feed_id: &str,
        target_folder_id: Option<&str>,
    ) -> Result<Feed, ApiError>;

    async fn add_folder(&self, name: &str) -> Result<Folder, ApiError>;
    async fn rename_folder(&self, folder_id: &str, new_name: &str) -> Result<Folder, ApiError>;
    async fn delete_folder(&self, folder_id: &str) -> Result<(), ApiError>;

    async fn mark_article_as_read(&self, article_id: &str) -> Result<(), ApiError>;

    async fn get_settings(&self) -> Result<Settings, ApiError>;
    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, ApiError>;
}
