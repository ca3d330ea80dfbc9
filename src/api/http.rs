//! HTTP implementation of the remote data service.
//!
//! Speaks the backend's JSON protocol under `/api/v1`: snake_case bodies,
//! integer entity ids (stringified client-side), RFC 3339 timestamps.
//! Responses are decoded into wire DTOs and converted to domain entities,
//! keeping serde details out of the rest of the crate.

use super::{ApiError, RemoteData};
use crate::model::{Article, Feed, Folder, Settings, SettingsUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

// ============================================================================
// Wire DTOs
// ============================================================================

/// Entity id as the backend sends it.
///
/// Feeds and articles arrive with integer ids, folders with string ids;
/// accept both everywhere and normalize to `String`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Int(n) => n.to_string(),
            WireId::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedDto {
    id: WireId,
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    last_fetched: Option<String>,
    #[serde(default)]
    favicon: Option<String>,
    #[serde(default)]
    folder_id: Option<WireId>,
}

impl FeedDto {
    fn into_feed(self) -> Feed {
        Feed {
            id: self.id.into_string(),
            title: self.title,
            url: self.url,
            description: self.description,
            link: self.link,
            last_fetched: self.last_fetched.as_deref().and_then(parse_timestamp),
            favicon: self.favicon,
            folder_id: self.folder_id.map(WireId::into_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FolderDto {
    id: WireId,
    name: String,
}

impl FolderDto {
    fn into_folder(self) -> Folder {
        Folder {
            id: self.id.into_string(),
            name: self.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArticleDto {
    id: WireId,
    title: String,
    link: String,
    #[serde(default)]
    pub_date: Option<String>,
    feed_id: WireId,
    #[serde(default)]
    feed_title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_snippet: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    is_read: bool,
}

impl ArticleDto {
    fn into_article(self) -> Article {
        let pub_date = match self.pub_date.as_deref().and_then(parse_timestamp) {
            Some(ts) => ts,
            None => {
                tracing::debug!(article_id = ?self.id, "Article has no parseable pub_date, using epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }
        };
        Article {
            id: self.id.into_string(),
            title: self.title,
            link: self.link,
            pub_date,
            feed_id: self.feed_id.into_string(),
            feed_title: self.feed_title,
            content: self.content,
            content_snippet: self.content_snippet,
            author: self.author,
            image_url: self.image_url,
            is_read: self.is_read,
        }
    }
}

/// Parse an RFC 3339 timestamp, tolerating a missing timezone offset.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Some backends emit naive datetimes; treat those as UTC.
    raw.parse::<chrono::NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Serialize)]
struct AddFeedBody<'a> {
    url: &'a str,
    title: &'a str,
    folder_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FolderNameBody<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MoveFeedBody<'a> {
    target_folder_id: Option<&'a str>,
}

// ============================================================================
// HttpRemoteData
// ============================================================================

/// Production [`RemoteData`] implementation over the backend's REST API.
pub struct HttpRemoteData {
    base: String,
    client: reqwest::Client,
}

impl HttpRemoteData {
    /// Default per-request timeout.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the given API base URL (e.g.
    /// `http://localhost:8000/api/v1`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::Invalid(format!("Invalid API URL: {e}")))?;

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Map a response to an error if the status is non-2xx.
    ///
    /// A 400 whose detail mentions an existing feed becomes
    /// [`ApiError::FeedExists`] so forms can show the friendly message.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let detail = resp.text().await.unwrap_or_default();
        tracing::warn!(
            status = status.as_u16(),
            detail = %detail.chars().take(200).collect::<String>(),
            "API request failed"
        );

        if status.as_u16() == 400 && detail.to_lowercase().contains("already exists") {
            return Err(ApiError::FeedExists);
        }
        Err(ApiError::HttpStatus(status.as_u16()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(Self::check(resp).await?).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(Self::check(resp).await?).await
    }

    /// Send a request whose response body is irrelevant.
    async fn send_unit(&self, req: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteData for HttpRemoteData {
    async fn get_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        let dtos: Vec<FeedDto> = self.get_json("/feeds/").await?;
        Ok(dtos.into_iter().map(FeedDto::into_feed).collect())
    }

    async fn get_folders(&self) -> Result<Vec<Folder>, ApiError> {
        let dtos: Vec<FolderDto> = self.get_json("/folders/").await?;
        Ok(dtos.into_iter().map(FolderDto::into_folder).collect())
    }

    async fn get_articles(&self, feed_id: &str) -> Result<Vec<Article>, ApiError> {
        let dtos: Vec<ArticleDto> = self
            .get_json(&format!("/feeds/{feed_id}/articles/"))
            .await?;
        Ok(dtos.into_iter().map(ArticleDto::into_article).collect())
    }

    async fn add_feed(
        &self,
        url: &str,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<Feed, ApiError> {
        if url.trim().is_empty() {
            return Err(ApiError::Invalid("Feed URL cannot be empty".to_string()));
        }
        if title.trim().is_empty() {
            return Err(ApiError::Invalid("Feed name cannot be empty".to_string()));
        }
        let dto: FeedDto = self
            .send_json(self.client.post(self.endpoint("/feeds/")).json(&AddFeedBody {
                url,
                title,
                folder_id,
            }))
            .await?;
        Ok(dto.into_feed())
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.client.delete(self.endpoint(&format!("/feeds/{feed_id}"))))
            .await
    }

    async fn move_feed_to_folder(
        &self,
        feed_id: &str,
        target_folder_id: Option<&str>,
    ) -> Result<Feed, ApiError> {
        let dto: FeedDto = self
            .send_json(
                self.client
                    .patch(self.endpoint(&format!("/feeds/{feed_id}/move")))
                    .json(&MoveFeedBody { target_folder_id }),
            )
            .await?;
        Ok(dto.into_feed())
    }

    async fn add_folder(&self, name: &str) -> Result<Folder, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Invalid("Folder name cannot be empty".to_string()));
        }
        let dto: FolderDto = self
            .send_json(
                self.client
                    .post(self.endpoint("/folders/"))
                    .json(&FolderNameBody { name }),
            )
            .await?;
        Ok(dto.into_folder())
    }

    async fn rename_folder(&self, folder_id: &str, new_name: &str) -> Result<Folder, ApiError> {
        if new_name.trim().is_empty() {
            return Err(ApiError::Invalid("Folder name cannot be empty".to_string()));
        }
        let dto: FolderDto = self
            .send_json(
                self.client
                    .put(self.endpoint(&format!("/folders/{folder_id}")))
                    .json(&FolderNameBody { name: new_name }),
            )
            .await?;
        Ok(dto.into_folder())
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.client
                .delete(self.endpoint(&format!("/folders/{folder_id}"))),
        )
        .await
    }

    async fn mark_article_as_read(&self, article_id: &str) -> Result<(), ApiError> {
        self.send_unit(
            self.client
                .put(self.endpoint(&format!("/articles/{article_id}/read")))
                .json(&serde_json::json!({})),
        )
        .await
    }

    async fn get_settings(&self) -> Result<Settings, ApiError> {
        self.get_json("/settings/").await
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, ApiError> {
        self.send_json(self.client.put(self.endpoint("/settings/")).json(&update))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_api(server: &MockServer) -> HttpRemoteData {
        HttpRemoteData::new(&format!("{}/api/v1", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_get_feeds_normalizes_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/feeds/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 3,
                    "title": "Example",
                    "url": "https://example.com/feed.xml",
                    "folder_id": 7
                },
                {
                    "id": 4,
                    "title": "Ungrouped",
                    "url": "https://example.org/rss",
                    "folder_id": null
                }
            ])))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let feeds = api.get_feeds().await.unwrap();

        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].id, "3");
        assert_eq!(feeds[0].folder_id.as_deref(), Some("7"));
        assert_eq!(feeds[1].id, "4");
        assert_eq!(feeds[1].folder_id, None);
    }

    #[tokio::test]
    async fn test_get_articles_parses_dates_and_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/feeds/3/articles/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 10,
                    "title": "Hello",
                    "link": "https://example.com/hello",
                    "pub_date": "2024-07-29T12:00:00Z",
                    "feed_id": 3,
                    "is_read": true
                },
                {
                    "id": 11,
                    "title": "No date",
                    "link": "https://example.com/no-date",
                    "pub_date": null,
                    "feed_id": 3
                }
            ])))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let articles = api.get_articles("3").await.unwrap();

        assert_eq!(articles[0].id, "10");
        assert!(articles[0].is_read);
        assert_eq!(articles[0].pub_date.to_rfc3339(), "2024-07-29T12:00:00+00:00");
        // Missing pub_date falls back to epoch rather than failing the batch
        assert!(!articles[1].is_read);
        assert_eq!(articles[1].pub_date, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_add_feed_maps_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/feeds/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "Feed already exists"})),
            )
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api
            .add_feed("https://example.com/feed.xml", "Example", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::FeedExists));
    }

    #[tokio::test]
    async fn test_add_feed_rejects_empty_title_without_request() {
        // No mock mounted: a request would fail loudly with a connect error,
        // so an Invalid error proves validation short-circuited.
        let api = HttpRemoteData::new("http://127.0.0.1:9/api/v1").unwrap();
        let err = api
            .add_feed("https://example.com/feed.xml", "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_rename_folder_sends_name_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/folders/7"))
            .and(body_json(json!({"name": "Reading"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "7", "name": "Reading"})),
            )
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let folder = api.rename_folder("7", "Reading").await.unwrap();
        assert_eq!(folder.id, "7");
        assert_eq!(folder.name, "Reading");
    }

    #[tokio::test]
    async fn test_move_feed_sends_target_folder() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/feeds/3/move"))
            .and(body_json(json!({"target_folder_id": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "title": "Example",
                "url": "https://example.com/feed.xml",
                "folder_id": null
            })))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let feed = api.move_feed_to_folder("3", None).await.unwrap();
        assert_eq!(feed.folder_id, None);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/articles/10/read"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.mark_article_as_read("10").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/settings/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "auto_cleanup_enabled": true,
                "auto_cleanup_days": 28,
                "refresh_interval_minutes": 60
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/settings/"))
            .and(body_json(json!({"refresh_interval_minutes": 15})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auto_cleanup_enabled": true,
                "auto_cleanup_days": 28,
                "refresh_interval_minutes": 15
            })))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let settings = api.get_settings().await.unwrap();
        assert_eq!(settings.refresh_interval_minutes, 60);

        let updated = api
            .update_settings(SettingsUpdate {
                refresh_interval_minutes: Some(15),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.refresh_interval_minutes, 15);
    }
}
