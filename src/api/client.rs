//! API client for communicating with the Campfire REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests: account-level operations under `/console/` and
//! community-scoped operations under `/app/`. Every request takes its
//! headers from the injected `RequestAuthorizer`.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::try_join3;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionData;
use crate::models::{
    Account, ChatMessage, ChatThread, Comment, CommunityMembership, FeedPage, MessagePage,
    NewComment, NewMessage, NewPost, Notification, Post, Profile,
};

use super::authorizer::RequestAuthorizer;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Campfire API
const API_BASE_URL: &str = "https://api.campfire.app";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// 1 second is polite to the server while not making users wait too long.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Feed page size. 25 posts fills a screen with headroom for fast scrolling.
const FEED_PAGE_SIZE: u32 = 25;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "accountGuid")]
    account_guid: String,
    account: LoginAccount,
}

#[derive(Debug, Deserialize)]
struct LoginAccount {
    #[serde(rename = "userId")]
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
}

/// Everything a community screen needs on first paint
#[derive(Debug, Clone)]
pub struct CommunityOverview {
    pub feed: FeedPage,
    pub members: Vec<Profile>,
    pub profile: Profile,
}

/// API client for Campfire.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    authorizer: RequestAuthorizer,
}

impl ApiClient {
    /// Create a new API client around the given request authorizer
    pub fn new(authorizer: RequestAuthorizer) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, authorizer })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", API_BASE_URL, path)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get_response(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .get(self.url(path))
                .headers(self.authorizer.headers_for(path));
            if !query.is_empty() {
                request = request.query(query);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", path))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(path, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get_response(path, &[]).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self.get_response(path, query).await?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", path))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .post(self.url(path))
                .headers(self.authorizer.headers_for(path))
                .json(body)
                .send()
                .await
                .with_context(|| format!("Failed to send POST request to {}", path))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", path));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(path, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    // ===== Account Operations =====

    /// Authenticate and return session data. Goes through the authorizer
    /// like every other call; with no credential present the login request
    /// simply goes out unauthenticated.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionData> {
        let path = "/console/auth/login";
        let response = self
            .client
            .post(self.url(path))
            .headers(self.authorizer.headers_for(path))
            .header(header::ACCEPT, "application/json; version=2")
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        Ok(SessionData {
            token: login.token,
            account_guid: login.account_guid,
            user_id: login.account.user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Exchange the current token for a fresh one before it expires
    pub async fn refresh_session(&self, current: &SessionData) -> Result<SessionData> {
        let refreshed: RefreshResponse = self
            .post("/console/auth/refresh", &serde_json::json!({}))
            .await?;

        debug!(username = %current.username, "Session token refreshed");

        Ok(SessionData {
            token: refreshed.token,
            created_at: Utc::now(),
            ..current.clone()
        })
    }

    /// Fetch the signed-in account
    pub async fn fetch_me(&self) -> Result<Account> {
        self.get("/console/me").await
    }

    /// Fetch the caller's community memberships
    pub async fn fetch_memberships(&self) -> Result<Vec<CommunityMembership>> {
        let text = self.get_text("/console/me/communities", &[]).await?;
        parse_list(&text, "memberships")
    }

    // ===== Community-Scoped Operations =====

    /// Fetch one page of the active community's feed
    pub async fn fetch_feed(&self, cursor: Option<&str>) -> Result<FeedPage> {
        let mut query = vec![("limit", FEED_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("before", cursor.to_string()));
        }

        let text = self.get_text("/app/posts", &query).await?;
        parse_feed(&text)
    }

    /// Create a post in the active community
    pub async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.post("/app/posts", post).await
    }

    /// Fetch a single post
    pub async fn fetch_post(&self, post_id: &str) -> Result<Post> {
        self.get(&format!("/app/posts/{}", post_id)).await
    }

    /// Fetch the comments on a post
    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let text = self
            .get_text(&format!("/app/posts/{}/comments", post_id), &[])
            .await?;
        parse_list(&text, "comments")
    }

    /// Add a comment to a post
    pub async fn add_comment(&self, post_id: &str, comment: &NewComment) -> Result<Comment> {
        self.post(&format!("/app/posts/{}/comments", post_id), comment)
            .await
    }

    /// Fetch the member profiles of the active community
    pub async fn fetch_members(&self) -> Result<Vec<Profile>> {
        let text = self.get_text("/app/members", &[]).await?;
        parse_list(&text, "members")
    }

    /// Fetch the caller's profile in the active community
    pub async fn fetch_my_profile(&self) -> Result<Profile> {
        self.get("/app/profile").await
    }

    /// Fetch notifications for the active community
    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        let text = self.get_text("/app/notifications", &[]).await?;
        parse_list(&text, "notifications")
    }

    /// Fetch the chat threads of the active community
    pub async fn fetch_threads(&self) -> Result<Vec<ChatThread>> {
        let text = self.get_text("/app/chat/threads", &[]).await?;
        parse_list(&text, "threads")
    }

    /// Fetch one page of a thread's messages, newest first
    pub async fn fetch_messages(
        &self,
        thread_id: &str,
        cursor: Option<&str>,
    ) -> Result<MessagePage> {
        let mut query = Vec::new();
        if let Some(cursor) = cursor {
            query.push(("before", cursor.to_string()));
        }

        let text = self
            .get_text(&format!("/app/chat/threads/{}/messages", thread_id), &query)
            .await?;
        serde_json::from_str(&text).context("Failed to parse messages response")
    }

    /// Send a message to a thread
    pub async fn send_message(&self, thread_id: &str, message: &NewMessage) -> Result<ChatMessage> {
        self.post(&format!("/app/chat/threads/{}/messages", thread_id), message)
            .await
    }

    /// Fetch everything a community screen needs on first paint. The three
    /// requests run concurrently; each snapshots the stores independently.
    pub async fn fetch_community_overview(&self) -> Result<CommunityOverview> {
        let (feed, members, profile) = try_join3(
            self.fetch_feed(None),
            self.fetch_members(),
            self.fetch_my_profile(),
        )
        .await?;

        Ok(CommunityOverview {
            feed,
            members,
            profile,
        })
    }
}

/// Parse a list endpoint body. The backend returns some lists bare and some
/// wrapped in a keyed object, so try the array first and fall back to the
/// known wrapper keys.
fn parse_list<T: DeserializeOwned>(text: &str, what: &str) -> Result<Vec<T>> {
    if let Ok(items) = serde_json::from_str::<Vec<T>>(text) {
        return Ok(items);
    }

    #[derive(Deserialize)]
    #[serde(bound(deserialize = "T: DeserializeOwned"))]
    struct Wrapper<T> {
        #[serde(
            default,
            alias = "communities",
            alias = "members",
            alias = "comments",
            alias = "notifications",
            alias = "threads"
        )]
        items: Vec<T>,
        #[serde(default)]
        data: Vec<T>,
    }

    let wrapper: Wrapper<T> = serde_json::from_str(text)
        .with_context(|| format!("Failed to parse {} response", what))?;

    if !wrapper.items.is_empty() {
        Ok(wrapper.items)
    } else {
        Ok(wrapper.data)
    }
}

/// Parse the feed body: a page object in current deployments, a bare post
/// array from older ones.
fn parse_feed(text: &str) -> Result<FeedPage> {
    if let Ok(page) = serde_json::from_str::<FeedPage>(text) {
        return Ok(page);
    }

    let posts: Vec<Post> =
        serde_json::from_str(text).context("Failed to parse feed response")?;
    Ok(FeedPage {
        posts,
        next_cursor: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "token": "tok123",
            "accountGuid": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "account": {"userId": 48211, "status": "active"}
        }"#;

        let login: LoginResponse =
            serde_json::from_str(json).expect("Failed to parse login test JSON");
        assert_eq!(login.token, "tok123");
        assert_eq!(login.account.user_id, 48211);
    }

    #[test]
    fn test_parse_feed_page_object() {
        let json = r#"{"posts": [{"postId": "a", "body": "hi"}], "nextCursor": "c-2"}"#;
        let page = parse_feed(json).expect("Failed to parse feed page");
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("c-2"));
    }

    #[test]
    fn test_parse_feed_bare_array() {
        let json = r#"[{"postId": "a", "body": "hi"}, {"postId": "b", "body": "yo"}]"#;
        let page = parse_feed(json).expect("Failed to parse bare feed");
        assert_eq!(page.posts.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_parse_list_bare_and_wrapped() {
        let bare = r#"[{"threadId": "t-1"}]"#;
        let threads: Vec<ChatThread> =
            parse_list(bare, "threads").expect("Failed to parse bare list");
        assert_eq!(threads.len(), 1);

        let wrapped = r#"{"threads": [{"threadId": "t-1"}, {"threadId": "t-2"}]}"#;
        let threads: Vec<ChatThread> =
            parse_list(wrapped, "threads").expect("Failed to parse wrapped list");
        assert_eq!(threads.len(), 2);

        let data = r#"{"data": [{"threadId": "t-3"}]}"#;
        let threads: Vec<ChatThread> =
            parse_list(data, "threads").expect("Failed to parse data-wrapped list");
        assert_eq!(threads[0].thread_id, "t-3");
    }

    #[test]
    fn test_parse_list_rejects_garbage() {
        assert!(parse_list::<ChatThread>("not json", "threads").is_err());
    }
}
