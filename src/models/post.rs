use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::truncate_string;

/// Length of the one-line preview used in feed lists
const PREVIEW_LENGTH: usize = 80;

/// Author summary embedded in posts and comments. A slimmed-down view of
/// the full `Profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub nickname: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "postId")]
    pub post_id: String,
    pub author: Option<PostAuthor>,
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "commentCount")]
    pub comment_count: Option<i64>,
    #[serde(rename = "likeCount")]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub pinned: bool,
}

impl Post {
    /// One-line preview for feed lists: the title when present, otherwise
    /// the truncated body with newlines collapsed.
    pub fn preview(&self) -> String {
        if let Some(ref title) = self.title {
            if !title.is_empty() {
                return truncate_string(title, PREVIEW_LENGTH);
            }
        }
        let flattened = self.body.replace('\n', " ");
        truncate_string(flattened.trim(), PREVIEW_LENGTH)
    }

    pub fn author_nickname(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.nickname.as_str())
            .unwrap_or("unknown")
    }
}

/// One page of the community feed. `next_cursor` is absent on the last page.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "commentId")]
    pub comment_id: String,
    pub author: Option<PostAuthor>,
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /app/posts`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: Option<String>,
    pub body: String,
}

/// Body for `POST /app/posts/{id}/comments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post() {
        let json = r#"{
            "postId": "post-71",
            "author": {"profileId": "p-19", "nickname": "ridgeline", "avatarUrl": null},
            "title": "Saturday group run",
            "body": "Meet at the north trailhead at 7.",
            "createdAt": "2025-06-20T06:00:00Z",
            "commentCount": 4,
            "likeCount": 12,
            "pinned": true
        }"#;

        let post: Post = serde_json::from_str(json).expect("Failed to parse post JSON");
        assert!(post.pinned);
        assert_eq!(post.author_nickname(), "ridgeline");
        assert_eq!(post.preview(), "Saturday group run");
    }

    #[test]
    fn test_preview_truncates_body() {
        let post = Post {
            post_id: "p".to_string(),
            author: None,
            title: None,
            body: "line one\nline two that goes on and on and on and on and on and on and on and on"
                .to_string(),
            created_at: None,
            comment_count: None,
            like_count: None,
            pinned: false,
        };
        let preview = post.preview();
        assert!(preview.len() <= 80);
        assert!(!preview.contains('\n'));
        assert!(preview.ends_with("..."));
        assert_eq!(post.author_nickname(), "unknown");
    }

    #[test]
    fn test_parse_feed_page() {
        let json = r#"{"posts": [{"postId": "a", "body": "hi"}], "nextCursor": "c-2"}"#;
        let page: FeedPage = serde_json::from_str(json).expect("Failed to parse feed page JSON");
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("c-2"));
    }
}
