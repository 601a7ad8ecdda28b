use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::relative_age_from_minutes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatThread {
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub title: Option<String>,
    #[serde(rename = "lastMessageAt")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(rename = "unreadCount")]
    pub unread_count: Option<i64>,
}

impl ChatThread {
    pub fn title_display(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("(untitled)")
    }

    /// Humanized time since the last message, for thread lists.
    pub fn last_activity_display(&self) -> String {
        match self.last_message_at {
            Some(at) => relative_age_from_minutes((Utc::now() - at).num_minutes()),
            None => "never".to_string(),
        }
    }

    pub fn has_unread(&self) -> bool {
        self.unread_count.unwrap_or(0) > 0
    }
}

/// Sender summary embedded in messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSender {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub sender: Option<MessageSender>,
    pub body: String,
    #[serde(rename = "sentAt")]
    pub sent_at: Option<DateTime<Utc>>,
}

/// One page of a thread's messages, newest first. `next_cursor` is absent
/// once the beginning of the thread is reached.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// Body for `POST /app/chat/threads/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_thread() {
        let json = r#"{
            "threadId": "t-3",
            "title": "route planning",
            "lastMessageAt": "2025-06-20T06:00:00Z",
            "unreadCount": 2
        }"#;

        let thread: ChatThread = serde_json::from_str(json).expect("Failed to parse thread JSON");
        assert_eq!(thread.title_display(), "route planning");
        assert!(thread.has_unread());
    }

    #[test]
    fn test_thread_display_defaults() {
        let thread = ChatThread {
            thread_id: "t".to_string(),
            title: None,
            last_message_at: None,
            unread_count: None,
        };
        assert_eq!(thread.title_display(), "(untitled)");
        assert_eq!(thread.last_activity_display(), "never");
        assert!(!thread.has_unread());
    }

    #[test]
    fn test_last_activity_display_recent() {
        let thread = ChatThread {
            thread_id: "t".to_string(),
            title: None,
            last_message_at: Some(Utc::now() - Duration::minutes(5)),
            unread_count: None,
        };
        assert_eq!(thread.last_activity_display(), "5m ago");
    }

    #[test]
    fn test_parse_message_page() {
        let json = r#"{
            "messages": [
                {"messageId": "m-1", "sender": {"profileId": "p-2", "nickname": "ash"}, "body": "on my way", "sentAt": null}
            ],
            "nextCursor": null
        }"#;

        let page: MessagePage = serde_json::from_str(json).expect("Failed to parse message page");
        assert_eq!(page.messages.len(), 1);
        assert!(page.next_cursor.is_none());
    }
}
