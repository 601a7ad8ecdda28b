use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification categories the server emits. New server-side kinds parse
/// as `Other` rather than failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Reply,
    Mention,
    Like,
    Follow,
    System,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "notificationId")]
    pub notification_id: String,
    pub kind: NotificationKind,
    pub body: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification() {
        let json = r#"{
            "notificationId": "n-9",
            "kind": "mention",
            "body": "ridgeline mentioned you in Saturday group run",
            "createdAt": "2025-06-21T10:00:00Z",
            "read": false
        }"#;

        let n: Notification = serde_json::from_str(json).expect("Failed to parse notification");
        assert_eq!(n.kind, NotificationKind::Mention);
        assert!(n.is_unread());
    }

    #[test]
    fn test_unknown_kind_parses_as_other() {
        let json = r#"{"notificationId": "n-1", "kind": "communityDigest", "body": "weekly digest"}"#;
        let n: Notification = serde_json::from_str(json).expect("Failed to parse notification");
        assert_eq!(n.kind, NotificationKind::Other);
        assert!(n.is_unread());
    }
}
