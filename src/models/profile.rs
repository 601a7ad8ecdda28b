use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a profile holds within its community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CommunityRole {
    #[default]
    Member,
    Moderator,
    Admin,
}

impl std::fmt::Display for CommunityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommunityRole::Member => write!(f, "Member"),
            CommunityRole::Moderator => write!(f, "Moderator"),
            CommunityRole::Admin => write!(f, "Admin"),
        }
    }
}

/// A member profile inside a single community. Profiles are scoped to their
/// community; the same account has a distinct profile in every community it
/// joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub nickname: String,
    pub bio: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: CommunityRole,
    #[serde(rename = "joinedAt")]
    pub joined_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn is_staff(&self) -> bool {
        matches!(self.role, CommunityRole::Moderator | CommunityRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_with_role() {
        let json = r#"{
            "profileId": "p-19",
            "nickname": "ridgeline",
            "bio": null,
            "avatarUrl": "https://cdn.campfire.app/avatars/p-19.webp",
            "role": "moderator",
            "joinedAt": "2024-11-02T19:05:00Z"
        }"#;

        let profile: Profile = serde_json::from_str(json).expect("Failed to parse profile JSON");
        assert_eq!(profile.role, CommunityRole::Moderator);
        assert!(profile.is_staff());
        assert_eq!(profile.role.to_string(), "Moderator");
    }

    #[test]
    fn test_missing_role_defaults_to_member() {
        let json = r#"{"profileId": "p-1", "nickname": "ash"}"#;
        let profile: Profile = serde_json::from_str(json).expect("Failed to parse profile JSON");
        assert_eq!(profile.role, CommunityRole::Member);
        assert!(!profile.is_staff());
    }
}
