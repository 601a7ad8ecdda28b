use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    #[serde(rename = "communityId")]
    pub community_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "memberCount")]
    pub member_count: Option<i64>,
    #[serde(rename = "iconUrl")]
    pub icon_url: Option<String>,
}

impl Community {
    pub fn display_member_count(&self) -> String {
        match self.member_count {
            Some(count) => format!("{} members", count),
            None => "Unknown".to_string(),
        }
    }
}

/// The caller's membership in a community, as returned by
/// `/console/me/communities`. Carries the profile id used to scope
/// community requests once this community is made active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMembership {
    pub community: Community,
    #[serde(rename = "profileId")]
    pub profile_id: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "joinedAt")]
    pub joined_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_membership() {
        let json = r#"{
            "community": {
                "communityId": "trail-runners",
                "name": "Trail Runners",
                "description": "Everything off-road",
                "memberCount": 1289,
                "iconUrl": null
            },
            "profileId": "p-4481",
            "role": "member",
            "joinedAt": "2025-01-15T08:30:00Z"
        }"#;

        let membership: CommunityMembership =
            serde_json::from_str(json).expect("Failed to parse membership JSON");
        assert_eq!(membership.community.community_id, "trail-runners");
        assert_eq!(membership.profile_id.as_deref(), Some("p-4481"));
        assert_eq!(membership.community.display_member_count(), "1289 members");
    }

    #[test]
    fn test_display_member_count_unknown() {
        let community = Community {
            community_id: "c".to_string(),
            name: "C".to_string(),
            description: None,
            member_count: None,
            icon_url: None,
        };
        assert_eq!(community.display_member_count(), "Unknown");
    }
}
