use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The platform-level signed-in identity, as returned by `/console/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "accountGuid")]
    pub account_guid: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Name to show in account-level UI: display name, falling back to
    /// the username.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}
