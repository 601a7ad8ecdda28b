use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::info;

/// Maximum length accepted for a community or profile id when serialized
/// into the scope header
const MAX_ID_LENGTH: usize = 64;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("Community id is empty")]
    EmptyCommunityId,

    #[error("Id is not header-safe: {0}")]
    InvalidId(String),

    #[error("No active community to attach a profile to")]
    NoActiveCommunity,
}

/// The active community selection, optionally narrowed to the caller's
/// profile within it. Immutable once constructed; switching replaces the
/// whole value so in-flight requests keep the snapshot they started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityContext {
    pub community_id: String,
    pub profile_id: Option<String>,
}

impl CommunityContext {
    pub fn new(community_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            profile_id: None,
        }
    }

    pub fn with_profile(community_id: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            profile_id: Some(profile_id.into()),
        }
    }

    /// Serialize for the scope header: `<community>` or `<community>/<profile>`.
    ///
    /// Ids normally come straight from the server's community list, but a
    /// malformed one must not produce a malformed header, so the charset is
    /// checked here and the caller decides what omission means.
    pub fn header_value(&self) -> Result<String, ContextError> {
        if self.community_id.is_empty() {
            return Err(ContextError::EmptyCommunityId);
        }
        Self::validate_id(&self.community_id)?;

        match self.profile_id {
            Some(ref profile_id) => {
                Self::validate_id(profile_id)?;
                Ok(format!("{}/{}", self.community_id, profile_id))
            }
            None => Ok(self.community_id.clone()),
        }
    }

    fn validate_id(id: &str) -> Result<(), ContextError> {
        let ok = !id.is_empty()
            && id.len() <= MAX_ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if ok {
            Ok(())
        } else {
            Err(ContextError::InvalidId(id.to_string()))
        }
    }
}

/// Read interface the request authorizer consumes. Implementations must
/// return a consistent snapshot without blocking on other readers.
pub trait CommunityContextProvider: Send + Sync {
    /// The active community context, if one is selected.
    fn current_context(&self) -> Option<Arc<CommunityContext>>;
}

/// The community context store.
///
/// Written only from user actions (switch community, switch profile, leave),
/// which arrive one at a time; read concurrently by every outgoing request.
/// Each write swaps the whole `Arc`, so readers never observe a context with
/// the new community but the old profile. Cloning shares the store.
#[derive(Clone, Default)]
pub struct CommunityContextStore {
    active: Arc<RwLock<Option<Arc<CommunityContext>>>>,
}

impl CommunityContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a community active. Any previous profile selection is dropped:
    /// profiles belong to a single community.
    pub fn switch_community(&self, community_id: impl Into<String>) {
        let context = CommunityContext::new(community_id);
        info!(community_id = %context.community_id, "Switched active community");
        *self.active.write() = Some(Arc::new(context));
    }

    /// Select the caller's profile within the active community.
    pub fn switch_profile(&self, profile_id: impl Into<String>) -> Result<(), ContextError> {
        let mut active = self.active.write();
        let current = active.as_ref().ok_or(ContextError::NoActiveCommunity)?;
        let context =
            CommunityContext::with_profile(current.community_id.clone(), profile_id.into());
        info!(community_id = %context.community_id, "Switched active profile");
        *active = Some(Arc::new(context));
        Ok(())
    }

    /// Drop the selection entirely (leaving a community, or signing out)
    pub fn clear(&self) {
        *self.active.write() = None;
    }

    /// Consistent snapshot of the current selection
    pub fn current(&self) -> Option<Arc<CommunityContext>> {
        self.active.read().clone()
    }

    pub fn community_id(&self) -> Option<String> {
        self.active.read().as_ref().map(|c| c.community_id.clone())
    }
}

impl CommunityContextProvider for CommunityContextStore {
    fn current_context(&self) -> Option<Arc<CommunityContext>> {
        self.current()
    }
}
