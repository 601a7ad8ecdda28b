//! Request authorization for outgoing API calls.
//!
//! Every request leaving the client passes through here exactly once per
//! attempt. The authorizer takes one snapshot of the session and
//! community-context stores, attaches the bearer credential when one is
//! present, and attaches the active-community scope on community-scoped
//! paths.
//!
//! Absence of either value is a valid state, not an error: requests without
//! a credential go out unauthenticated, scoped requests without a community
//! go out unscoped, and the server is the enforcement point. The only local
//! failure is a context that cannot be serialized into a header, which
//! degrades to omission with a warning. Nothing here ever logs the
//! credential itself.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::auth::CredentialProvider;
use crate::context::{CommunityContext, CommunityContextProvider};

/// Header carrying the serialized active-community scope
pub const COMMUNITY_CONTEXT_HEADER: &str = "x-campfire-community";

/// Path prefix for community-scoped endpoints
const COMMUNITY_SCOPED_PREFIX: &str = "/app/";

/// Whether a path addresses community-scoped data. Account-level paths
/// (`/console/...`) never carry the scope header.
pub fn is_community_scoped(path: &str) -> bool {
    path == "/app" || path.starts_with(COMMUNITY_SCOPED_PREFIX)
}

/// Immutable view of both stores, taken once per request attempt. Requests
/// started before a community switch finish with the values they started
/// with.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub credential: Option<String>,
    pub context: Option<Arc<CommunityContext>>,
}

/// Attach authorization and community-scope headers for a request to `path`.
///
/// Insert semantics make this idempotent: applying the same snapshot to the
/// same header map twice yields an identical result. The function never
/// fails; every degraded case is encoded as header absence.
pub fn apply_auth_headers(snapshot: &AuthSnapshot, path: &str, headers: &mut HeaderMap) {
    if let Some(ref token) = snapshot.credential {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            // Token value stays out of the log line
            Err(_) => warn!(path, "Credential is not representable as a header value"),
        }
    }

    if !is_community_scoped(path) {
        return;
    }

    match snapshot.context {
        Some(ref context) => match context.header_value() {
            Ok(serialized) => match HeaderValue::from_str(&serialized) {
                Ok(value) => {
                    headers.insert(COMMUNITY_CONTEXT_HEADER, value);
                    debug!(path, community_id = %context.community_id, "Attached community scope");
                }
                Err(e) => {
                    warn!(path, error = %e, "Community scope is not representable as a header value");
                }
            },
            Err(e) => warn!(path, error = %e, "Failed to serialize community scope"),
        },
        None => warn!(path, "No active community for a community-scoped path"),
    }
}

/// The per-request authorization stage.
///
/// Stateless apart from the two injected store handles; safe to clone and
/// share across however many requests are in flight.
#[derive(Clone)]
pub struct RequestAuthorizer {
    credentials: Arc<dyn CredentialProvider>,
    context: Arc<dyn CommunityContextProvider>,
}

impl RequestAuthorizer {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        context: Arc<dyn CommunityContextProvider>,
    ) -> Self {
        Self {
            credentials,
            context,
        }
    }

    /// One consistent read of both stores
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            credential: self.credentials.current_credential(),
            context: self.context.current_context(),
        }
    }

    /// Headers to attach to a request for `path`
    pub fn headers_for(&self, path: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        apply_auth_headers(&self.snapshot(), path, &mut headers);
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommunityContextStore;

    fn snapshot(credential: Option<&str>, context: Option<CommunityContext>) -> AuthSnapshot {
        AuthSnapshot {
            credential: credential.map(str::to_string),
            context: context.map(Arc::new),
        }
    }

    fn headers_for(snapshot: &AuthSnapshot, path: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        apply_auth_headers(snapshot, path, &mut headers);
        headers
    }

    #[test]
    fn test_path_classification() {
        assert!(is_community_scoped("/app/posts"));
        assert!(is_community_scoped("/app/chat/threads/t-1/messages"));
        assert!(is_community_scoped("/app"));
        assert!(!is_community_scoped("/console/me"));
        assert!(!is_community_scoped("/console/auth/login"));
        assert!(!is_community_scoped("/application"));
    }

    #[test]
    fn test_unscoped_path_gets_bearer_only() {
        let snap = snapshot(Some("tok123"), None);
        let headers = headers_for(&snap, "/console/me");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(AUTHORIZATION).expect("missing auth"), "Bearer tok123");
        assert!(headers.get(COMMUNITY_CONTEXT_HEADER).is_none());
    }

    #[test]
    fn test_scoped_path_gets_bearer_and_scope() {
        let snap = snapshot(
            Some("tok123"),
            Some(CommunityContext::with_profile("abc", "p1")),
        );
        let headers = headers_for(&snap, "/app/posts");

        assert_eq!(headers.get(AUTHORIZATION).expect("missing auth"), "Bearer tok123");
        assert_eq!(
            headers.get(COMMUNITY_CONTEXT_HEADER).expect("missing scope"),
            "abc/p1"
        );
    }

    #[test]
    fn test_absent_credential_scoped_path_still_scoped() {
        let snap = snapshot(None, Some(CommunityContext::new("abc")));
        let headers = headers_for(&snap, "/app/posts");

        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(
            headers.get(COMMUNITY_CONTEXT_HEADER).expect("missing scope"),
            "abc"
        );
    }

    #[test]
    fn test_absent_context_scoped_path_forwards_unscoped() {
        let snap = snapshot(Some("tok123"), None);
        let headers = headers_for(&snap, "/app/posts");

        assert_eq!(headers.get(AUTHORIZATION).expect("missing auth"), "Bearer tok123");
        assert!(headers.get(COMMUNITY_CONTEXT_HEADER).is_none());
    }

    #[test]
    fn test_unscoped_path_never_scoped() {
        let snap = snapshot(
            Some("tok123"),
            Some(CommunityContext::with_profile("abc", "p1")),
        );
        let headers = headers_for(&snap, "/console/me");

        assert!(headers.get(COMMUNITY_CONTEXT_HEADER).is_none());
    }

    #[test]
    fn test_absent_everything_is_a_valid_state() {
        let headers = headers_for(&AuthSnapshot::default(), "/app/posts");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let snap = snapshot(
            Some("tok123"),
            Some(CommunityContext::with_profile("abc", "p1")),
        );

        let mut once = HeaderMap::new();
        apply_auth_headers(&snap, "/app/posts", &mut once);

        let mut twice = once.clone();
        apply_auth_headers(&snap, "/app/posts", &mut twice);

        assert_eq!(once, twice);
        assert_eq!(twice.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(twice.get_all(COMMUNITY_CONTEXT_HEADER).iter().count(), 1);
    }

    #[test]
    fn test_unserializable_context_omits_header() {
        let snap = snapshot(
            Some("tok123"),
            Some(CommunityContext::new("abc def\n")),
        );
        let headers = headers_for(&snap, "/app/posts");

        // Request still goes out, authenticated but unscoped
        assert_eq!(headers.get(AUTHORIZATION).expect("missing auth"), "Bearer tok123");
        assert!(headers.get(COMMUNITY_CONTEXT_HEADER).is_none());
    }

    #[test]
    fn test_authorizer_reads_live_store_state() {
        let session = crate::auth::Session::new(std::env::temp_dir().join("campfire-authorizer-test"));
        let store = CommunityContextStore::new();
        let authorizer = RequestAuthorizer::new(
            Arc::new(session.clone()),
            Arc::new(store.clone()),
        );

        // Signed out, nothing selected: no headers at all
        assert!(authorizer.headers_for("/app/posts").is_empty());

        session.update(crate::auth::SessionData {
            token: "tok123".to_string(),
            account_guid: "g".to_string(),
            user_id: 1,
            username: "mara".to_string(),
            created_at: chrono::Utc::now(),
        });
        store.switch_community("abc");
        store.switch_profile("p1").expect("profile switch failed");

        let headers = authorizer.headers_for("/app/posts");
        assert_eq!(headers.get(AUTHORIZATION).expect("missing auth"), "Bearer tok123");
        assert_eq!(
            headers.get(COMMUNITY_CONTEXT_HEADER).expect("missing scope"),
            "abc/p1"
        );

        // Logout is visible to the next snapshot immediately
        session.clear().expect("clear failed");
        assert!(authorizer.headers_for("/app/posts").get(AUTHORIZATION).is_none());
    }
}
