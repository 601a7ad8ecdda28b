//! REST API client module for the Campfire services.
//!
//! This module provides the `ApiClient` for communicating with the Campfire
//! API, and the `RequestAuthorizer` every outgoing call passes through.
//!
//! The API uses bearer token authentication obtained through
//! `/console/auth/login`; community-scoped endpoints additionally carry the
//! active-community scope header attached by the authorizer.

pub mod authorizer;
pub mod client;
pub mod error;

pub use authorizer::{apply_auth_headers, AuthSnapshot, RequestAuthorizer};
pub use client::{ApiClient, CommunityOverview};
pub use error::ApiError;
