//! Campfire client core.
//!
//! This crate is the shared, UI-agnostic core for Campfire clients: the REST
//! API client and its endpoint catalog, session and credential management,
//! the active-community context, request authorization, local caching, and
//! the wire models. Rendering, navigation, and view state live in the
//! consuming shells.
//!
//! The one piece with real design weight is the request authorization layer
//! in [`api::authorizer`]: every outgoing call is classified by path and
//! augmented with the bearer credential and the active-community scope read
//! from the [`auth::Session`] and [`context::CommunityContextStore`] stores.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, RequestAuthorizer};
pub use auth::{CredentialStore, Session, SessionData, SessionVault};
pub use cache::CacheManager;
pub use config::Config;
pub use context::{CommunityContext, CommunityContextStore, ContextError};
