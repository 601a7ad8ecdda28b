//! Active-community context.
//!
//! Campfire scopes most of its API to a single community at a time. This
//! module owns that selection: `CommunityContext` is the immutable value
//! (community plus optional per-community profile) and
//! `CommunityContextStore` is the store the UI drives when the user switches
//! communities or profiles. The request authorizer reads snapshots through
//! `CommunityContextProvider` and never writes back.

pub mod community;

pub use community::{
    CommunityContext, CommunityContextProvider, CommunityContextStore, ContextError,
};
