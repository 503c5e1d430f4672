//! Collaborator traits.
//!
//! The resource handler owns no storage, indexing or access-control logic.
//! It delegates to four collaborators injected at construction:
//!
//! - [`Persistence`] - Create, read, update, patch, version-read and delete
//! - [`Search`] - Type-level search
//! - [`History`] - Type- and instance-level history
//! - [`Authorization`] - Caller identification and search filters
//!
//! Each trait is object-safe and is held as `Arc<dyn Trait>`.

pub mod authorization;
pub mod history;
pub mod persistence;
pub mod search;

pub use authorization::{Authorization, SearchFilterRequest, VerifyAccessTokenRequest};
pub use history::{History, InstanceHistoryRequest, TypeHistoryRequest};
pub use persistence::{
    CreateResourceRequest, DeleteResourceRequest, PatchResourceRequest, Persistence,
    ReadResourceRequest, ResourceResponse, UpdateResourceRequest, VReadResourceRequest,
};
pub use search::{Search, SearchResponse, TypeSearchRequest};
