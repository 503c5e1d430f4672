//! In-memory collaborators for the Helios resource router
//!
//! Reference implementations of every collaborator trait from
//! `helios-interface`, suitable for development servers and tests:
//!
//! - [`MemoryStore`] - [`Persistence`](helios_interface::Persistence) and
//!   [`History`](helios_interface::History) over versioned, tenant-partitioned maps
//! - [`MemorySearch`] - [`Search`](helios_interface::Search) by scanning a `MemoryStore`
//! - [`AllowAllAuthorization`] - [`Authorization`](helios_interface::Authorization)
//!   that never narrows results
//!
//! Data lives only as long as the process.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use helios_interface::{Authorization, History, Persistence, Search};
//! use helios_memory::{AllowAllAuthorization, MemorySearch, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let persistence: Arc<dyn Persistence> = Arc::new(store.clone());
//! let history: Arc<dyn History> = Arc::new(store.clone());
//! let search: Arc<dyn Search> = Arc::new(MemorySearch::new(store));
//! let authorization: Arc<dyn Authorization> = Arc::new(AllowAllAuthorization::new());
//!
//! assert_eq!(persistence.backend_name(), "memory");
//! # let _ = (history, search, authorization);
//! ```

#![warn(missing_docs)]

mod authorization;
mod config;
mod history;
mod matching;
mod search;
mod store;

pub use authorization::AllowAllAuthorization;
pub use config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MemoryConfig};
pub use search::MemorySearch;
pub use store::MemoryStore;
