//! Request and response data shared between the handler and collaborators.

mod filter;
mod identity;
mod operation;
mod patch;
mod query;
mod resource;
mod search_result;

pub use filter::{ComparisonOperator, LogicalOperator, SearchFilter};
pub use identity::UserIdentity;
pub use operation::TypeOperation;
pub use patch::PatchFormat;
pub use query::QueryParams;
pub use resource::Resource;
pub use search_result::{SearchEntry, SearchMode, SearchResult};
