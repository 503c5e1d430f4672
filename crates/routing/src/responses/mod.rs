//! Response envelopes and headers.

pub mod headers;
pub mod operation_outcome;

pub use headers::ResourceHeaders;
pub use operation_outcome::{Issue, IssueSeverity, IssueType, OperationsGenerator};
