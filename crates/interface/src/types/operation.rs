//! FHIR interactions an access decision can be made about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A type- or instance-level FHIR interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeOperation {
    /// Create a new resource.
    Create,
    /// Read the current version.
    Read,
    /// Read a specific version.
    Vread,
    /// Replace the current version.
    Update,
    /// Partially modify the current version.
    Patch,
    /// Delete the resource.
    Delete,
    /// History of every resource of a type.
    HistoryType,
    /// History of one resource.
    HistoryInstance,
    /// Search within a type.
    SearchType,
}

impl TypeOperation {
    /// Returns the FHIR interaction code.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeOperation::Create => "create",
            TypeOperation::Read => "read",
            TypeOperation::Vread => "vread",
            TypeOperation::Update => "update",
            TypeOperation::Patch => "patch",
            TypeOperation::Delete => "delete",
            TypeOperation::HistoryType => "history-type",
            TypeOperation::HistoryInstance => "history-instance",
            TypeOperation::SearchType => "search-type",
        }
    }

    /// Returns `true` for interactions that change stored data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            TypeOperation::Create
                | TypeOperation::Update
                | TypeOperation::Patch
                | TypeOperation::Delete
        )
    }
}

impl fmt::Display for TypeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(TypeOperation::Create),
            "read" => Ok(TypeOperation::Read),
            "vread" => Ok(TypeOperation::Vread),
            "update" => Ok(TypeOperation::Update),
            "patch" => Ok(TypeOperation::Patch),
            "delete" => Ok(TypeOperation::Delete),
            "history-type" => Ok(TypeOperation::HistoryType),
            "history-instance" => Ok(TypeOperation::HistoryInstance),
            "search-type" => Ok(TypeOperation::SearchType),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for op in [
            TypeOperation::Create,
            TypeOperation::Vread,
            TypeOperation::HistoryType,
            TypeOperation::HistoryInstance,
            TypeOperation::SearchType,
        ] {
            assert_eq!(op.as_str().parse::<TypeOperation>().unwrap(), op);
            assert_eq!(
                serde_json::to_value(op).unwrap(),
                serde_json::Value::String(op.to_string())
            );
        }
    }

    #[test]
    fn test_is_write() {
        assert!(TypeOperation::Patch.is_write());
        assert!(!TypeOperation::SearchType.is_write());
        assert!("search".parse::<TypeOperation>().is_err());
    }
}
