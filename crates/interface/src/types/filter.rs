//! Authorization-derived search filters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied between a resource element and a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
}

impl ComparisonOperator {
    /// Returns the operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Ge => ">=",
            ComparisonOperator::Le => "<=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the values of a single filter combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    /// Every value must match.
    And,
    /// At least one value must match.
    #[default]
    Or,
}

/// A constraint narrowing search or history results to what a caller may see.
///
/// Filters are produced by the authorization collaborator and passed to
/// search and history unmodified. Filters in a list combine with AND; the
/// values of one filter combine with its [`LogicalOperator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Dotted path of the element to compare, e.g. `subject.reference`.
    pub key: String,
    /// Values to compare against.
    pub value: Vec<String>,
    /// Comparison applied to each value.
    pub comparison_operator: ComparisonOperator,
    /// How the per-value comparisons combine.
    pub logical_operator: LogicalOperator,
}

impl SearchFilter {
    /// Creates an equality filter matching any of `values`.
    pub fn any_of<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: values.into_iter().map(Into::into).collect(),
            comparison_operator: ComparisonOperator::Eq,
            logical_operator: LogicalOperator::Or,
        }
    }
}
