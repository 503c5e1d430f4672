//! OperationOutcome generation.
//!
//! [`OperationsGenerator`] builds the OperationOutcome resources returned by
//! the resource handler (successful delete) and by the REST layer (errors).

use helios_interface::Resource;
use helios_interface::error::{ValidationDetail, ValidationSeverity};
use serde_json::{Map, Value, json};

/// Diagnostics text of the successful delete outcome.
pub const SUCCESSFUL_DELETE_MESSAGE: &str = "Successfully deleted resource";

/// Issue severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Fatal error - processing cannot continue.
    Fatal,
    /// Error - processing has failed.
    Error,
    /// Warning - processing succeeded but with concerns.
    Warning,
    /// Information - informational message.
    Information,
}

impl IssueSeverity {
    /// Returns the FHIR string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Fatal => "fatal",
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Information => "information",
        }
    }
}

impl From<ValidationSeverity> for IssueSeverity {
    fn from(severity: ValidationSeverity) -> Self {
        match severity {
            ValidationSeverity::Error => IssueSeverity::Error,
            ValidationSeverity::Warning => IssueSeverity::Warning,
            ValidationSeverity::Information => IssueSeverity::Information,
        }
    }
}

/// Issue type codes from the FHIR `issue-type` value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    /// Invalid content.
    Invalid,
    /// Structural issue.
    Structure,
    /// Required element missing.
    Required,
    /// Value out of range.
    Value,
    /// Resource not found.
    NotFound,
    /// Resource was deleted.
    Deleted,
    /// Conflict with existing state.
    Conflict,
    /// Not supported.
    NotSupported,
    /// Duplicate resource.
    Duplicate,
    /// Processing error.
    Processing,
    /// Transient error.
    Transient,
    /// Security error.
    Security,
    /// Login required.
    Login,
    /// Caller lacks the rights for the operation.
    Forbidden,
    /// Unexpected internal failure.
    Exception,
    /// Request timed out.
    Timeout,
    /// Informational message.
    Informational,
}

impl IssueType {
    /// Returns the FHIR code string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Invalid => "invalid",
            IssueType::Structure => "structure",
            IssueType::Required => "required",
            IssueType::Value => "value",
            IssueType::NotFound => "not-found",
            IssueType::Deleted => "deleted",
            IssueType::Conflict => "conflict",
            IssueType::NotSupported => "not-supported",
            IssueType::Duplicate => "duplicate",
            IssueType::Processing => "processing",
            IssueType::Transient => "transient",
            IssueType::Security => "security",
            IssueType::Login => "login",
            IssueType::Forbidden => "forbidden",
            IssueType::Exception => "exception",
            IssueType::Timeout => "timeout",
            IssueType::Informational => "informational",
        }
    }
}

/// An issue in an OperationOutcome.
#[derive(Debug, Clone)]
pub struct Issue {
    /// The severity of the issue.
    pub severity: IssueSeverity,
    /// The type/code of the issue.
    pub code: IssueType,
    /// Human-readable description, rendered as `details.text`.
    pub details: Option<String>,
    /// Additional diagnostic information.
    pub diagnostics: Option<String>,
    /// FHIRPath expression for location.
    pub expression: Option<String>,
}

impl Issue {
    /// Creates a new issue.
    pub fn new(severity: IssueSeverity, code: IssueType, details: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            details: Some(details.into()),
            diagnostics: None,
            expression: None,
        }
    }

    /// Creates an error issue.
    pub fn error(code: IssueType, details: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, code, details)
    }

    /// Creates a warning issue.
    pub fn warning(code: IssueType, details: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, code, details)
    }

    /// Creates an information issue.
    pub fn information(code: IssueType, details: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Information, code, details)
    }

    /// Sets the expression (location).
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Sets the diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = Some(diagnostics.into());
        self
    }

    /// Converts to FHIR JSON.
    pub fn to_json(&self) -> Value {
        let mut issue = json!({
            "severity": self.severity.as_str(),
            "code": self.code.as_str(),
        });

        if let Some(details) = &self.details {
            issue["details"] = json!({ "text": details });
        }
        if let Some(diagnostics) = &self.diagnostics {
            issue["diagnostics"] = json!(diagnostics);
        }
        if let Some(expr) = &self.expression {
            issue["expression"] = json!([expr]);
        }

        issue
    }

    fn summary(&self) -> &str {
        self.diagnostics
            .as_deref()
            .or(self.details.as_deref())
            .unwrap_or_default()
    }
}

impl From<&ValidationDetail> for Issue {
    fn from(detail: &ValidationDetail) -> Self {
        Issue::new(detail.severity.into(), IssueType::Invalid, &detail.message)
            .with_expression(&detail.path)
    }
}

/// Stateless builder of OperationOutcome resources.
pub struct OperationsGenerator;

impl OperationsGenerator {
    /// Builds an OperationOutcome carrying `issues` and a generated narrative.
    pub fn generate(issues: &[Issue]) -> Resource {
        let mut elements = Map::new();
        elements.insert(
            "text".to_string(),
            json!({
                "status": "generated",
                "div": narrative(issues),
            }),
        );
        elements.insert(
            "issue".to_string(),
            Value::Array(issues.iter().map(Issue::to_json).collect()),
        );
        Resource::from_elements("OperationOutcome", elements)
    }

    /// The fixed outcome returned after a successful delete.
    pub fn successful_delete_outcome() -> Resource {
        let issue = Issue {
            severity: IssueSeverity::Information,
            code: IssueType::Informational,
            details: None,
            diagnostics: Some(SUCCESSFUL_DELETE_MESSAGE.to_string()),
            expression: None,
        };
        Self::generate(&[issue])
    }

    /// Builds a single-issue error outcome.
    pub fn error_outcome(code: IssueType, message: &str) -> Resource {
        Self::generate(&[Issue::error(code, message)])
    }
}

/// Renders issues as an XHTML table.
fn narrative(issues: &[Issue]) -> String {
    let rows: String = issues
        .iter()
        .map(|issue| {
            format!(
                "<tr><td style=\"font-weight: bold;\">{}</td><td>[{}]</td><td><pre>{}</pre></td></tr>",
                issue.severity.as_str(),
                escape_xhtml(issue.expression.as_deref().unwrap_or_default()),
                escape_xhtml(issue.summary()),
            )
        })
        .collect();

    format!(
        "<div xmlns=\"http://www.w3.org/1999/xhtml\"><h1>Operation Outcome</h1><table border=\"0\">{}</table></div>",
        rows
    )
}

fn escape_xhtml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
