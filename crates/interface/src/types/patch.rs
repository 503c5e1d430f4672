//! Patch documents.

use serde_json::Value;

/// A patch document together with its format.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchFormat {
    /// JSON Patch (RFC 6902): an array of operations.
    JsonPatch(Value),
    /// JSON Merge Patch (RFC 7386): a partial document.
    MergePatch(Value),
}

impl PatchFormat {
    /// Returns the media type of this patch format.
    pub fn content_type(&self) -> &'static str {
        match self {
            PatchFormat::JsonPatch(_) => "application/json-patch+json",
            PatchFormat::MergePatch(_) => "application/merge-patch+json",
        }
    }

    /// Returns the patch document.
    pub fn document(&self) -> &Value {
        match self {
            PatchFormat::JsonPatch(doc) | PatchFormat::MergePatch(doc) => doc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_types() {
        let json_patch = PatchFormat::JsonPatch(json!([]));
        let merge = PatchFormat::MergePatch(json!({"active": false}));
        assert_eq!(json_patch.content_type(), "application/json-patch+json");
        assert_eq!(merge.content_type(), "application/merge-patch+json");
        assert_eq!(merge.document(), &json!({"active": false}));
    }
}
