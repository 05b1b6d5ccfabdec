//! Hook requests.
//!
//! The assistant sends one JSON object per tool call:
//!
//! ```json
//! {"tool_name": "Edit", "tool_input": {"file_path": "/project/.env"}}
//! ```
//!
//! Only the fields the guard needs are decoded; everything else is ignored.
//! `tool_input` is kept raw until the tool turns out to be an edit, so other
//! tools are allowed whatever shape their arguments have.

use crate::Result;
use serde::Deserialize;
use serde_json::{Map, Value};

/// The kind of access a tool call performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The file's contents are changed in place.
    Modify,
    /// Anything the guard does not decide on.
    Other,
}

impl Operation {
    /// Classify a tool by name. Only `Edit` is a modification.
    pub fn from_tool_name(name: &str) -> Self {
        match name {
            "Edit" => Self::Modify,
            _ => Self::Other,
        }
    }
}

/// A single access to check against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub operation: Operation,
    pub path: String,
}

impl AccessRequest {
    pub fn modify(path: impl Into<String>) -> Self {
        Self {
            operation: Operation::Modify,
            path: path.into(),
        }
    }
}

/// Raw hook payload read from stdin.
#[derive(Debug, Clone, PartialEq)]
pub struct HookInput {
    /// Tool name; anything but the string `"Edit"` is not an edit.
    pub tool_name: Value,

    /// Tool arguments, decoded into [`ToolInput`] only for edits. A missing
    /// key reads as an empty object.
    pub tool_input: Value,
}

/// Edit arguments; only the target path matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
}

impl HookInput {
    /// Decode a hook payload. Anything but a JSON object is an error.
    pub fn from_json(input: &str) -> Result<Self> {
        let mut fields: Map<String, Value> = serde_json::from_str(input)?;
        Ok(Self {
            tool_name: fields.remove("tool_name").unwrap_or(Value::Null),
            tool_input: fields
                .remove("tool_input")
                .unwrap_or_else(|| Value::Object(Map::new())),
        })
    }

    pub fn operation(&self) -> Operation {
        self.tool_name
            .as_str()
            .map_or(Operation::Other, Operation::from_tool_name)
    }

    /// The request to decide, or `None` when the call is not a modification
    /// or carries no target path.
    ///
    /// Fails only for edits whose `tool_input` is not an object or whose
    /// `file_path` is not a string.
    pub fn access_request(&self) -> Result<Option<AccessRequest>> {
        if self.operation() != Operation::Modify {
            return Ok(None);
        }
        let input = ToolInput::deserialize(&self.tool_input)?;
        Ok(input
            .file_path
            .filter(|p| !p.is_empty())
            .map(AccessRequest::modify))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn request(json: &str) -> Result<Option<AccessRequest>> {
        HookInput::from_json(json).unwrap().access_request()
    }

    #[test]
    fn test_edit_request() {
        let decided = request(r#"{"tool_name":"Edit","tool_input":{"file_path":"/a/b.rs"}}"#);
        assert_eq!(decided.unwrap(), Some(AccessRequest::modify("/a/b.rs")));
    }

    #[test]
    fn test_other_tools_are_not_decided() {
        let input =
            HookInput::from_json(r#"{"tool_name":"Read","tool_input":{"file_path":"/a/b.rs"}}"#)
                .unwrap();
        assert_eq!(input.operation(), Operation::Other);
        assert_eq!(input.access_request().unwrap(), None);
    }

    #[test]
    fn test_other_tools_accept_any_arguments() {
        for json in [
            r#"{"tool_name":"Read","tool_input":null}"#,
            r#"{"tool_name":"Bash","tool_input":"ls"}"#,
            r#"{"tool_name":"Write","tool_input":{"file_path":42}}"#,
            r#"{"tool_name":null}"#,
            r#"{"tool_name":7,"tool_input":[]}"#,
            r#"{}"#,
        ] {
            assert_eq!(request(json).unwrap(), None, "{json}");
        }
    }

    #[test]
    fn test_missing_path_is_not_decided() {
        for json in [
            r#"{"tool_name":"Edit"}"#,
            r#"{"tool_name":"Edit","tool_input":{}}"#,
            r#"{"tool_name":"Edit","tool_input":{"file_path":""}}"#,
            r#"{"tool_name":"Edit","tool_input":{"file_path":null}}"#,
        ] {
            assert_eq!(request(json).unwrap(), None, "{json}");
        }
    }

    #[test]
    fn test_edit_with_bad_arguments_fails() {
        for json in [
            r#"{"tool_name":"Edit","tool_input":null}"#,
            r#"{"tool_name":"Edit","tool_input":"x.py"}"#,
            r#"{"tool_name":"Edit","tool_input":{"file_path":42}}"#,
        ] {
            let err = request(json).unwrap_err();
            assert!(matches!(err, Error::Request(_)), "{json}");
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let json = r#"{
            "session_id": "abc",
            "hook_event_name": "PreToolUse",
            "tool_name": "Edit",
            "tool_input": {"file_path": "x.py", "old_string": "a", "new_string": "b"}
        }"#;
        assert_eq!(request(json).unwrap(), Some(AccessRequest::modify("x.py")));
    }

    #[test]
    fn test_malformed_json() {
        let err = HookInput::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Request(_)));
        assert!(err.to_string().starts_with("Invalid JSON input:"));
    }

    #[test]
    fn test_non_object_payload_fails() {
        for json in ["[1, 2]", r#""Edit""#, "null"] {
            assert!(matches!(
                HookInput::from_json(json).unwrap_err(),
                Error::Request(_)
            ));
        }
    }
}
