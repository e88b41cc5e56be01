//! Error types for the Cartwright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; infrastructure faults
//! (store writes, required hooks) travel upward through [`Error`].

use thiserror::Error;

use crate::hook::HookKind;

/// The top-level error type for all Cartwright operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Hook errors ---
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    // --- Model driver errors ---
    #[error("Model driver error: {0}")]
    Driver(#[from] DriverError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Persistence failures. Reads never produce these (they degrade to empty
/// data); only writes do.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write snapshot to {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),
}

/// A single schema violation, reported against the input field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldViolation {
    /// Field name, or `<input>` when the payload as a whole is wrong
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for {tool}: {}", format_violations(.violations))]
    SchemaValidationFailed {
        tool: String,
        violations: Vec<FieldViolation>,
    },

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool {tool_name} could not persist its changes: {source}")]
    Store {
        tool_name: String,
        #[source]
        source: StoreError,
    },
}

impl ToolError {
    /// Whether this error is an infrastructure fault the caller must see,
    /// as opposed to something the model can read and recover from.
    pub fn is_fault(&self) -> bool {
        matches!(self, ToolError::Store { .. })
    }

    /// Stable snake_case code used in error results handed to the model.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::SchemaValidationFailed { .. } => "schema_validation_failed",
            ToolError::ExecutionFailed { .. } => "execution_failed",
            ToolError::Store { .. } => "store_unavailable",
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("{kind} handler failed: {reason}")]
    HandlerFailed { kind: HookKind, reason: String },

    #[error("{kind} handler could not persist: {source}")]
    Store {
        kind: HookKind,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    #[error("Model returned an unusable reply: {0}")]
    InvalidReply(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_field() {
        let err = ToolError::SchemaValidationFailed {
            tool: "add_to_cart".into(),
            violations: vec![
                FieldViolation {
                    field: "productName".into(),
                    reason: "is required".into(),
                },
                FieldViolation {
                    field: "quantity".into(),
                    reason: "must be an integer".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("add_to_cart"));
        assert!(text.contains("productName: is required"));
        assert!(text.contains("quantity: must be an integer"));
    }

    #[test]
    fn only_store_failures_are_faults() {
        assert!(!ToolError::UnknownTool("x".into()).is_fault());
        let fault = ToolError::Store {
            tool_name: "add_to_cart".into(),
            source: StoreError::Unavailable("disk full".into()),
        };
        assert!(fault.is_fault());
        assert_eq!(fault.code(), "store_unavailable");
    }

    #[test]
    fn store_error_displays_through_top_level() {
        let err = Error::from(StoreError::WriteFailed {
            path: "/tmp/db.json".into(),
            reason: "read-only file system".into(),
        });
        assert!(err.to_string().contains("/tmp/db.json"));
        assert!(err.to_string().contains("read-only"));
    }
}
