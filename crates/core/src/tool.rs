//! Tool trait — the abstraction over agent capabilities.
//!
//! A tool is a named unit with a description, a JSON Schema for its input and
//! an async callback. The registry resolves tools by name and validates raw
//! input against the schema before anything runs.

use async_trait::async_trait;
use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{FieldViolation, ToolError};
use crate::session::SessionState;
use crate::shop::Catalog;
use crate::store::StateStore;

/// A request to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool-use id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Raw input as sent by the model
    #[serde(default)]
    pub input: serde_json::Value,
}

/// The result of a tool execution, handed back to the model verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// `false` when the dispatcher rejected the call or the tool failed to run.
    /// Domain outcomes such as an unknown product still count as success here;
    /// they are reported inside `data`.
    pub success: bool,

    /// The output rendered as text
    pub output: String,

    /// Structured output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            success: true,
            output: serde_json::to_string_pretty(&data).unwrap_or_default(),
            data: Some(data),
        }
    }

    /// An error result the model can read. Validation failures list every
    /// offending field.
    pub fn error(call_id: impl Into<String>, error: &ToolError) -> Self {
        let mut data = serde_json::json!({
            "error": error.code(),
            "message": error.to_string(),
        });
        if let ToolError::SchemaValidationFailed { violations, .. } = error {
            data["fields"] = serde_json::to_value(violations).unwrap_or_default();
        }
        Self {
            call_id: call_id.into(),
            success: false,
            output: error.to_string(),
            data: Some(data),
        }
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's input
    pub parameters: serde_json::Value,
}

/// Everything a tool may touch while it runs.
///
/// Passed explicitly into every invocation; there is no ambient session.
pub struct ToolContext<'a> {
    /// The calling conversation's working state
    pub state: &'a mut SessionState,

    /// Durable storage
    pub store: &'a dyn StateStore,

    /// Product reference data
    pub catalog: &'a Catalog,
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "add_to_cart").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's input.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool. `input` has already passed schema validation.
    async fn execute(
        &self,
        input: serde_json::Value,
        ctx: &mut ToolContext<'_>,
    ) -> Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Check `input` against `schema`, collecting every violation.
pub fn validate_input(
    tool_name: &str,
    schema: &serde_json::Value,
    input: &serde_json::Value,
) -> Result<(), ToolError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: format!("invalid input schema: {e}"),
        })?;

    let violations: Vec<FieldViolation> = validator
        .iter_errors(input)
        .map(|e| {
            let field = match &e.kind {
                ValidationErrorKind::Required { property } => property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| property.to_string()),
                _ => field_from_pointer(&e.instance_path.to_string()),
            };
            FieldViolation {
                field,
                reason: e.to_string(),
            }
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ToolError::SchemaValidationFailed {
            tool: tool_name.to_string(),
            violations,
        })
    }
}

fn field_from_pointer(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        "<input>".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

/// A registry of available tools, built once at startup.
///
/// Used to:
/// 1. Get tool definitions to send to the model
/// 2. Resolve, validate and run tools when the model requests them
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve and validate a call, then run it exactly once.
    pub async fn execute(
        &self,
        call: &ToolCall,
        ctx: &mut ToolContext<'_>,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;

        // Models send `null` for tools without arguments.
        let input = if call.input.is_null() {
            serde_json::json!({})
        } else {
            call.input.clone()
        };
        validate_input(tool.name(), &tool.parameters_schema(), &input)?;

        debug!(tool = %call.name, call_id = %call.id, "Executing tool");
        let data = tool.execute(input, ctx).await?;
        Ok(ToolResult::success(&call.id, data))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
