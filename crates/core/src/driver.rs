//! Model driver trait — the seam to whatever produces assistant replies.
//!
//! The orchestrator hands the driver the conversation so far and the tool
//! definitions; the driver answers with one assistant message that may carry
//! tool-use segments. How the reply is produced is not this crate's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// One request to the model driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRequest {
    /// The conversation, oldest first
    pub messages: Vec<Message>,

    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

#[async_trait]
pub trait ModelDriver: Send + Sync {
    /// The driver name (e.g., "scripted", "bedrock").
    fn name(&self) -> &str;

    /// Produce the next assistant message.
    async fn respond(&self, request: DriverRequest) -> Result<Message, DriverError>;
}
