//! Tool dispatch with the hook pipeline wrapped around it.
//!
//! One request yields exactly one resolution attempt and at most one tool
//! invocation. Nothing is retried, cached or reordered.

use cartwright_core::error::Error;
use cartwright_core::hook::{HookEvent, HookRegistry};
use cartwright_core::tool::{ToolCall, ToolContext, ToolDefinition, ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Run one tool-use request.
    ///
    /// `BeforeToolCall` fires for every request, including ones naming an
    /// unknown tool or carrying invalid input. Those come back as error
    /// results, followed by `AfterToolCall`. Only a store write failure inside
    /// a tool, or a failing required hook, is returned as `Err`.
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        hooks: &HookRegistry,
        ctx: &mut ToolContext<'_>,
    ) -> Result<ToolResult, Error> {
        hooks
            .fire(&HookEvent::BeforeToolCall {
                session: &*ctx.state,
                call,
            })
            .await?;

        let start = Instant::now();
        let result = match self.tools.execute(call, ctx).await {
            Ok(result) => result,
            Err(e) if e.is_fault() => {
                error!(tool = %call.name, call_id = %call.id, error = %e, "Tool could not persist");
                return Err(e.into());
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call rejected");
                ToolResult::error(&call.id, &e)
            }
        };
        debug!(
            tool = %call.name,
            success = result.success,
            duration_ms = start.elapsed().as_millis() as u64,
            "Tool call finished"
        );

        hooks
            .fire(&HookEvent::AfterToolCall {
                session: &*ctx.state,
                call,
                result: &result,
            })
            .await?;
        Ok(result)
    }
}
