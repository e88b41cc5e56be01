//! Built-in hook handlers: transcript persistence and tool-call logging.

use async_trait::async_trait;
use cartwright_core::error::HookError;
use cartwright_core::hook::{HookEvent, HookHandler};
use cartwright_core::store::StateStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persists every announced message through the store.
///
/// Registered as a required `MessageAdded` handler: if the store cannot write,
/// the failure reaches whoever added the message.
pub struct PersistMessageHook {
    store: Arc<dyn StateStore>,
}

impl PersistMessageHook {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HookHandler for PersistMessageHook {
    fn name(&self) -> &str {
        "persist_message"
    }

    async fn handle(&self, event: &HookEvent<'_>) -> Result<(), HookError> {
        let HookEvent::MessageAdded { session, message } = event else {
            return Ok(());
        };
        let Some(user_id) = session.user_id() else {
            warn!(message_id = %message.id, "Session has no user, message not persisted");
            return Ok(());
        };

        let stored = self
            .store
            .append_message(user_id, message)
            .await
            .map_err(|source| HookError::Store {
                kind: event.kind(),
                source,
            })?;
        debug!(user_id, message_id = %message.id, role = %message.role, stored, "Message handled");
        Ok(())
    }
}

/// Logs each tool call and its result.
pub struct ToolLogHook;

#[async_trait]
impl HookHandler for ToolLogHook {
    fn name(&self) -> &str {
        "tool_log"
    }

    async fn handle(&self, event: &HookEvent<'_>) -> Result<(), HookError> {
        match event {
            HookEvent::BeforeToolCall { call, .. } => {
                info!(tool = %call.name, call_id = %call.id, input = %call.input, "Tool use");
            }
            HookEvent::AfterToolCall { call, result, .. } => {
                info!(
                    tool = %call.name,
                    call_id = %call.id,
                    success = result.success,
                    output = %result.output,
                    "Tool result"
                );
            }
            HookEvent::MessageAdded { .. } => {}
        }
        Ok(())
    }
}
