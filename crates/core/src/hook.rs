//! Session lifecycle hooks — ordered observers keyed by a closed set of kinds.
//!
//! Handlers for a kind run one after another, in registration order, and are
//! awaited before the session moves on. Each handler is registered with a
//! [`HookPolicy`]: observers log their failures and the turn continues;
//! required handlers (persistence) stop the turn with an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::error::HookError;
use crate::message::Message;
use crate::session::SessionState;
use crate::tool::{ToolCall, ToolResult};

/// The lifecycle points a handler can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookKind {
    MessageAdded,
    BeforeToolCall,
    AfterToolCall,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessageAdded => write!(f, "MessageAdded"),
            Self::BeforeToolCall => write!(f, "BeforeToolCall"),
            Self::AfterToolCall => write!(f, "AfterToolCall"),
        }
    }
}

/// What a handler sees. Every event carries the owning session's state.
#[derive(Debug, Clone, Copy)]
pub enum HookEvent<'a> {
    MessageAdded {
        session: &'a SessionState,
        message: &'a Message,
    },
    BeforeToolCall {
        session: &'a SessionState,
        call: &'a ToolCall,
    },
    AfterToolCall {
        session: &'a SessionState,
        call: &'a ToolCall,
        result: &'a ToolResult,
    },
}

impl<'a> HookEvent<'a> {
    pub fn kind(&self) -> HookKind {
        match self {
            Self::MessageAdded { .. } => HookKind::MessageAdded,
            Self::BeforeToolCall { .. } => HookKind::BeforeToolCall,
            Self::AfterToolCall { .. } => HookKind::AfterToolCall,
        }
    }

    pub fn session(&self) -> &'a SessionState {
        match self {
            Self::MessageAdded { session, .. }
            | Self::BeforeToolCall { session, .. }
            | Self::AfterToolCall { session, .. } => session,
        }
    }
}

/// How a handler's failure is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookPolicy {
    /// Log the failure and keep going.
    #[default]
    Observe,
    /// Stop at the failure and return it to the caller.
    Required,
}

#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn handle(&self, event: &HookEvent<'_>) -> Result<(), HookError>;
}

/// Adapts a plain closure into a handler.
pub struct FnHook<F> {
    name: String,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&HookEvent<'_>) -> Result<(), HookError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> HookHandler for FnHook<F>
where
    F: Fn(&HookEvent<'_>) -> Result<(), HookError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &HookEvent<'_>) -> Result<(), HookError> {
        (self.f)(event)
    }
}

struct Registration {
    kind: HookKind,
    policy: HookPolicy,
    handler: Arc<dyn HookHandler>,
}

/// Per-session publish/subscribe registry.
#[derive(Default)]
pub struct HookRegistry {
    registrations: Vec<Registration>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observational handler.
    pub fn add_callback(&mut self, kind: HookKind, handler: Arc<dyn HookHandler>) {
        self.add_with_policy(kind, HookPolicy::Observe, handler);
    }

    /// Register a handler whose failure aborts the current operation.
    pub fn add_required(&mut self, kind: HookKind, handler: Arc<dyn HookHandler>) {
        self.add_with_policy(kind, HookPolicy::Required, handler);
    }

    pub fn add_with_policy(
        &mut self,
        kind: HookKind,
        policy: HookPolicy,
        handler: Arc<dyn HookHandler>,
    ) {
        self.registrations.push(Registration {
            kind,
            policy,
            handler,
        });
    }

    /// Number of handlers attached to `kind`.
    pub fn count(&self, kind: HookKind) -> usize {
        self.registrations.iter().filter(|r| r.kind == kind).count()
    }

    /// Run every handler for the event's kind, in registration order.
    pub async fn fire(&self, event: &HookEvent<'_>) -> Result<(), HookError> {
        let kind = event.kind();
        for registration in self.registrations.iter().filter(|r| r.kind == kind) {
            if let Err(e) = registration.handler.handle(event).await {
                match registration.policy {
                    HookPolicy::Required => return Err(e),
                    HookPolicy::Observe => warn!(
                        hook = registration.handler.name(),
                        kind = %kind,
                        error = %e,
                        "Hook handler failed, continuing"
                    ),
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.registrations
                    .iter()
                    .map(|r| (r.kind, r.policy, r.handler.name())),
            )
            .finish()
    }
}
