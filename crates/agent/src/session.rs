//! A conversation: its state, its transcript, its hooks, and its tools.
//!
//! A session is seeded from the store once, at start. From then on its own
//! state is the source of truth; the store only ever receives writes, made by
//! tools and by the persistence hook.

use cartwright_config::AppConfig;
use cartwright_core::error::Error;
use cartwright_core::hook::{HookEvent, HookKind, HookRegistry};
use cartwright_core::message::Message;
use cartwright_core::session::SessionState;
use cartwright_core::shop::{CartItem, Catalog};
use cartwright_core::store::StateStore;
use cartwright_core::tool::{ToolCall, ToolContext, ToolDefinition, ToolRegistry, ToolResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::hooks::{PersistMessageHook, ToolLogHook};

/// Builds a [`Session`] for one user.
pub struct SessionBuilder {
    user_id: String,
    store: Arc<dyn StateStore>,
    tools: Option<Arc<ToolRegistry>>,
    catalog: Option<Arc<Catalog>>,
    log_tool_calls: bool,
}

impl SessionBuilder {
    pub fn new(user_id: impl Into<String>, store: Arc<dyn StateStore>) -> Self {
        Self {
            user_id: user_id.into(),
            store,
            tools: None,
            catalog: None,
            log_tool_calls: false,
        }
    }

    /// Use a specific tool registry instead of the shopping tools.
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Use a specific catalog instead of the built-in one.
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Log every tool call and result.
    pub fn with_tool_logging(mut self, enabled: bool) -> Self {
        self.log_tool_calls = enabled;
        self
    }

    /// Apply the `[hooks]` settings.
    pub fn with_config(self, config: &AppConfig) -> Self {
        self.with_tool_logging(config.hooks.log_tool_calls)
    }

    /// Load the user's transcript and preferences and open the session.
    pub async fn start(self) -> Session {
        let messages = self.store.messages(&self.user_id).await;
        let preferences = self.store.preferences(&self.user_id).await;
        let state = SessionState::seeded(&self.user_id, &preferences);

        let mut hooks = HookRegistry::new();
        hooks.add_required(
            HookKind::MessageAdded,
            Arc::new(PersistMessageHook::new(Arc::clone(&self.store))),
        );
        if self.log_tool_calls {
            let log = Arc::new(ToolLogHook);
            hooks.add_callback(HookKind::BeforeToolCall, log.clone());
            hooks.add_callback(HookKind::AfterToolCall, log);
        }

        info!(
            user_id = %self.user_id,
            prior_messages = messages.len(),
            store = self.store.name(),
            "Session started"
        );

        Session {
            seen: messages.iter().map(|m| m.id.clone()).collect(),
            messages,
            state,
            hooks,
            dispatcher: Dispatcher::new(
                self.tools
                    .unwrap_or_else(|| Arc::new(cartwright_tools::shop_registry())),
            ),
            store: self.store,
            catalog: self.catalog.unwrap_or_default(),
        }
    }
}

pub struct Session {
    state: SessionState,
    messages: Vec<Message>,
    /// Ids of every message already in the conversation.
    seen: HashSet<String>,
    hooks: HookRegistry,
    dispatcher: Dispatcher,
    store: Arc<dyn StateStore>,
    catalog: Arc<Catalog>,
}

/// End-of-session report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub state: BTreeMap<String, serde_json::Value>,
    pub cart: Vec<CartItem>,
    pub persisted_messages: usize,
}

impl Session {
    pub fn builder(user_id: impl Into<String>, store: Arc<dyn StateStore>) -> SessionBuilder {
        SessionBuilder::new(user_id, store)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.state.user_id()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// The conversation so far, including messages loaded at start.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Register additional handlers.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.dispatcher.definitions()
    }

    /// Append a finalized message and fire `MessageAdded`.
    ///
    /// A message id already in the conversation is ignored, so each message
    /// instance is announced (and persisted) at most once. If a required
    /// handler fails, the message is not added and may be retried.
    pub async fn add_message(&mut self, message: Message) -> Result<(), Error> {
        if self.seen.contains(&message.id) {
            warn!(message_id = %message.id, "Message already in conversation, ignoring");
            return Ok(());
        }

        self.hooks
            .fire(&HookEvent::MessageAdded {
                session: &self.state,
                message: &message,
            })
            .await?;

        self.seen.insert(message.id.clone());
        self.messages.push(message);
        Ok(())
    }

    /// Dispatch one tool-use request against this session.
    pub async fn dispatch(&mut self, call: &ToolCall) -> Result<ToolResult, Error> {
        let mut ctx = ToolContext {
            state: &mut self.state,
            store: self.store.as_ref(),
            catalog: &self.catalog,
        };
        self.dispatcher.dispatch(call, &self.hooks, &mut ctx).await
    }

    /// Session state, current cart and persisted transcript length.
    pub async fn summary(&self) -> SessionSummary {
        let (cart, persisted_messages) = match self.user_id() {
            Some(user_id) => (
                self.store.cart(user_id).await,
                self.store.messages(user_id).await.len(),
            ),
            None => (Vec::new(), 0),
        };
        SessionSummary {
            state: self.state.all().clone(),
            cart,
            persisted_messages,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("messages", &self.messages.len())
            .field("hooks", &self.hooks)
            .field("store", &self.store.name())
            .finish()
    }
}
