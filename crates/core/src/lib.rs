//! # Cartwright Core
//!
//! Domain types, traits, and error definitions for the Cartwright
//! tool-orchestration runtime. This crate defines the model that every other
//! crate implements against: messages, session state, the persistent store
//! contract, tools, hooks, and the model-driver seam.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping store backends via configuration
//! - Easy testing with in-memory stores and scripted drivers
//! - Clean dependency graph (all crates depend inward on core)

pub mod driver;
pub mod error;
pub mod hook;
pub mod message;
pub mod session;
pub mod shop;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use driver::{DriverRequest, ModelDriver};
pub use error::{DriverError, Error, FieldViolation, HookError, Result, StoreError, ToolError};
pub use hook::{FnHook, HookEvent, HookHandler, HookKind, HookPolicy, HookRegistry};
pub use message::{ContentBlock, Message, Role};
pub use session::SessionState;
pub use shop::{CartItem, Catalog, Preferences, PreferencesUpdate, Product};
pub use store::{StateStore, StoreSnapshot, UserRecord};
pub use tool::{Tool, ToolCall, ToolContext, ToolDefinition, ToolRegistry, ToolResult};
