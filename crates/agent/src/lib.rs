//! Conversation orchestration for Cartwright.
//!
//! A [`Session`] owns one conversation's state and transcript. It announces
//! finalized messages through the hook pipeline, where the built-in
//! persistence handler writes them to the store, and dispatches tool-use
//! requests through the [`Dispatcher`] with `BeforeToolCall` and
//! `AfterToolCall` around each one.
//!
//! [`TurnRunner`] drives any [`ModelDriver`](cartwright_core::ModelDriver)
//! through a full turn:
//!
//! 1. **Append** the user's message
//! 2. **Ask** the driver for a reply
//! 3. **If tool uses**: dispatch them in order, append the results, go to 2
//! 4. **If text only**: the turn is over
//!
//! The loop also stops at the configured iteration limit.

pub mod dispatcher;
pub mod hooks;
pub mod session;
pub mod turn;

pub use dispatcher::Dispatcher;
pub use hooks::{PersistMessageHook, ToolLogHook};
pub use session::{Session, SessionBuilder, SessionSummary};
pub use turn::{TurnOutcome, TurnRunner};
