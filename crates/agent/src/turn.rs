//! The turn loop.
//!
//! A turn appends the user's message, then alternates between the model
//! driver and the dispatcher: every tool use in a reply is dispatched in
//! order, the results go back as one message, and the driver is asked again.
//! The turn ends on the first reply without tool uses.

use cartwright_config::OrchestratorConfig;
use cartwright_core::driver::{DriverRequest, ModelDriver};
use cartwright_core::error::Error;
use cartwright_core::message::Message;
use cartwright_core::tool::{ToolCall, ToolResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::session::Session;

const ITERATION_LIMIT_REPLY: &str =
    "I've reached the maximum number of tool calls for this turn. Please tell me how to continue.";

/// What one turn produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    /// Text of the final assistant message
    pub reply: String,

    /// Tool uses dispatched during the turn, in order
    pub tool_calls: Vec<ToolCall>,

    /// Their results, index-aligned with `tool_calls`
    pub tool_results: Vec<ToolResult>,

    /// Number of driver calls made
    pub iterations: u32,

    /// The turn stopped because the driver kept asking for tools
    pub hit_iteration_limit: bool,
}

pub struct TurnRunner {
    driver: Arc<dyn ModelDriver>,
    max_iterations: u32,
}

impl TurnRunner {
    pub fn new(driver: Arc<dyn ModelDriver>) -> Self {
        Self {
            driver,
            max_iterations: 25,
        }
    }

    pub fn from_config(driver: Arc<dyn ModelDriver>, config: &OrchestratorConfig) -> Self {
        Self::new(driver).with_max_iterations(config.max_tool_iterations)
    }

    /// Cap the number of driver calls per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run one turn for `user_text`.
    ///
    /// Domain failures reach the driver as error results. A driver failure,
    /// a store write failure or a failing required hook ends the turn with
    /// `Err`; messages announced before that point stay in the session.
    pub async fn run(&self, session: &mut Session, user_text: &str) -> Result<TurnOutcome, Error> {
        info!(
            user_id = session.user_id().unwrap_or("-"),
            driver = self.driver.name(),
            "Turn started"
        );
        session.add_message(Message::user(user_text)).await?;

        let tools = session.tool_definitions();
        let mut outcome = TurnOutcome {
            reply: String::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            iterations: 0,
            hit_iteration_limit: false,
        };

        while outcome.iterations < self.max_iterations {
            outcome.iterations += 1;
            debug!(iteration = outcome.iterations, "Turn iteration");

            let reply = self
                .driver
                .respond(DriverRequest {
                    messages: session.messages().to_vec(),
                    tools: tools.clone(),
                })
                .await?;

            let calls: Vec<ToolCall> = reply.tool_calls().cloned().collect();
            let text = reply.text();
            session.add_message(reply).await?;

            if calls.is_empty() {
                info!(
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls.len(),
                    "Turn finished"
                );
                outcome.reply = text;
                return Ok(outcome);
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(session.dispatch(call).await?);
            }
            outcome.tool_calls.extend(calls);
            outcome.tool_results.extend(results.iter().cloned());
            session.add_message(Message::tool_results(results)).await?;
        }

        warn!(
            iterations = outcome.iterations,
            "Max tool iterations reached, ending turn"
        );
        outcome.reply = ITERATION_LIMIT_REPLY.into();
        outcome.hit_iteration_limit = true;
        Ok(outcome)
    }
}
