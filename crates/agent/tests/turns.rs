//! End-to-end turns: scripted driver → session → tools → hooks → store.

use async_trait::async_trait;
use cartwright_agent::{Session, TurnRunner};
use cartwright_core::driver::{DriverRequest, ModelDriver};
use cartwright_core::error::{DriverError, Error, HookError, ToolError};
use cartwright_core::hook::{FnHook, HookEvent, HookHandler, HookKind};
use cartwright_core::message::{ContentBlock, Message, Role};
use cartwright_core::session::PREFERENCES;
use cartwright_core::shop::Preferences;
use cartwright_core::store::StateStore;
use cartwright_core::tool::ToolCall;
use cartwright_store::{InMemoryStore, JsonFileStore};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replays a fixed list of replies and records every request it saw.
struct ScriptedDriver {
    replies: Mutex<Vec<Message>>,
    requests: Mutex<Vec<DriverRequest>>,
}

impl ScriptedDriver {
    fn new(replies: Vec<Message>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> DriverRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ModelDriver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn respond(&self, request: DriverRequest) -> Result<Message, DriverError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let replies = self.replies.lock().unwrap();
        replies.get(index).cloned().ok_or_else(|| {
            DriverError::RequestFailed(format!(
                "ScriptedDriver exhausted: call #{index}, have {}",
                replies.len()
            ))
        })
    }
}

fn tool_use(id: &str, name: &str, input: Value) -> ContentBlock {
    ContentBlock::ToolUse(ToolCall {
        id: id.into(),
        name: name.into(),
        input,
    })
}

fn tool_reply(thought: &str, uses: Vec<ContentBlock>) -> Message {
    let mut content = Vec::new();
    if !thought.is_empty() {
        content.push(ContentBlock::text(thought));
    }
    content.extend(uses);
    Message::new(Role::Assistant, content)
}

fn counter(kind: HookKind, seen: Arc<AtomicUsize>) -> Arc<dyn HookHandler> {
    Arc::new(FnHook::new(
        format!("count_{kind}"),
        move |_event: &HookEvent<'_>| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    ))
}

#[tokio::test]
async fn laptop_turn_accumulates_and_persists_text_only() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("user-123", store.clone()).start().await;

    let driver = Arc::new(ScriptedDriver::new(vec![
        tool_reply(
            "Adding those laptops.",
            vec![
                tool_use("call_1", "add_to_cart", json!({"productName": "Laptop", "quantity": 1})),
                tool_use("call_2", "add_to_cart", json!({"productName": "laptop", "quantity": 2})),
            ],
        ),
        tool_reply("", vec![tool_use("call_3", "view_cart", json!({}))]),
        Message::assistant("You have 3 laptops, $2997 in total."),
    ]));
    let runner = TurnRunner::new(driver.clone());

    let outcome = runner
        .run(&mut session, "Add a laptop, then two more")
        .await
        .unwrap();

    assert_eq!(outcome.reply, "You have 3 laptops, $2997 in total.");
    assert_eq!(outcome.iterations, 3);
    assert!(!outcome.hit_iteration_limit);
    let names: Vec<&str> = outcome.tool_calls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["add_to_cart", "add_to_cart", "view_cart"]);
    assert!(outcome.tool_results.iter().all(|r| r.success));
    assert_eq!(outcome.tool_results[2].call_id, "call_3");
    assert_eq!(outcome.tool_results[2].data.as_ref().unwrap()["total"], 2997.0);

    let cart = store.cart("user-123").await;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);

    // user, first reply's text, final reply; tool-only messages are not stored
    let persisted = store.messages("user-123").await;
    assert_eq!(persisted.len(), 3);
    assert_eq!(persisted[0].text(), "Add a laptop, then two more");
    assert_eq!(persisted[1].text(), "Adding those laptops.");
    assert!(persisted.iter().all(|m| m.tool_calls().next().is_none()));

    // the driver saw the tool results of the first batch on its second call
    assert_eq!(driver.calls(), 3);
    let last = driver.last_request();
    assert_eq!(last.tools.len(), 6);
    let result_ids: Vec<String> = last
        .messages
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result.call_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(result_ids, ["call_1", "call_2", "call_3"]);
}

#[tokio::test]
async fn unknown_tool_is_an_error_result_and_still_observed() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("u1", store).start().await;
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let hooks = session.hooks_mut();
    hooks.add_callback(HookKind::BeforeToolCall, counter(HookKind::BeforeToolCall, before.clone()));
    hooks.add_callback(HookKind::AfterToolCall, counter(HookKind::AfterToolCall, after.clone()));

    let driver = Arc::new(ScriptedDriver::new(vec![
        tool_reply("", vec![tool_use("call_1", "checkout", json!({}))]),
        Message::assistant("Checkout isn't something I can do."),
    ]));
    let outcome = TurnRunner::new(driver).run(&mut session, "check out").await.unwrap();

    let result = &outcome.tool_results[0];
    assert!(!result.success);
    assert_eq!(result.data.as_ref().unwrap()["error"], "unknown_tool");
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_input_comes_back_with_field_names() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("u1", store.clone()).start().await;
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let hooks = session.hooks_mut();
    hooks.add_callback(HookKind::BeforeToolCall, counter(HookKind::BeforeToolCall, before.clone()));
    hooks.add_callback(HookKind::AfterToolCall, counter(HookKind::AfterToolCall, after.clone()));

    let result = session
        .dispatch(&ToolCall {
            id: "call_1".into(),
            name: "add_to_cart".into(),
            input: json!({"quantity": -4}),
        })
        .await
        .unwrap();
    assert_eq!(before.load(Ordering::SeqCst), 1);
    assert_eq!(after.load(Ordering::SeqCst), 1);

    assert!(!result.success);
    let data = result.data.unwrap();
    assert_eq!(data["error"], "schema_validation_failed");
    let fields: Vec<&str> = data["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert!(fields.contains(&"productName"), "{fields:?}");
    assert!(store.cart("u1").await.is_empty());
}

#[tokio::test]
async fn each_message_is_persisted_once() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("u1", store.clone()).start().await;

    let message = Message::user("hello");
    session.add_message(message.clone()).await.unwrap();
    session.add_message(message).await.unwrap();
    session.add_message(Message::user("hello")).await.unwrap();

    assert_eq!(session.messages().len(), 2);
    assert_eq!(store.messages("u1").await.len(), 2);
}

#[tokio::test]
async fn anonymous_session_persists_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("", store.clone()).start().await;
    assert_eq!(session.user_id(), None);

    session.add_message(Message::user("hi")).await.unwrap();
    assert_eq!(session.messages().len(), 1);
    assert!(store.snapshot().await.messages.is_empty());
}

#[tokio::test]
async fn observer_failure_does_not_stop_the_turn() {
    let store = Arc::new(InMemoryStore::new());
    let mut session = Session::builder("u1", store.clone()).start().await;
    session.hooks_mut().add_callback(
        HookKind::MessageAdded,
        Arc::new(FnHook::new("broken", |event: &HookEvent<'_>| {
            Err(HookError::HandlerFailed {
                kind: event.kind(),
                reason: "boom".into(),
            })
        })),
    );

    let driver = Arc::new(ScriptedDriver::new(vec![Message::assistant("Hi there!")]));
    let outcome = TurnRunner::new(driver).run(&mut session, "hi").await.unwrap();

    assert_eq!(outcome.reply, "Hi there!");
    assert_eq!(store.messages("u1").await.len(), 2);
}

#[tokio::test]
async fn restarted_session_is_seeded_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("database.json");

    {
        let store = Arc::new(JsonFileStore::open(path.clone()));
        let mut session = Session::builder("u1", store).start().await;
        let driver = Arc::new(ScriptedDriver::new(vec![
            tool_reply(
                "",
                vec![
                    tool_use("call_1", "update_preferences", json!({"currency": "EUR"})),
                    tool_use("call_2", "add_to_cart", json!({"productName": "Monitor"})),
                ],
            ),
            Message::assistant("Switched to EUR and added a monitor."),
        ]));
        TurnRunner::new(driver)
            .run(&mut session, "euros please, and a monitor")
            .await
            .unwrap();
    }

    let store = Arc::new(JsonFileStore::open(path));
    let session = Session::builder("u1", store).start().await;
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.messages()[1].text(), "Switched to EUR and added a monitor.");

    let preferences: Preferences = session.state().get_as(PREFERENCES).unwrap();
    assert_eq!(preferences.currency, "EUR");

    let summary = session.summary().await;
    assert_eq!(summary.cart.len(), 1);
    assert_eq!(summary.cart[0].name, "Monitor");
    assert_eq!(summary.persisted_messages, 2);
    assert_eq!(summary.state["userId"], "u1");
}

#[tokio::test]
async fn store_write_failure_propagates_from_hooks_and_tools() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = Arc::new(JsonFileStore::open(blocker.join("database.json")));

    let mut session = Session::builder("u1", store).start().await;
    let after = Arc::new(AtomicUsize::new(0));
    session.hooks_mut().add_callback(
        HookKind::AfterToolCall,
        counter(HookKind::AfterToolCall, after.clone()),
    );

    let err = session.add_message(Message::user("hi")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Hook(HookError::Store {
            kind: HookKind::MessageAdded,
            ..
        })
    ));
    assert!(session.messages().is_empty());

    let err = session
        .dispatch(&ToolCall {
            id: "call_1".into(),
            name: "add_to_cart".into(),
            input: json!({"productName": "Laptop"}),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::Store { .. })));
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn message_rejected_by_the_store_can_be_added_again() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = Arc::new(JsonFileStore::open(blocker.join("database.json")));
    let mut session = Session::builder("u1", store.clone()).start().await;

    let message = Message::user("hello");
    assert!(session.add_message(message.clone()).await.is_err());
    assert!(session.messages().is_empty());

    std::fs::remove_file(&blocker).unwrap();
    session.add_message(message.clone()).await.unwrap();
    session.add_message(message.clone()).await.unwrap();

    assert_eq!(session.messages().len(), 1);
    let stored = store.messages("u1").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, message.id);

    let reopened = JsonFileStore::open(blocker.join("database.json"));
    assert_eq!(reopened.messages("u1").await.len(), 1);
}

#[tokio::test]
async fn tool_logging_registers_observers() {
    let store = Arc::new(InMemoryStore::new());
    let session = Session::builder("u1", store)
        .with_tool_logging(true)
        .start()
        .await;
    assert_eq!(session.hooks().count(HookKind::MessageAdded), 1);
    assert_eq!(session.hooks().count(HookKind::BeforeToolCall), 1);
    assert_eq!(session.hooks().count(HookKind::AfterToolCall), 1);
}
