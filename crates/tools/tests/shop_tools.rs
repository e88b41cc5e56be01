//! Behavior of the shopping tools through the registry, against a real store.

use cartwright_core::error::ToolError;
use cartwright_core::session::{PREFERENCES, SessionState};
use cartwright_core::shop::{Catalog, Preferences};
use cartwright_core::store::StateStore;
use cartwright_core::tool::{ToolCall, ToolContext, ToolRegistry, ToolResult};
use cartwright_store::{InMemoryStore, JsonFileStore};
use cartwright_tools::shop_registry;
use serde_json::{Value, json};

struct Harness {
    registry: ToolRegistry,
    store: Box<dyn StateStore>,
    catalog: Catalog,
    state: SessionState,
    calls: usize,
}

impl Harness {
    fn for_user(user_id: &str) -> Self {
        let store = InMemoryStore::new();
        Self {
            registry: shop_registry(),
            store: Box::new(store),
            catalog: Catalog::default(),
            state: SessionState::seeded(user_id, &Preferences::default()),
            calls: 0,
        }
    }

    fn anonymous() -> Self {
        let mut harness = Self::for_user("ignored");
        harness.state = SessionState::new();
        harness
    }

    async fn try_call(&mut self, name: &str, input: Value) -> Result<ToolResult, ToolError> {
        self.calls += 1;
        let call = ToolCall {
            id: format!("call_{}", self.calls),
            name: name.into(),
            input,
        };
        let mut ctx = ToolContext {
            state: &mut self.state,
            store: self.store.as_ref(),
            catalog: &self.catalog,
        };
        self.registry.execute(&call, &mut ctx).await
    }

    async fn call(&mut self, name: &str, input: Value) -> Value {
        let result = self.try_call(name, input).await.unwrap();
        assert!(result.success, "{name} failed: {}", result.output);
        result.data.unwrap()
    }
}

#[tokio::test]
async fn view_catalog_lists_every_product() {
    let mut h = Harness::for_user("u1");
    let out = h.call("view_catalog", json!({})).await;
    assert_eq!(out["totalProducts"], 5);
    assert_eq!(out["products"][0]["name"], "Laptop");
    assert_eq!(out["products"][0]["unitPrice"], 999.0);
}

#[tokio::test]
async fn laptop_scenario_accumulates_case_insensitively() {
    let mut h = Harness::for_user("u1");

    let first = h.call("add_to_cart", json!({"productName": "Laptop", "quantity": 1})).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["message"], "Added 1x Laptop");
    assert_eq!(first["cart"].as_array().unwrap().len(), 1);
    assert_eq!(first["cart"][0]["quantity"], 1);

    let second = h.call("add_to_cart", json!({"productName": "laptop", "quantity": 2})).await;
    let cart = second["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["productId"], "prod-1");
    assert_eq!(cart[0]["quantity"], 3);

    let view = h.call("view_cart", json!({})).await;
    assert_eq!(view["total"], 3.0 * 999.0);
    assert_eq!(view["itemCount"], 1);
}

#[tokio::test]
async fn add_to_cart_defaults_quantity_to_one() {
    let mut h = Harness::for_user("u1");
    let out = h.call("add_to_cart", json!({"productName": "mouse"})).await;
    assert_eq!(out["cart"][0]["quantity"], 1);
}

#[tokio::test]
async fn unknown_product_is_a_structured_failure() {
    let mut h = Harness::for_user("u1");
    let out = h.call("add_to_cart", json!({"productName": "toaster"})).await;
    assert_eq!(out["success"], false);
    assert_eq!(out["error"], "product_not_found");
    assert!(out["cart"].is_null());
    assert!(h.store.cart("u1").await.is_empty());
}

#[tokio::test]
async fn add_and_remove_match_names_the_same_way() {
    let mut h = Harness::for_user("u1");
    let padded = h.call("add_to_cart", json!({"productName": " Laptop "})).await;
    assert_eq!(padded["error"], "product_not_found");
    assert!(h.store.cart("u1").await.is_empty());

    h.call("add_to_cart", json!({"productName": "Laptop"})).await;
    let kept = h.call("remove_from_cart", json!({"productName": " Laptop "})).await;
    assert_eq!(kept["cart"].as_array().unwrap().len(), 1);
    let removed = h.call("remove_from_cart", json!({"productName": "LAPTOP"})).await;
    assert_eq!(removed["cart"], json!([]));
}

#[tokio::test]
async fn cart_tools_without_a_user_report_user_not_found() {
    let mut h = Harness::anonymous();

    let add = h.call("add_to_cart", json!({"productName": "Laptop"})).await;
    assert_eq!(add["success"], false);
    assert_eq!(add["error"], "user_not_found");
    assert_eq!(add["message"], "User not found");

    let remove = h.call("remove_from_cart", json!({"productName": "Laptop"})).await;
    assert_eq!(remove["error"], "user_not_found");

    let update = h.call("update_preferences", json!({"currency": "EUR"})).await;
    assert_eq!(update["error"], "user_not_found");

    let view = h.call("view_cart", json!({})).await;
    assert_eq!(view["total"], 0.0);
    assert_eq!(view["itemCount"], 0);
    assert_eq!(view["cart"], json!([]));

    let prefs = h.call("get_preferences", json!({})).await;
    assert_eq!(prefs["preferences"], json!({"currency": "USD"}));
}

#[tokio::test]
async fn remove_from_cart_is_idempotent() {
    let mut h = Harness::for_user("u1");
    h.call("add_to_cart", json!({"productName": "Mouse", "quantity": 2})).await;
    h.call("add_to_cart", json!({"productName": "Keyboard"})).await;

    let removed = h.call("remove_from_cart", json!({"productName": "MOUSE"})).await;
    assert_eq!(removed["success"], true);
    assert_eq!(removed["cart"].as_array().unwrap().len(), 1);
    assert_eq!(removed["cart"][0]["name"], "Keyboard");

    let again = h.call("remove_from_cart", json!({"productName": "mouse"})).await;
    assert_eq!(again["success"], true);
    assert_eq!(again["cart"], removed["cart"]);

    let absent = h.call("remove_from_cart", json!({"productName": "Monitor"})).await;
    assert_eq!(absent["success"], true);
    assert_eq!(absent["cart"], removed["cart"]);
}

#[tokio::test]
async fn view_cart_total_matches_lines() {
    let mut h = Harness::for_user("u1");
    assert_eq!(h.call("view_cart", json!({})).await["total"], 0.0);

    h.call("add_to_cart", json!({"productName": "Monitor", "quantity": 2})).await;
    h.call("add_to_cart", json!({"productName": "Headphones"})).await;
    h.call("add_to_cart", json!({"productName": "Mouse", "quantity": 3})).await;

    let view = h.call("view_cart", json!({})).await;
    assert_eq!(view["total"], 2.0 * 299.0 + 149.0 + 3.0 * 29.0);
    assert_eq!(view["itemCount"], 3);
}

#[tokio::test]
async fn update_preferences_merges_and_mirrors_into_session() {
    let mut h = Harness::for_user("u1");

    h.call("update_preferences", json!({"paymentMethod": "visa"})).await;
    let out = h.call("update_preferences", json!({"currency": "EUR"})).await;
    assert_eq!(out["success"], true);
    assert_eq!(out["preferences"], json!({"paymentMethod": "visa", "currency": "EUR"}));

    let mirrored: Preferences = h.state.get_as(PREFERENCES).unwrap();
    assert_eq!(mirrored.payment_method.as_deref(), Some("visa"));
    assert_eq!(mirrored.currency, "EUR");

    let stored = h.call("get_preferences", json!({})).await;
    assert_eq!(stored["preferences"], out["preferences"]);
}

#[tokio::test]
async fn get_preferences_reads_the_store_not_the_session() {
    let mut h = Harness::for_user("u1");
    h.state.set(
        PREFERENCES,
        Preferences {
            payment_method: Some("cash".into()),
            currency: "JPY".into(),
        },
    );
    let out = h.call("get_preferences", json!({})).await;
    assert_eq!(out["preferences"], json!({"currency": "USD"}));
}

#[tokio::test]
async fn invalid_input_names_the_fields_and_runs_nothing() {
    let mut h = Harness::for_user("u1");
    let err = h
        .try_call("add_to_cart", json!({"quantity": 0}))
        .await
        .unwrap_err();
    let ToolError::SchemaValidationFailed { tool, violations } = err else {
        panic!("expected schema validation failure");
    };
    assert_eq!(tool, "add_to_cart");
    let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    assert!(fields.contains(&"productName"), "{fields:?}");
    assert!(fields.contains(&"quantity"), "{fields:?}");
    assert!(h.store.cart("u1").await.is_empty());

    let err = h
        .try_call("add_to_cart", json!({"productName": "Laptop", "quantity": "two"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::SchemaValidationFailed { .. }));
}

#[tokio::test]
async fn null_input_is_accepted_for_argumentless_tools() {
    let mut h = Harness::for_user("u1");
    let out = h.call("view_cart", Value::Null).await;
    assert_eq!(out["itemCount"], 0);
}

#[tokio::test]
async fn store_write_failure_is_a_fault() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut h = Harness::for_user("u1");
    h.store = Box::new(JsonFileStore::open(blocker.join("database.json")));

    let err = h
        .try_call("add_to_cart", json!({"productName": "Laptop"}))
        .await
        .unwrap_err();
    assert!(err.is_fault());
    assert!(matches!(err, ToolError::Store { ref tool_name, .. } if tool_name == "add_to_cart"));
    assert!(h.store.cart("u1").await.is_empty());
}
