//! Tests for the descriptor -> action set builder

use entity_dispatch::prelude::*;
use entity_dispatch::testing::DispatchSpy;
use entity_dispatch::{assert_dispatched, assert_not_dispatched, count_dispatched};
use serde_json::{json, Value};

const NAME_MESSAGE: &str = "ACTION_BUILDER: the name parameter should be a string.";
const TYPE_MESSAGE: &str =
    "ACTION_BUILDER: the type parameter should be a string and the value one of these: load,save,delete.";
const SERVICE_MESSAGE: &str = "ACTION_BUILDER: the service parameter should be a function.";

fn resolving(value: Value) -> Service {
    Service::new(move |_| {
        let value = value.clone();
        async move { Ok(value) }
    })
}

fn rejecting(reason: Value) -> Service {
    Service::new(move |_| {
        let reason = reason.clone();
        async move { Err(reason) }
    })
}

fn error_message(descriptor: Descriptor) -> Option<String> {
    descriptor.build().err().map(|e| e.to_string())
}

#[test]
fn test_missing_descriptor() {
    assert_eq!(build(None).unwrap_err(), BuildError::MissingDescriptor);
}

#[test]
fn test_name_validation() {
    let bad_names = [Value::Null, json!(1), json!({}), json!([]), json!(true), json!("")];
    for name in bad_names {
        assert_eq!(
            error_message(Descriptor::new().name(name.clone())).as_deref(),
            Some(NAME_MESSAGE),
            "name {name:?} should be rejected"
        );
    }

    let message = error_message(Descriptor::new().name("test"));
    assert_ne!(message.as_deref(), Some(NAME_MESSAGE));
}

#[test]
fn test_type_validation() {
    let bad_types = [
        Value::Null,
        json!(1),
        json!({}),
        json!(""),
        json!("nimp"),
        json!("LOAD"),
    ];
    for kind in bad_types {
        assert_eq!(
            error_message(Descriptor::new().name("test").kind(kind.clone())).as_deref(),
            Some(TYPE_MESSAGE),
            "type {kind:?} should be rejected"
        );
    }

    for kind in ["load", "save", "delete"] {
        let message = error_message(Descriptor::new().name("test").kind(kind));
        assert_eq!(message.as_deref(), Some(SERVICE_MESSAGE));
    }
}

#[test]
fn test_service_validation() {
    let message = error_message(Descriptor::new().name("test").kind("load"));
    assert_eq!(message.as_deref(), Some(SERVICE_MESSAGE));

    let built = Descriptor::new()
        .name("test")
        .kind("load")
        .with_service(resolving(json!({"test": "test"})))
        .build();
    assert!(built.is_ok());
}

#[test]
fn test_earlier_check_wins() {
    // Everything is wrong: only the name error surfaces
    assert_eq!(
        error_message(Descriptor::new().name(1).kind("nimp")).as_deref(),
        Some(NAME_MESSAGE)
    );
    // Name fine, type and service wrong: only the type error surfaces
    assert_eq!(
        error_message(Descriptor::new().name("test").kind(1)).as_deref(),
        Some(TYPE_MESSAGE)
    );
}

fn test_actions(service: Service) -> EntityActions {
    Descriptor::new()
        .name("test")
        .kind("load")
        .with_service(service)
        .build()
        .unwrap()
}

#[test]
fn test_types_part() {
    let types = test_actions(resolving(json!({}))).types;

    let keys: Vec<_> = types.keys().collect();
    assert_eq!(keys, vec!["REQUEST_LOAD_TEST", "RESPONSE_LOAD_TEST", "ERROR_LOAD_TEST"]);
    for key in keys {
        assert_eq!(types.get(key), Some(key));
    }
}

#[test]
fn test_creators_part() {
    let creators = test_actions(resolving(json!({}))).creators;
    let payload = json!({"test": "test"});

    let request = creators.get("requestLoadTest").unwrap();
    let response = creators.get("responseLoadTest").unwrap();
    let error = creators.get("errorLoadTest").unwrap();

    assert_eq!(
        serde_json::to_value(request.create(payload.clone())).unwrap(),
        json!({
            "type": "REQUEST_LOAD_TEST",
            "payload": payload,
            "syncForm": true,
            "entityPath": "test"
        })
    );
    assert_eq!(
        serde_json::to_value(response.create(payload.clone())).unwrap(),
        json!({
            "type": "RESPONSE_LOAD_TEST",
            "payload": payload,
            "syncForm": true,
            "entityPath": "test"
        })
    );
    assert_eq!(
        serde_json::to_value(error.create(payload.clone())).unwrap(),
        json!({
            "type": "ERROR_LOAD_TEST",
            "payload": payload,
            "syncForm": true,
            "entityPath": "test"
        })
    );
}

#[test]
fn test_creators_are_pure() {
    let creators = test_actions(resolving(json!({}))).creators;
    let payload = json!({"id": 3});

    assert_eq!(
        creators.response().create(payload.clone()),
        creators.response().create(payload)
    );
}

#[test]
fn test_building_twice_is_equivalent() {
    let descriptor = Descriptor::new()
        .name("test")
        .kind("load")
        .with_service(resolving(json!({})));

    let first = descriptor.clone().build().unwrap();
    let second = descriptor.build().unwrap();

    assert_eq!(first.types, second.types);
    assert_eq!(first.creators, second.creators);
    assert_eq!(first.action.entity_path(), second.action.entity_path());
}

#[tokio::test]
async fn test_action_with_successful_service() {
    let actions = test_actions(resolving(json!({"testValue": "tests"})));
    let spy = DispatchSpy::new();

    let state = actions.action.call(vec![]).run(spy.clone()).await;

    assert_eq!(state, ThunkState::Succeeded);
    assert_eq!(spy.call_count(), 2);
    assert_eq!(
        serde_json::to_value(spy.calls()).unwrap(),
        json!([
            {"type": "REQUEST_LOAD_TEST", "syncForm": true, "entityPath": "test"},
            {
                "type": "RESPONSE_LOAD_TEST",
                "payload": {"testValue": "tests"},
                "syncForm": true,
                "entityPath": "test"
            }
        ])
    );
}

#[tokio::test]
async fn test_action_with_failing_service() {
    let actions = test_actions(rejecting(json!({"error": "error"})));
    let spy = DispatchSpy::new();

    let state = actions
        .action
        .call(vec![json!({"id": "test"})])
        .run(spy.clone())
        .await;

    assert_eq!(state, ThunkState::Failed);
    let calls = spy.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(count_dispatched!(calls, "ERROR_LOAD_TEST"), 1);
    assert_not_dispatched!(calls, "RESPONSE_LOAD_TEST");
    assert!(spy.called_with(&EntityAction::with_payload(
        "ERROR_LOAD_TEST",
        json!({"error": "error"}),
        "test"
    )));
}

#[tokio::test]
async fn test_concurrent_invocations_stay_independent() {
    let actions = Descriptor::new()
        .name("test")
        .kind("load")
        .service(|args| async move {
            tokio::task::yield_now().await;
            match args.first() {
                Some(Value::Bool(true)) => Ok(json!("ok")),
                _ => Err(json!("ko")),
            }
        })
        .build()
        .unwrap();

    let ok_spy = DispatchSpy::new();
    let ko_spy = DispatchSpy::new();

    let (ok, ko) = tokio::join!(
        actions.action.call(vec![json!(true)]).run(ok_spy.clone()),
        actions.action.call(vec![json!(false)]).run(ko_spy.clone()),
    );

    assert_eq!(ok, ThunkState::Succeeded);
    assert_eq!(ko, ThunkState::Failed);

    assert_eq!(ok_spy.types(), vec!["REQUEST_LOAD_TEST", "RESPONSE_LOAD_TEST"]);
    assert_eq!(ko_spy.types(), vec!["REQUEST_LOAD_TEST", "ERROR_LOAD_TEST"]);
    assert_eq!(ok_spy.last().and_then(|a| a.payload), Some(json!("ok")));
    assert_eq!(ko_spy.last().and_then(|a| a.payload), Some(json!("ko")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_thunks_on_multi_thread_runtime() {
    let actions = test_actions(resolving(json!(1)));
    let spy = DispatchSpy::new();

    let handles: Vec<_> = (0..4)
        .map(|_| tokio::spawn(actions.action.call(vec![]).run(spy.clone())))
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), ThunkState::Succeeded);
    }

    let calls = spy.calls();
    assert_eq!(count_dispatched!(calls, "REQUEST_LOAD_TEST"), 4);
    assert_eq!(count_dispatched!(calls, "RESPONSE_LOAD_TEST"), 4);
    assert_dispatched!(calls, "RESPONSE_LOAD_TEST");
}
