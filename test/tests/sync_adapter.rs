//! Sync adapter contract: message naming, address and payload resolution,
//! and the two delivery modes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::{json, Value};

use bindsync_shared::{
    sync, AddressSource, Connection, ConnectionRef, EntityConfig, SyncError, SyncMethod,
    SyncModel, SyncOptions,
};
use bindsync_test::{MemorySocket, TestModel};

fn single_mode_model(route: &str, attrs: Value) -> (SyncModel<TestModel>, Rc<MemorySocket>) {
    let socket = MemorySocket::standalone();
    let connection: ConnectionRef = socket.clone();
    let model = SyncModel::new(TestModel::new(route, attrs), EntityConfig::client(connection));
    (model, socket)
}

#[test]
fn update_message_is_named_namespace_update() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "42" }));
    sync(SyncMethod::Update, Some(&model), SyncOptions::new()).unwrap();
    assert_eq!(socket.sent()[0].0, "widgets:update");
}

#[test]
fn leading_separator_in_address_is_insignificant() {
    let (model, socket) = single_mode_model("/widgets", json!({ "id": "42" }));
    sync(SyncMethod::Update, Some(&model), SyncOptions::new()).unwrap();
    assert_eq!(socket.sent()[0].0, "widgets:update");
}

#[test]
fn each_method_maps_to_its_verb() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "1" }));
    for method in [
        SyncMethod::Create,
        SyncMethod::Read,
        SyncMethod::Update,
        SyncMethod::Delete,
    ] {
        sync(method, Some(&model), SyncOptions::new()).unwrap();
    }
    let names: Vec<String> = socket.sent().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec!["widgets:create", "widgets:read", "widgets:update", "widgets:delete"]
    );
}

#[test]
fn explicit_option_address_wins_over_entity_address() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "1" }));
    let options = SyncOptions::new().with_url("boxes/7");
    sync(SyncMethod::Create, Some(&model), options).unwrap();
    assert_eq!(socket.sent()[0].0, "boxes:create");
}

#[test]
fn address_provider_is_invoked_at_resolution_time() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "1" }));
    let options = SyncOptions::new()
        .with_url(AddressSource::Provider(Box::new(|| "crates/3".into())));
    sync(SyncMethod::Read, Some(&model), options).unwrap();
    assert_eq!(socket.sent()[0].0, "crates:read");
}

#[test]
fn payload_defaults_to_serialized_attributes() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "42", "title": "a" }));
    sync(SyncMethod::Update, Some(&model), SyncOptions::new()).unwrap();
    assert_eq!(
        socket.sent_named("widgets:update"),
        vec![json!({ "id": "42", "title": "a" })]
    );
}

#[test]
fn explicit_option_payload_wins() {
    let (model, socket) = single_mode_model("widgets", json!({ "id": "42" }));
    let options = SyncOptions::new().with_data(json!({ "only": "this" }));
    sync(SyncMethod::Update, Some(&model), options).unwrap();
    assert_eq!(
        socket.sent_named("widgets:update"),
        vec![json!({ "only": "this" })]
    );
}

#[test]
fn unresolvable_address_is_an_explicit_error() {
    let socket = MemorySocket::standalone();
    let connection: ConnectionRef = socket.clone();
    let model = SyncModel::new(
        TestModel::detached(json!({ "id": "1" })),
        EntityConfig::client(connection),
    );
    let result = sync(SyncMethod::Update, Some(&model), SyncOptions::new());
    assert_eq!(result, Err(SyncError::NoAddress));
    assert!(socket.sent().is_empty());
}

#[test]
fn no_entity_and_no_url_is_an_explicit_error() {
    let result = sync(SyncMethod::Create, None, SyncOptions::new());
    assert_eq!(result, Err(SyncError::NoAddress));
}

#[test]
fn missing_connection_is_an_explicit_error() {
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::default(),
    );
    let result = sync(SyncMethod::Update, Some(&model), SyncOptions::new());
    assert_eq!(result, Err(SyncError::NoConnection));
}

#[test]
fn single_mode_routes_ack_data_to_success_callback() {
    let (ours, theirs) = MemorySocket::pair();
    let connection: ConnectionRef = ours.clone();
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::client(connection),
    );
    theirs.on(
        "widgets:update",
        Rc::new(|_, ack| {
            if let Some(ack) = ack {
                ack(Ok(json!({ "saved": true })));
            }
        }),
    );

    let received = Rc::new(RefCell::new(None));
    let slot = received.clone();
    let options = SyncOptions::new().on_success(move |data| *slot.borrow_mut() = Some(data));
    sync(SyncMethod::Update, Some(&model), options).unwrap();
    assert_eq!(*received.borrow(), Some(json!({ "saved": true })));
}

#[test]
fn single_mode_routes_ack_error_to_error_callback() {
    let (ours, theirs) = MemorySocket::pair();
    let connection: ConnectionRef = ours.clone();
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::client(connection),
    );
    theirs.on(
        "widgets:update",
        Rc::new(|_, ack| {
            if let Some(ack) = ack {
                ack(Err("rejected".to_string()));
            }
        }),
    );

    let received = Rc::new(RefCell::new(None));
    let slot = received.clone();
    let options = SyncOptions::new().on_error(move |err| *slot.borrow_mut() = Some(err));
    sync(SyncMethod::Update, Some(&model), options).unwrap();
    assert_eq!(*received.borrow(), Some("rejected".to_string()));
}

#[test]
fn fan_out_emits_on_every_attached_connection() {
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::server(),
    );
    let sockets = [
        MemorySocket::standalone(),
        MemorySocket::standalone(),
        MemorySocket::standalone(),
    ];
    for socket in &sockets {
        let connection: ConnectionRef = socket.clone();
        model.core().attach(&connection);
    }

    sync(SyncMethod::Update, Some(&model), SyncOptions::new()).unwrap();
    for socket in &sockets {
        assert_eq!(socket.sent_named("widgets:update").len(), 1);
    }
}

#[test]
fn detached_connection_receives_nothing() {
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::server(),
    );
    let kept = MemorySocket::standalone();
    let dropped = MemorySocket::standalone();
    for socket in [&kept, &dropped] {
        let connection: ConnectionRef = socket.clone();
        model.core().attach(&connection);
    }
    model.core().detach(&dropped.id());

    sync(SyncMethod::Update, Some(&model), SyncOptions::new()).unwrap();
    assert_eq!(kept.sent_named("widgets:update").len(), 1);
    assert!(dropped.sent().is_empty());
}

#[test]
fn fan_out_ack_errors_are_not_routed_to_callbacks() {
    let (ours, theirs) = MemorySocket::pair();
    let model = SyncModel::new(
        TestModel::new("widgets", json!({ "id": "1" })),
        EntityConfig::server(),
    );
    let connection: ConnectionRef = ours.clone();
    model.core().attach(&connection);
    theirs.on(
        "widgets:update",
        Rc::new(|_, ack| {
            if let Some(ack) = ack {
                ack(Err("boom".to_string()));
            }
        }),
    );

    let error_called = Rc::new(Cell::new(false));
    let flag = error_called.clone();
    let options = SyncOptions::new().on_error(move |_| flag.set(true));
    sync(SyncMethod::Update, Some(&model), options).unwrap();
    assert!(!error_called.get());
}
