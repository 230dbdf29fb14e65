//! Message router fan-out tests against local mock targets

use adapters::{AdapterConfig, AdapterRegistry};
use bus_core::{
    BrokerType, ConfigStore, ConnectionSetting, ConvertType, Direction, FileFormat, MemoryStore,
    Protocol, RestMethod, Route, System, Thread, ThreadGroup, ThreadRoute,
};
use routing::{Error, MessageRouter};
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    store: Arc<MemoryStore>,
    router: MessageRouter,
    thread_id: Uuid,
}

async fn rest_fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let group = store
        .create_thread_group(ThreadGroup::new("rest-out", Protocol::Rest, BrokerType::Rabbit))
        .await
        .unwrap();
    let thread = store
        .create_thread(Thread::new("orders", group.id, ConvertType::Multiplex))
        .await
        .unwrap();

    let registry = Arc::new(AdapterRegistry::new(AdapterConfig::default()).unwrap());
    let router = MessageRouter::new(store.clone() as Arc<dyn ConfigStore>, registry);

    Fixture {
        store,
        router,
        thread_id: thread.id,
    }
}

impl Fixture {
    /// Bind one outbound route on this fixture's thread.
    async fn add_target(
        &self,
        name: &str,
        base_path: &str,
        file_format: FileFormat,
        auth_id: Option<Uuid>,
    ) -> Uuid {
        let system = self.store.create_system(System::new(name)).await.unwrap();
        let route = self
            .store
            .create_route(Route::new(name, "/hook", RestMethod::Post, system.id))
            .await
            .unwrap();
        self.store
            .create_connection_setting(ConnectionSetting::new(
                format!("{name}-conn"),
                system.id,
                base_path,
                0,
                auth_id,
            ))
            .await
            .unwrap();
        self.store
            .create_thread_route(ThreadRoute {
                thread_id: self.thread_id,
                direction: Direction::Out,
                route_id: route.id,
                file_format,
                object_id: Uuid::new_v4(),
                routine_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        route.id
    }
}

#[tokio::test]
async fn fan_out_isolates_unreachable_targets() {
    let fixture = rest_fixture().await;
    let reachable = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&reachable)
        .await;

    // Nothing listens on port 9; the first route fails fast
    let dead_route = fixture
        .add_target("dead", "http://127.0.0.1:9", FileFormat::Json, None)
        .await;
    let live_route = fixture
        .add_target("live", &reachable.uri(), FileFormat::Json, None)
        .await;

    let dispatches = fixture
        .router
        .route_message(fixture.thread_id, Direction::Out, br#"{"id":1}"#)
        .await
        .unwrap();

    assert_eq!(dispatches.len(), 2);
    let dead = dispatches.iter().find(|d| d.route_id == dead_route).unwrap();
    let live = dispatches.iter().find(|d| d.route_id == live_route).unwrap();
    assert!(!dead.succeeded());
    assert!(live.succeeded());
}

#[tokio::test]
async fn missing_direction_fails_without_network_calls() {
    let fixture = rest_fixture().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // The binding is inbound; an outbound routing request finds nothing
    fixture
        .add_target("inbound-only", &server.uri(), FileFormat::Json, None)
        .await;
    let bindings = fixture
        .store
        .thread_routes_by_direction(fixture.thread_id, Direction::Out)
        .await
        .unwrap();
    assert_eq!(bindings.len(), 1);

    let err = fixture
        .router
        .route_message(fixture.thread_id, Direction::In, b"{}")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoRoute { .. }));
}

#[tokio::test]
async fn unknown_thread_is_a_configuration_error() {
    let fixture = rest_fixture().await;
    let err = fixture
        .router
        .route_message(Uuid::new_v4(), Direction::Out, b"{}")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn payload_converts_to_the_route_wire_format() {
    let fixture = rest_fixture().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_string_contains("<order_id>O1</order_id>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    fixture
        .add_target("xml-target", &server.uri(), FileFormat::Xml, None)
        .await;

    let dispatches = fixture
        .router
        .route_message(
            fixture.thread_id,
            Direction::Out,
            br#"{"order_id":"O1"}"#,
        )
        .await
        .unwrap();

    assert!(dispatches[0].succeeded());
}

#[tokio::test]
async fn auth_headers_are_attached_to_the_dispatch() {
    let fixture = rest_fixture().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let system = fixture
        .store
        .create_system(System::new("secured"))
        .await
        .unwrap();
    let auth = fixture
        .store
        .create_connection_auth(bus_core::ConnectionAuthentication::bearer(
            "crm-token",
            system.id,
            "tok-123",
        ))
        .await
        .unwrap();
    let route = fixture
        .store
        .create_route(Route::new("secured", "/hook", RestMethod::Post, system.id))
        .await
        .unwrap();
    fixture
        .store
        .create_connection_setting(ConnectionSetting::new(
            "secured-conn",
            system.id,
            server.uri(),
            0,
            Some(auth.id),
        ))
        .await
        .unwrap();
    fixture
        .store
        .create_thread_route(ThreadRoute {
            thread_id: fixture.thread_id,
            direction: Direction::Out,
            route_id: route.id,
            file_format: FileFormat::Json,
            object_id: Uuid::new_v4(),
            routine_id: Uuid::new_v4(),
        })
        .await
        .unwrap();

    let dispatches = fixture
        .router
        .route_message(fixture.thread_id, Direction::Out, b"{}")
        .await
        .unwrap();
    assert!(dispatches[0].succeeded());
}

#[tokio::test]
async fn broken_auth_reference_fails_only_that_route() {
    let fixture = rest_fixture().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // auth_id points at nothing; the route fails instead of dispatching
    // unauthenticated
    let route_id = fixture
        .add_target(
            "broken-auth",
            &server.uri(),
            FileFormat::Json,
            Some(Uuid::new_v4()),
        )
        .await;

    let dispatches = fixture
        .router
        .route_message(fixture.thread_id, Direction::Out, b"{}")
        .await
        .unwrap();

    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0].route_id, route_id);
    assert!(!dispatches[0].succeeded());
}

#[tokio::test]
async fn error_status_is_a_route_scoped_failure() {
    let fixture = rest_fixture().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    fixture
        .add_target("flaky", &server.uri(), FileFormat::Json, None)
        .await;

    let dispatches = fixture
        .router
        .route_message(fixture.thread_id, Direction::Out, b"{}")
        .await
        .unwrap();

    match &dispatches[0].outcome {
        Err(Error::Protocol(adapters::Error::Http { status, body })) => {
            assert_eq!(*status, 503);
            assert_eq!(body, "down");
        }
        other => panic!("expected Http protocol error, got {other:?}"),
    }
}
