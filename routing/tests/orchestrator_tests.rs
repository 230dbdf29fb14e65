//! End-to-end flow tests against local mock targets

use adapters::{AdapterConfig, AdapterRegistry};
use bus_core::{
    BrokerType, ConfigStore, ConnectionSetting, ConvertType, Direction, FileFormat, MemoryStore,
    Protocol, RestMethod, Route, System, Thread, ThreadGroup, ThreadRoute,
};
use routing::{Error, MessageRouter, Orchestrator, ProcessFlow, ProcessStep};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAYMENT_EVENT: &[u8] =
    br#"{"order_id":"O1","amount":1999,"currency":"usd","status":"succeeded","customer_id":"C1"}"#;

struct Fixture {
    store: Arc<MemoryStore>,
    orchestrator: Orchestrator,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(AdapterRegistry::new(AdapterConfig::default()).unwrap());
    let router = Arc::new(MessageRouter::new(
        store.clone() as Arc<dyn ConfigStore>,
        registry,
    ));
    let orchestrator = Orchestrator::new(router, store.clone() as Arc<dyn ConfigStore>);
    Fixture {
        store,
        orchestrator,
    }
}

impl Fixture {
    /// Register a system reachable at `base_path` with one outbound thread.
    async fn add_system(&self, name: &str, base_path: &str) {
        let group = self
            .store
            .create_thread_group(ThreadGroup::new(
                format!("{name}-group"),
                Protocol::Rest,
                BrokerType::Rabbit,
            ))
            .await
            .unwrap();
        let thread = self
            .store
            .create_thread(Thread::new(
                format!("{name}-out"),
                group.id,
                ConvertType::Multiplex,
            ))
            .await
            .unwrap();
        let system = self.store.create_system(System::new(name)).await.unwrap();
        let route = self
            .store
            .create_route(Route::new(
                format!("{name}-update"),
                "/update",
                RestMethod::Post,
                system.id,
            ))
            .await
            .unwrap();
        self.store
            .create_connection_setting(ConnectionSetting::new(
                format!("{name}-conn"),
                system.id,
                base_path,
                0,
                None,
            ))
            .await
            .unwrap();
        self.store
            .create_thread_route(ThreadRoute {
                thread_id: thread.id,
                direction: Direction::Out,
                route_id: route.id,
                file_format: FileFormat::Json,
                object_id: Uuid::new_v4(),
                routine_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn order_payment_flow_dispatches_both_steps_in_order() {
    let fixture = fixture().await;

    let sap = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_string_contains(r#""OrderNumber":"O1""#))
        .and(body_string_contains(r#""Amount":19.99"#))
        .and(body_string_contains(r#""PaymentGateway":"Stripe""#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sap)
        .await;

    let salesforce = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update"))
        .and(body_string_contains(r#""OrderId":"O1""#))
        .and(body_string_contains(r#""Status":"Paid""#))
        .and(body_string_contains(r#""AccountId":"C1""#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&salesforce)
        .await;

    fixture.add_system("SAP", &sap.uri()).await;
    fixture.add_system("Salesforce", &salesforce.uri()).await;

    fixture
        .orchestrator
        .execute_process("order_payment_flow", PAYMENT_EVENT)
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_process_is_rejected() {
    let fixture = fixture().await;
    let err = fixture
        .orchestrator
        .execute_process("refund_flow", PAYMENT_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownProcess(name) if name == "refund_flow"));
}

#[tokio::test]
async fn unparseable_payload_is_fatal() {
    let fixture = fixture().await;
    let err = fixture
        .orchestrator
        .execute_process("order_payment_flow", b"[1,2,3]")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidPayload(_)));
}

#[tokio::test]
async fn missing_first_target_system_is_fatal() {
    let fixture = fixture().await;
    let err = fixture
        .orchestrator
        .execute_process("order_payment_flow", PAYMENT_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn missing_optional_target_ends_the_flow_successfully() {
    let fixture = fixture().await;

    let sap = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sap)
        .await;

    // Only the first target exists; the CRM notify step is optional
    fixture.add_system("SAP", &sap.uri()).await;

    fixture
        .orchestrator
        .execute_process("order_payment_flow", PAYMENT_EVENT)
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_first_step_aborts_before_the_second() {
    let fixture = fixture().await;

    let sap = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("order rejected"))
        .expect(1)
        .mount(&sap)
        .await;

    let salesforce = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&salesforce)
        .await;

    fixture.add_system("SAP", &sap.uri()).await;
    fixture.add_system("Salesforce", &salesforce.uri()).await;

    let err = fixture
        .orchestrator
        .execute_process("order_payment_flow", PAYMENT_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn direction_mismatch_is_fatal() {
    let fixture = fixture().await;

    let group = fixture
        .store
        .create_thread_group(ThreadGroup::new("in-group", Protocol::Rest, BrokerType::Rabbit))
        .await
        .unwrap();
    let thread = fixture
        .store
        .create_thread(Thread::new("inbound", group.id, ConvertType::Multiplex))
        .await
        .unwrap();
    let system = fixture.store.create_system(System::new("SAP")).await.unwrap();
    let route = fixture
        .store
        .create_route(Route::new("sap-in", "/in", RestMethod::Post, system.id))
        .await
        .unwrap();
    // The only binding for the system's route is inbound
    fixture
        .store
        .create_thread_route(ThreadRoute {
            thread_id: thread.id,
            direction: Direction::In,
            route_id: route.id,
            file_format: FileFormat::Json,
            object_id: Uuid::new_v4(),
            routine_id: Uuid::new_v4(),
        })
        .await
        .unwrap();

    let err = fixture
        .orchestrator
        .execute_process("order_payment_flow", PAYMENT_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(msg) if msg.contains("direction mismatch")));
}

#[tokio::test]
async fn step_timeout_aborts_the_remainder_of_the_flow() {
    let fixture = fixture().await;

    let slow = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&slow)
        .await;

    let downstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&downstream)
        .await;

    fixture.add_system("SlowERP", &slow.uri()).await;
    fixture.add_system("Downstream", &downstream.uri()).await;

    let mut orchestrator = fixture.orchestrator;
    orchestrator.register(ProcessFlow {
        name: "tight_deadline_flow".to_string(),
        steps: vec![
            ProcessStep {
                name: "erp-update".to_string(),
                target_system: "SlowERP".to_string(),
                transform: |payload| payload.clone(),
                timeout: Duration::from_millis(100),
                optional: false,
            },
            ProcessStep {
                name: "notify".to_string(),
                target_system: "Downstream".to_string(),
                transform: |payload| payload.clone(),
                timeout: Duration::from_millis(100),
                optional: false,
            },
        ],
        soft_target: Duration::from_secs(5),
    });

    let err = orchestrator
        .execute_process("tight_deadline_flow", PAYMENT_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }));
}
