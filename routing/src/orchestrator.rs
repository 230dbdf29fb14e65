//! Declarative process orchestration
//!
//! A flow is an ordered list of steps; each step names a target system, a
//! payload transform, and a timeout. The engine walks the steps strictly in
//! order: a step's dispatch must complete before the next step starts, and
//! any step failure aborts the remainder: no retries, no compensation.
//! Already-dispatched steps stay dispatched.

use crate::{
    metrics::{PROCESS_FLOW_DURATION, PROCESS_FLOW_TOTAL},
    router::MessageRouter,
    Error, Result, DEFAULT_STEP_TIMEOUT_SECONDS,
};
use bus_core::{ConfigStore, Direction, System};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Payload transform applied before a step's dispatch
pub type TransformFn = fn(&Map<String, Value>) -> Map<String, Value>;

/// One step of a flow
pub struct ProcessStep {
    /// Step name (for logs and errors)
    pub name: String,
    /// Exact name of the system the step dispatches to
    pub target_system: String,
    /// Shapes the running payload into the target's schema
    pub transform: TransformFn,
    /// Budget for the step's dispatch
    pub timeout: Duration,
    /// Optional steps end the flow successfully when their target system
    /// is not configured
    pub optional: bool,
}

/// A named, fixed sequence of cross-system dispatches
pub struct ProcessFlow {
    /// Flow name as callers address it
    pub name: String,
    /// Steps in execution order
    pub steps: Vec<ProcessStep>,
    /// Total-elapsed soft target; exceeding it logs a warning
    pub soft_target: Duration,
}

impl ProcessFlow {
    /// The order payment flow: payment event → order update → CRM notify.
    pub fn order_payment_flow() -> Self {
        let step_timeout = Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECONDS);
        Self {
            name: "order_payment_flow".to_string(),
            steps: vec![
                ProcessStep {
                    name: "order-update".to_string(),
                    target_system: "SAP".to_string(),
                    transform: payment_to_order,
                    timeout: step_timeout,
                    optional: false,
                },
                ProcessStep {
                    name: "crm-notify".to_string(),
                    target_system: "Salesforce".to_string(),
                    transform: order_to_crm,
                    timeout: step_timeout,
                    optional: true,
                },
            ],
            soft_target: Duration::from_secs(5),
        }
    }
}

/// Map a payment event onto the order schema.
///
/// Amounts arrive in minor units and leave as major units; unrecognized
/// fields are dropped.
pub fn payment_to_order(payment: &Map<String, Value>) -> Map<String, Value> {
    let mut order = Map::new();

    if let Some(order_id) = payment.get("order_id").and_then(Value::as_str) {
        order.insert("OrderNumber".to_string(), json!(order_id));
    }
    if let Some(amount) = payment.get("amount").and_then(Value::as_f64) {
        order.insert("Amount".to_string(), json!(amount / 100.0));
    }
    if let Some(currency) = payment.get("currency").and_then(Value::as_str) {
        order.insert("Currency".to_string(), json!(currency));
    }
    if let Some(status) = payment.get("status").and_then(Value::as_str) {
        order.insert("PaymentStatus".to_string(), json!(status));
    }
    if let Some(customer_id) = payment.get("customer_id").and_then(Value::as_str) {
        order.insert("CustomerID".to_string(), json!(customer_id));
    }

    order.insert("PaymentGateway".to_string(), json!("Stripe"));
    order.insert("Timestamp".to_string(), json!(rfc3339_now()));

    order
}

/// Map the order schema onto the CRM schema.
pub fn order_to_crm(order: &Map<String, Value>) -> Map<String, Value> {
    let mut crm = Map::new();

    if let Some(order_number) = order.get("OrderNumber").and_then(Value::as_str) {
        crm.insert("OrderId".to_string(), json!(order_number));
    }
    if let Some(status) = order.get("PaymentStatus").and_then(Value::as_str) {
        let mapped = if status == "succeeded" { "Paid" } else { status };
        crm.insert("Status".to_string(), json!(mapped));
    }
    if let Some(amount) = order.get("Amount").and_then(Value::as_f64) {
        crm.insert("Amount".to_string(), json!(amount));
    }
    if let Some(currency) = order.get("Currency").and_then(Value::as_str) {
        crm.insert("Currency".to_string(), json!(currency));
    }
    if let Some(customer_id) = order.get("CustomerID").and_then(Value::as_str) {
        crm.insert("AccountId".to_string(), json!(customer_id));
    }

    crm.insert("LastModifiedDate".to_string(), json!(rfc3339_now()));

    crm
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Process orchestrator
pub struct Orchestrator {
    router: Arc<MessageRouter>,
    store: Arc<dyn ConfigStore>,
    flows: HashMap<String, ProcessFlow>,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in flows registered
    pub fn new(router: Arc<MessageRouter>, store: Arc<dyn ConfigStore>) -> Self {
        let mut orchestrator = Self {
            router,
            store,
            flows: HashMap::new(),
        };
        orchestrator.register(ProcessFlow::order_payment_flow());
        orchestrator
    }

    /// Register a flow under its name
    pub fn register(&mut self, flow: ProcessFlow) {
        self.flows.insert(flow.name.clone(), flow);
    }

    /// Execute a named flow over an initial payload.
    pub async fn execute_process(&self, process_name: &str, payload: &[u8]) -> Result<()> {
        let flow = self
            .flows
            .get(process_name)
            .ok_or_else(|| Error::UnknownProcess(process_name.to_string()))?;

        info!("starting process: {}", process_name);
        let started = Instant::now();

        let result = self.run_flow(flow, payload).await;

        let elapsed = started.elapsed();
        PROCESS_FLOW_DURATION
            .with_label_values(&[process_name])
            .observe(elapsed.as_secs_f64());
        PROCESS_FLOW_TOTAL
            .with_label_values(&[
                process_name,
                if result.is_ok() { "success" } else { "failure" },
            ])
            .inc();

        match &result {
            Ok(()) => {
                info!("process {} completed in {:?}", process_name, elapsed);
                if elapsed > flow.soft_target {
                    warn!(
                        "process {} took longer than its {:?} target",
                        process_name, flow.soft_target
                    );
                }
            }
            Err(e) => warn!("process {} failed: {}", process_name, e),
        }

        result
    }

    async fn run_flow(&self, flow: &ProcessFlow, payload: &[u8]) -> Result<()> {
        // Parse failure is fatal before any step runs
        let mut current: Map<String, Value> = serde_json::from_slice(payload)?;

        for step in &flow.steps {
            let Some(system) = self.find_system(&step.target_system).await? else {
                if step.optional {
                    info!(
                        "system {} not configured, skipping step {} and ending flow",
                        step.target_system, step.name
                    );
                    return Ok(());
                }
                return Err(Error::Configuration(format!(
                    "system not found: {}",
                    step.target_system
                )));
            };

            current = (step.transform)(&current);
            let body = serde_json::to_vec(&Value::Object(current.clone()))?;

            let thread_id = self.dispatch_thread(system.id, Direction::Out).await?;

            info!(
                "step {}: dispatching to {} via thread {}",
                step.name, step.target_system, thread_id
            );

            let dispatches = tokio::time::timeout(
                step.timeout,
                self.router.route_message(thread_id, Direction::Out, &body),
            )
            .await
            .map_err(|_| Error::Timeout {
                seconds: step.timeout.as_secs(),
                operation: format!("step {}", step.name),
            })??;

            // The flow needs its dispatch confirmed before moving on; a
            // failed route outcome fails the step with its own error
            for dispatch in dispatches {
                if let Err(e) = dispatch.outcome {
                    return Err(e);
                }
            }

            info!("step {} confirmed by {}", step.name, step.target_system);
        }

        Ok(())
    }

    /// Exact-name system lookup; the first match in name order wins.
    async fn find_system(&self, name: &str) -> Result<Option<System>> {
        let systems = self.store.systems().await?;
        let mut matches = systems.into_iter().filter(|s| s.name == name);
        let first = matches.next();
        if matches.next().is_some() {
            warn!("multiple systems named {}, using the first", name);
        }
        Ok(first)
    }

    /// Resolve the thread a system is dispatched through: the system's
    /// first route must be bound to a thread in the given direction.
    async fn dispatch_thread(&self, system_id: Uuid, direction: Direction) -> Result<Uuid> {
        let routes = self.store.routes_by_system(system_id).await?;
        let route = routes.first().ok_or_else(|| {
            Error::Configuration(format!("no routes found for system {system_id}"))
        })?;

        let binding = self.store.thread_route_by_route(route.id).await?;
        if binding.direction != direction {
            return Err(Error::Configuration(format!(
                "thread route direction mismatch: expected {}, got {}",
                direction, binding.direction
            )));
        }

        Ok(binding.thread_id)
    }
}
