//! Thread-addressed message routing
//!
//! A message enters on a thread; the thread's group names the wire
//! protocol, and each thread route binds a direction to a concrete route on
//! an external system. Every route is attempted independently: a failing
//! route is recorded and logged, and its siblings still run.

use crate::{
    endpoint::build_endpoint,
    metrics::{ROUTE_DISPATCH_DURATION, ROUTE_DISPATCH_TOTAL},
    Error, Result, DEFAULT_DISPATCH_TIMEOUT_SECONDS,
};
use adapters::{AdapterRegistry, Headers, SendOutcome};
use bus_core::{ConfigStore, Direction, FileFormat, Protocol, Route, ThreadGroup, ThreadRoute};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Budget for a single outbound dispatch
    pub dispatch_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECONDS),
        }
    }
}

/// Outcome of one route attempt within a fan-out
#[derive(Debug)]
pub struct RouteDispatch {
    /// Route the attempt targeted
    pub route_id: Uuid,
    /// Send result; route-scoped failures land here instead of aborting
    /// the fan-out
    pub outcome: Result<SendOutcome>,
}

impl RouteDispatch {
    /// Whether this route attempt succeeded
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Message router
pub struct MessageRouter {
    store: Arc<dyn ConfigStore>,
    adapters: Arc<AdapterRegistry>,
    config: RouterConfig,
}

impl MessageRouter {
    /// Create a router over a configuration store and adapter registry
    pub fn new(store: Arc<dyn ConfigStore>, adapters: Arc<AdapterRegistry>) -> Self {
        Self::with_config(store, adapters, RouterConfig::default())
    }

    /// Create a router with explicit configuration
    pub fn with_config(
        store: Arc<dyn ConfigStore>,
        adapters: Arc<AdapterRegistry>,
        config: RouterConfig,
    ) -> Self {
        Self {
            store,
            adapters,
            config,
        }
    }

    /// Fan a message out to every route bound to (thread, direction).
    ///
    /// Thread resolution failures and an empty route set are fatal; every
    /// other failure is scoped to its route and recorded in the returned
    /// list. The call succeeds once all routes have been attempted.
    pub async fn route_message(
        &self,
        thread_id: Uuid,
        direction: Direction,
        payload: &[u8],
    ) -> Result<Vec<RouteDispatch>> {
        let (thread, group) = self.store.thread_with_group(thread_id).await?;

        let bindings = self
            .store
            .thread_routes_by_direction(thread_id, direction)
            .await?;
        if bindings.is_empty() {
            return Err(Error::NoRoute {
                thread_id,
                direction,
            });
        }

        info!(
            "routing message on thread {} ({}) to {} route(s)",
            thread.name,
            direction,
            bindings.len()
        );

        let mut dispatches = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let outcome = self.dispatch_route(&group, &binding, payload).await;
            if let Err(e) = &outcome {
                warn!("route {} dispatch failed: {}", binding.route_id, e);
            }
            dispatches.push(RouteDispatch {
                route_id: binding.route_id,
                outcome,
            });
        }

        Ok(dispatches)
    }

    /// Attempt a single route.
    async fn dispatch_route(
        &self,
        group: &ThreadGroup,
        binding: &ThreadRoute,
        payload: &[u8],
    ) -> Result<SendOutcome> {
        let route = self.store.route(binding.route_id).await?;
        let setting = self.store.connection_setting(route.system_id).await?;

        // The bus carries JSON internally; convert when the target expects
        // a different wire format
        let body = if binding.file_format != FileFormat::Json {
            formats::convert(payload, FileFormat::Json, binding.file_format)?
        } else {
            payload.to_vec()
        };

        let adapter = self.adapters.get(group.protocol)?;

        let mut headers = Headers::new();
        if let Some(auth_id) = setting.auth_id {
            let auth = self.store.connection_auth(auth_id).await?;
            headers.extend(adapter.authenticate(&auth, &setting.base_path)?);
        }

        let endpoint = build_endpoint(&setting, &route);
        let action = action_token(group.protocol, &route);

        let protocol_label = group.protocol.to_string();
        let started = Instant::now();
        let result = tokio::time::timeout(
            self.config.dispatch_timeout,
            adapter.send(&endpoint, &action, &headers, &body),
        )
        .await
        .map_err(|_| Error::Timeout {
            seconds: self.config.dispatch_timeout.as_secs(),
            operation: format!("dispatch to {endpoint}"),
        })?;

        ROUTE_DISPATCH_DURATION
            .with_label_values(&[&protocol_label])
            .observe(started.elapsed().as_secs_f64());
        let status_label = if result.is_ok() { "success" } else { "failure" };
        ROUTE_DISPATCH_TOTAL
            .with_label_values(&[&protocol_label, status_label])
            .inc();

        let outcome = result?;
        info!(
            "message sent to {} via {} (status: {})",
            route.name, group.protocol, outcome.status
        );
        Ok(outcome)
    }
}

/// Adapter-specific action token for a route.
fn action_token(protocol: Protocol, route: &Route) -> String {
    match protocol {
        // REST carries the HTTP verb
        Protocol::Rest => route.method.http_verb().to_string(),
        // SOAP carries the SOAPAction
        Protocol::Soap => route.path.clone(),
        // Queues use the default exchange
        Protocol::Amqp | Protocol::Tcp => String::new(),
    }
}
