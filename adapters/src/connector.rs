//! Protocol adapter contract

use crate::Result;
use async_trait::async_trait;
use bus_core::{ConnectionAuthentication, Protocol};
use std::collections::HashMap;

/// Request/response headers
pub type Headers = HashMap<String, String>;

/// Result of a dispatch
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Raw response body (synthetic for fire-and-forget protocols)
    pub body: Vec<u8>,
    /// Status code (200 for fire-and-forget protocols)
    pub status: u16,
}

/// Uniform send/authenticate contract implemented per wire protocol.
///
/// `action` is protocol-specific: the HTTP verb for REST, the SOAPAction for
/// SOAP, the exchange name for queues.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Protocol this adapter speaks
    fn protocol(&self) -> Protocol;

    /// Dispatch a payload to an endpoint
    async fn send(
        &self,
        endpoint: &str,
        action: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<SendOutcome>;

    /// Build request headers from credential material
    fn authenticate(&self, auth: &ConnectionAuthentication, endpoint: &str) -> Result<Headers>;
}
