//! REST adapter

use crate::{
    auth::build_auth_headers,
    connector::{Headers, ProtocolAdapter, SendOutcome},
    Error, Result,
};
use async_trait::async_trait;
use bus_core::{ConnectionAuthentication, Protocol};
use reqwest::{header::CONTENT_TYPE, Client, Method};
use std::time::Duration;
use tracing::debug;

/// REST adapter; `action` carries the HTTP verb
pub struct RestAdapter {
    client: Client,
}

impl RestAdapter {
    /// Create a REST adapter with the given request timeout
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ProtocolAdapter for RestAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Rest
    }

    async fn send(
        &self,
        endpoint: &str,
        action: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<SendOutcome> {
        let method = if action.is_empty() {
            Method::POST
        } else {
            Method::from_bytes(action.to_uppercase().as_bytes())
                .map_err(|_| Error::InvalidMethod(action.to_string()))?
        };

        debug!("REST {} {}", method, endpoint);

        let mut request = self.client.request(method, endpoint);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        if !body.is_empty() {
            let has_content_type = headers
                .keys()
                .any(|key| key.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                request = request.header(CONTENT_TYPE, "application/json");
            }
            request = request.body(body.to_vec());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let response_body = response
            .bytes()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        if status >= 400 {
            return Err(Error::Http {
                status,
                body: String::from_utf8_lossy(&response_body).into_owned(),
            });
        }

        Ok(SendOutcome {
            body: response_body.to_vec(),
            status,
        })
    }

    fn authenticate(&self, auth: &ConnectionAuthentication, _endpoint: &str) -> Result<Headers> {
        Ok(build_auth_headers(auth))
    }
}
