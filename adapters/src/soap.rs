//! SOAP adapter
//!
//! Wraps payloads in a minimal SOAP 1.1 envelope and always issues POST.
//! Successful responses are unwrapped back to the inner body; responses
//! that are not well-formed envelopes are returned as-is.

use crate::{
    auth::build_auth_headers,
    connector::{Headers, ProtocolAdapter, SendOutcome},
    Error, Result,
};
use async_trait::async_trait;
use bus_core::{ConnectionAuthentication, Protocol};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP adapter; `action` carries the SOAPAction header value
pub struct SoapAdapter {
    client: Client,
}

impl SoapAdapter {
    /// Create a SOAP adapter with the given request timeout
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Wrap a raw XML body in an envelope/body structure.
fn wrap_envelope(body: &[u8]) -> Result<String> {
    let inner = std::str::from_utf8(body).map_err(|e| Error::Envelope(e.to_string()))?;
    Ok(format!(
        "<soap:Envelope xmlns:soap=\"{ENVELOPE_NS}\"><soap:Body>{inner}</soap:Body></soap:Envelope>"
    ))
}

/// Extract the inner body from a SOAP response envelope.
fn extract_body(response: &str) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(response);
    loop {
        match reader
            .read_event()
            .map_err(|e| Error::Envelope(e.to_string()))?
        {
            Event::Start(e) if e.local_name().as_ref() == b"Body" => {
                let span = reader
                    .read_to_end(e.name())
                    .map_err(|e| Error::Envelope(e.to_string()))?;
                return Ok(response[span.start as usize..span.end as usize]
                    .trim()
                    .as_bytes()
                    .to_vec());
            }
            Event::Eof => return Err(Error::Envelope("no Body element".to_string())),
            _ => {}
        }
    }
}

#[async_trait]
impl ProtocolAdapter for SoapAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Soap
    }

    async fn send(
        &self,
        endpoint: &str,
        action: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<SendOutcome> {
        let envelope = wrap_envelope(body)?;

        debug!("SOAP POST {} (action: {})", endpoint, action);

        let mut request = self
            .client
            .post(endpoint)
            .header("Content-Type", "text/xml; charset=utf-8");
        if !action.is_empty() {
            request = request.header("SOAPAction", action);
        }
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .body(envelope)
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

        // Malformed-but-successful responses degrade to the raw body
        let unwrapped = std::str::from_utf8(&response_body)
            .ok()
            .and_then(|text| extract_body(text).ok())
            .unwrap_or_else(|| response_body.to_vec());

        Ok(SendOutcome {
            body: unwrapped,
            status,
        })
    }

    fn authenticate(&self, auth: &ConnectionAuthentication, _endpoint: &str) -> Result<Headers> {
        Ok(build_auth_headers(auth))
    }
}
