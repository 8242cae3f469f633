//! Blocking SOAP over HTTP transport.

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use ws_call::{AbortError, OperationDescriptor, Transport};

use crate::config::{SoapClientConfig, SoapVersion, validate_action};
use crate::envelope::{build_envelope, extract_body, parse_fault};
use crate::error::SoapError;

/// Largest response body read before giving up.
const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

fn duration_to_u64_ms(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// SOAP transport over a pooled blocking HTTP agent.
///
/// Requests carry XML body payloads as `String` and produce the response body
/// contents as `String`. The transport is `Sync`; one instance can serve many
/// threads. [`Transport::abort`] discards the connection pool so a connection
/// left half-open by a failed call is never reused.
pub struct SoapTransport {
    config: SoapClientConfig,
    agent: Mutex<ureq::Agent>,
    aborts: AtomicU64,
}

impl SoapTransport {
    /// Build a transport from a validated configuration.
    ///
    /// # Errors
    /// Returns [`SoapError::InvalidConfig`] if the configuration is rejected.
    pub fn new(config: SoapClientConfig) -> Result<Self, SoapError> {
        config.validate()?;
        let agent = build_agent(&config);

        tracing::info!(
            endpoint = %config.endpoint,
            version = ?config.version,
            connect_timeout_ms = duration_to_u64_ms(config.connect_timeout),
            deadline_ms = duration_to_u64_ms(config.deadline),
            "SOAP transport configured"
        );

        Ok(Self {
            config,
            agent: Mutex::new(agent),
            aborts: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SoapClientConfig {
        &self.config
    }

    /// How many times the connection pool has been discarded after a failure.
    #[must_use]
    pub fn abort_count(&self) -> u64 {
        self.aborts.load(Ordering::Relaxed)
    }

    /// Post one payload and interpret the response.
    ///
    /// # Errors
    /// Returns a [`SoapError`] describing why no response body was obtained.
    pub fn send(&self, operation: &str, action: Option<&str>, payload: &str) -> Result<String, SoapError> {
        if let Some(action) = action {
            validate_action(action)?;
        }
        let version = self.config.version;
        let envelope = build_envelope(version, payload);
        let agent = self.agent.lock().clone();

        tracing::debug!(
            operation,
            action,
            endpoint = %self.config.endpoint,
            bytes = envelope.len(),
            "sending SOAP request"
        );

        let mut request = agent
            .post(self.config.endpoint.trim())
            .set("Content-Type", &version.content_type(action))
            .set("Accept", "text/xml, application/soap+xml");
        if version == SoapVersion::Soap11 {
            request = request.set("SOAPAction", &format!("\"{}\"", action.unwrap_or_default()));
        }

        let response = match request.send_string(&envelope) {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(SoapError::from_transport(err, self.config.deadline));
            }
        };

        let status = response.status();
        let status_text = response.status_text().to_owned();
        let body = read_body(response, self.config.deadline)?;

        tracing::debug!(operation, status, bytes = body.len(), "received SOAP response");

        interpret_response(
            version,
            self.config.check_connection_for_fault,
            status,
            &status_text,
            &body,
        )
    }
}

/// Read the raw body and decode it as UTF-8. Invalid bytes are an error,
/// never replaced.
fn read_body(response: ureq::Response, deadline: std::time::Duration) -> Result<String, SoapError> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| SoapError::from_io(e, deadline))?;

    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_BODY_BYTES {
        return Err(SoapError::MalformedResponse(format!(
            "response body exceeds {MAX_BODY_BYTES} bytes"
        )));
    }

    String::from_utf8(bytes).map_err(|e| SoapError::InvalidEncoding(e.to_string()))
}

fn build_agent(config: &SoapClientConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout(config.deadline)
        .user_agent(&config.user_agent)
        .build()
}

/// Turn an HTTP response into a body payload or a [`SoapError`].
///
/// - `202`/`204` or an empty body: one-way response, empty payload
/// - fault status (`500`, or `400` under SOAP 1.2) with a `Fault`: remote fault
/// - any other non-2xx: HTTP error
/// - `2xx`: the `Body` contents; a `Fault` there only counts when
///   `check_connection_for_fault` is off
///
/// # Errors
/// See the rules above; a `2xx` document without a `Body` is
/// [`SoapError::MalformedResponse`].
pub fn interpret_response(
    version: SoapVersion,
    check_connection_for_fault: bool,
    status: u16,
    status_text: &str,
    body: &str,
) -> Result<String, SoapError> {
    if (200..300).contains(&status) {
        if status == 202 || status == 204 || body.trim().is_empty() {
            return Ok(String::new());
        }
        if !check_connection_for_fault {
            if let Some(fault) = parse_fault(body) {
                return Err(SoapError::Fault(fault));
            }
        }
        return extract_body(body).ok_or_else(|| {
            SoapError::MalformedResponse(format!("HTTP {status} response has no SOAP Body"))
        });
    }

    if version.is_fault_status(status) {
        if let Some(fault) = parse_fault(body) {
            return Err(SoapError::Fault(fault));
        }
    }

    Err(SoapError::Http {
        status,
        reason: if status_text.is_empty() {
            "unexpected status".to_owned()
        } else {
            status_text.to_owned()
        },
    })
}

impl Transport<String, String> for SoapTransport {
    type Error = SoapError;

    fn invoke(&self, op: &OperationDescriptor<String, String>) -> Result<String, SoapError> {
        self.send(op.name(), op.action(), op.request())
    }

    fn abort(&self) -> Result<(), AbortError> {
        let fresh = build_agent(&self.config);
        *self.agent.lock() = fresh;
        self.aborts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(endpoint = %self.config.endpoint, "discarded SOAP connection pool");
        Ok(())
    }
}
