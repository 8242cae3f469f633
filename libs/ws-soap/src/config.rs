//! Configuration for the SOAP transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SoapError;

/// Default endpoint, matching the airline sample server layout.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/airline-server/services";

/// Default User-Agent string for SOAP requests
pub const DEFAULT_USER_AGENT: &str = concat!("ws-soap/", env!("CARGO_PKG_VERSION"));

const SOAP11_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SOAP12_NAMESPACE: &str = "http://www.w3.org/2003/05/soap-envelope";

/// SOAP protocol version used for the envelope and HTTP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoapVersion {
    #[default]
    Soap11,
    Soap12,
}

impl SoapVersion {
    /// Envelope namespace URI.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Soap11 => SOAP11_NAMESPACE,
            Self::Soap12 => SOAP12_NAMESPACE,
        }
    }

    /// `Content-Type` header value. SOAP 1.2 carries the action as a media
    /// type parameter; SOAP 1.1 sends it in a separate `SOAPAction` header.
    #[must_use]
    pub fn content_type(self, action: Option<&str>) -> String {
        match (self, action) {
            (Self::Soap11, _) => "text/xml; charset=utf-8".to_owned(),
            (Self::Soap12, None) => "application/soap+xml; charset=utf-8".to_owned(),
            (Self::Soap12, Some(action)) => {
                format!("application/soap+xml; charset=utf-8; action=\"{action}\"")
            }
        }
    }

    /// Whether an HTTP status may carry a fault envelope.
    ///
    /// SOAP 1.1 faults arrive with `500`; SOAP 1.2 sender faults use `400`.
    #[must_use]
    pub const fn is_fault_status(self, status: u16) -> bool {
        match self {
            Self::Soap11 => status == 500,
            Self::Soap12 => status == 500 || status == 400,
        }
    }
}

/// Check that an action URI can be sent inside a quoted header value.
///
/// # Errors
/// Returns [`SoapError::InvalidRequest`] if the action contains a double quote
/// or a control character.
pub fn validate_action(action: &str) -> Result<(), SoapError> {
    if action.chars().any(|c| c == '"' || c.is_control()) {
        return Err(SoapError::InvalidRequest(format!(
            "action {action:?} contains a quote or control character"
        )));
    }
    Ok(())
}

/// SOAP transport configuration.
///
/// Deadlines are enforced by the HTTP client; a request that does not complete
/// within `deadline` fails with [`SoapError::Timeout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoapClientConfig {
    /// Service endpoint URL (`http://` or `https://`).
    pub endpoint: String,

    /// SOAP version for envelopes and headers.
    pub version: SoapVersion,

    /// Timeout for establishing the TCP/TLS connection.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Deadline for the whole call, connect included.
    #[serde(with = "humantime_serde")]
    pub deadline: Duration,

    /// User-Agent header value.
    pub user_agent: String,

    /// Only look for faults in responses whose HTTP status signals one.
    ///
    /// When `false`, a `Fault` element in a `2xx` response body is also
    /// reported as a remote fault.
    pub check_connection_for_fault: bool,
}

impl Default for SoapClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            version: SoapVersion::default(),
            connect_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            check_connection_for_fault: true,
        }
    }
}

impl SoapClientConfig {
    /// Create a configuration for the given endpoint with default settings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: SoapVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Also detect faults in `2xx` responses.
    #[must_use]
    pub fn without_connection_fault_check(mut self) -> Self {
        self.check_connection_for_fault = false;
        self
    }

    /// Check the configuration before building a transport.
    ///
    /// # Errors
    /// Returns [`SoapError::InvalidConfig`] if the endpoint is not an HTTP(S)
    /// URL or a timeout is zero.
    pub fn validate(&self) -> Result<(), SoapError> {
        let endpoint = self.endpoint.trim();
        let scheme_ok = endpoint.starts_with("http://") || endpoint.starts_with("https://");
        if !scheme_ok {
            return Err(SoapError::InvalidConfig(format!(
                "endpoint '{}' must start with http:// or https://",
                self.endpoint
            )));
        }
        if self.deadline.is_zero() {
            return Err(SoapError::InvalidConfig("deadline must be positive".to_owned()));
        }
        if self.connect_timeout.is_zero() {
            return Err(SoapError::InvalidConfig(
                "connect_timeout must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_sane() {
        let cfg = SoapClientConfig::default();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.version, SoapVersion::Soap11);
        assert!(cfg.connect_timeout <= cfg.deadline);
        assert!(cfg.check_connection_for_fault);
        assert!(cfg.user_agent.starts_with("ws-soap/"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let cfg = SoapClientConfig::new("https://quotes.example.com/ws")
            .with_version(SoapVersion::Soap12)
            .with_connect_timeout(Duration::from_secs(2))
            .with_deadline(Duration::from_secs(5))
            .with_user_agent("stock-client/1.0")
            .without_connection_fault_check();

        assert_eq!(cfg.endpoint, "https://quotes.example.com/ws");
        assert_eq!(cfg.version, SoapVersion::Soap12);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(2));
        assert_eq!(cfg.deadline, Duration::from_secs(5));
        assert_eq!(cfg.user_agent, "stock-client/1.0");
        assert!(!cfg.check_connection_for_fault);
    }

    #[test]
    fn test_deserialize_with_humantime_and_defaults() {
        let cfg: SoapClientConfig = serde_json::from_value(serde_json::json!({
            "endpoint": "http://localhost:8080/mtom-server/services",
            "version": "soap12",
            "deadline": "1m 30s"
        }))
        .unwrap();

        assert_eq!(cfg.endpoint, "http://localhost:8080/mtom-server/services");
        assert_eq!(cfg.version, SoapVersion::Soap12);
        assert_eq!(cfg.deadline, Duration::from_secs(90));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(10));
        assert!(cfg.check_connection_for_fault);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<SoapClientConfig, _> =
            serde_json::from_value(serde_json::json!({"retries": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint_and_zero_timeouts() {
        let bad_scheme = SoapClientConfig::new("ftp://example.com");
        assert!(matches!(bad_scheme.validate(), Err(SoapError::InvalidConfig(_))));

        let zero_deadline = SoapClientConfig::default().with_deadline(Duration::ZERO);
        assert!(matches!(zero_deadline.validate(), Err(SoapError::InvalidConfig(_))));

        let zero_connect = SoapClientConfig::default().with_connect_timeout(Duration::ZERO);
        assert!(matches!(zero_connect.validate(), Err(SoapError::InvalidConfig(_))));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(
            SoapVersion::Soap11.content_type(Some("urn:x")),
            "text/xml; charset=utf-8"
        );
        assert_eq!(
            SoapVersion::Soap12.content_type(None),
            "application/soap+xml; charset=utf-8"
        );
        assert_eq!(
            SoapVersion::Soap12.content_type(Some("urn:GetQuote")),
            "application/soap+xml; charset=utf-8; action=\"urn:GetQuote\""
        );
    }

    #[test]
    fn test_validate_action() {
        assert!(validate_action("").is_ok());
        assert!(validate_action("http://www.springframework.org/spring-ws/samples/airline/GetFlights").is_ok());
        for bad in ["urn:a\"b", "urn:a\r\nX-Injected: 1", "urn:\ttab"] {
            assert!(
                matches!(validate_action(bad), Err(SoapError::InvalidRequest(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_fault_statuses() {
        assert!(SoapVersion::Soap11.is_fault_status(500));
        assert!(!SoapVersion::Soap11.is_fault_status(400));
        assert!(SoapVersion::Soap12.is_fault_status(400));
        assert!(SoapVersion::Soap12.is_fault_status(500));
        assert!(!SoapVersion::Soap12.is_fault_status(404));
    }
}
