use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use thiserror::Error;
use ws_call::{Fault, TransportFailure};

/// SOAP transport error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SoapError {
    /// No response within the configured deadline
    #[error("deadline of {} exceeded", format_deadline(.0))]
    Timeout(Duration),

    /// The service answered with a SOAP fault
    #[error("SOAP fault {0}")]
    Fault(Fault),

    /// Non-2xx HTTP status without a fault envelope
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// Transport error (DNS, connect, reset, I/O)
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The response could not be read as a SOAP envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response body is not valid UTF-8
    #[error("unreadable response body: {0}")]
    InvalidEncoding(String),

    /// The request could not be sent as configured (bad URL, unsupported scheme, proxy setup)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration rejected before any request was made
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SoapError {
    /// Map a ureq transport-level failure.
    pub(crate) fn from_transport(err: ureq::Transport, deadline: Duration) -> Self {
        if chain_has_timeout(&err) {
            return Self::Timeout(deadline);
        }
        match err.kind() {
            ureq::ErrorKind::InvalidUrl
            | ureq::ErrorKind::UnknownScheme
            | ureq::ErrorKind::InsecureRequestHttpsOnly
            | ureq::ErrorKind::InvalidProxyUrl
            | ureq::ErrorKind::ProxyUnauthorized => Self::InvalidRequest(err.to_string()),
            _ => Self::Transport(Box::new(err)),
        }
    }

    /// Map a failure while reading the response body.
    pub(crate) fn from_io(err: io::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(deadline);
        }
        if err.kind() == io::ErrorKind::InvalidData {
            return Self::InvalidEncoding(err.to_string());
        }
        Self::Transport(Box::new(err))
    }
}

fn format_deadline(deadline: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*deadline)
}

fn chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.is_timeout() {
                return true;
            }
        }
        current = e.source();
    }
    false
}

impl TransportFailure for SoapError {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    fn fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(fault) => Some(fault.clone()),
            _ => None,
        }
    }

    fn is_communication_failure(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Transport(_) | Self::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::fmt;
    use ws_call::{ClassifiedError, classify};

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.0)
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_timeout_found_deep_in_chain() {
        let err = Wrapper(io::Error::new(io::ErrorKind::TimedOut, "timed out reading response"));
        assert!(chain_has_timeout(&err));

        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(!chain_has_timeout(&err));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SoapError::Timeout(Duration::from_secs(30)).to_string(),
            "deadline of 30s exceeded"
        );
        assert_eq!(
            SoapError::Http {
                status: 503,
                reason: "Service Unavailable".to_owned()
            }
            .to_string(),
            "HTTP 503: Service Unavailable"
        );
        assert_eq!(
            SoapError::Fault(Fault::new("soap:Client", "bad")).to_string(),
            "SOAP fault soap:Client: bad"
        );
    }

    #[test]
    fn test_classification_of_each_variant() {
        assert_eq!(
            classify(&SoapError::Timeout(Duration::from_secs(1))),
            ClassifiedError::Timeout
        );
        assert_eq!(
            classify(&SoapError::Fault(Fault::new("c", "r"))),
            ClassifiedError::RemoteFault {
                code: "c".to_owned(),
                reason: "r".to_owned(),
            }
        );
        assert_eq!(
            classify(&SoapError::Http {
                status: 404,
                reason: "Not Found".to_owned()
            }),
            ClassifiedError::CommunicationFailure {
                message: "HTTP 404: Not Found".to_owned(),
            }
        );
        assert_eq!(
            classify(&SoapError::MalformedResponse("no Body".to_owned())),
            ClassifiedError::CommunicationFailure {
                message: "malformed response: no Body".to_owned(),
            }
        );
        assert_eq!(
            classify(&SoapError::Transport(Box::new(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset"
            )))),
            ClassifiedError::CommunicationFailure {
                message: "transport error: connection reset".to_owned(),
            }
        );
        assert_eq!(
            classify(&SoapError::InvalidEncoding("invalid utf-8 sequence".to_owned())),
            ClassifiedError::Unknown {
                message: "unreadable response body: invalid utf-8 sequence".to_owned(),
            }
        );
        assert_eq!(
            classify(&SoapError::InvalidRequest("bad url".to_owned())),
            ClassifiedError::Unknown {
                message: "invalid request: bad url".to_owned(),
            }
        );
    }

    #[test]
    fn test_from_io_maps_timeouts() {
        let deadline = Duration::from_millis(250);
        let err = SoapError::from_io(io::Error::new(io::ErrorKind::WouldBlock, "x"), deadline);
        assert!(matches!(err, SoapError::Timeout(d) if d == deadline));

        let err = SoapError::from_io(io::Error::new(io::ErrorKind::InvalidData, "not utf-8"), deadline);
        assert!(matches!(err, SoapError::InvalidEncoding(_)));

        let err = SoapError::from_io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"), deadline);
        assert!(matches!(err, SoapError::Transport(_)));
    }

    #[test]
    fn test_transport_preserves_source() {
        let err = SoapError::Transport(Box::new(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<io::Error>().is_some());
    }
}
