use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// Error returned by a failed [`crate::Transport::abort`].
///
/// Abort failures are logged and discarded by the executor; they never replace
/// the classified error of the call itself.
pub type AbortError = Box<dyn std::error::Error + Send + Sync>;

/// A structured fault raised by the remote peer.
///
/// Code and reason always travel together; there is no way to build a fault
/// from only one of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fault {
    /// Fault code as sent by the peer (e.g. `soap:Client`, `Client.AuthenticationFailed`)
    pub code: String,
    /// Human-readable fault reason (SOAP 1.1 `faultstring`, SOAP 1.2 `Reason/Text`)
    pub reason: String,
}

impl Fault {
    #[must_use]
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

/// The discrimination surface a transport error must expose so it can be
/// classified.
///
/// All predicates default to "no", which makes a bare implementation classify
/// as [`ClassifiedError::Unknown`]. The error's `Display` output becomes the
/// message of communication and unknown failures.
pub trait TransportFailure: fmt::Display {
    /// No response arrived within the transport's configured deadline.
    fn is_timeout(&self) -> bool {
        false
    }

    /// The peer explicitly rejected or faulted the request.
    fn fault(&self) -> Option<Fault> {
        None
    }

    /// Lower-level breakdown: connection reset, DNS failure, malformed envelope.
    fn is_communication_failure(&self) -> bool {
        false
    }
}

impl<E: TransportFailure + ?Sized> TransportFailure for Box<E> {
    fn is_timeout(&self) -> bool {
        (**self).is_timeout()
    }

    fn fault(&self) -> Option<Fault> {
        (**self).fault()
    }

    fn is_communication_failure(&self) -> bool {
        (**self).is_communication_failure()
    }
}

/// A ready-made transport error for transports that have no error type of
/// their own (closures, in-process stubs, test doubles).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Deadline exceeded before a response was received
    #[error("deadline exceeded")]
    Timeout,

    /// Remote peer returned a fault
    #[error("remote fault {0}")]
    Fault(Fault),

    /// Connection reset, DNS failure, malformed envelope and the like
    #[error("{0}")]
    Communication(String),

    /// Anything the transport could not categorise
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    #[must_use]
    pub fn fault(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fault(Fault::new(code, reason))
    }

    #[must_use]
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication(message.into())
    }

    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl TransportFailure for TransportError {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    fn fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(fault) => Some(fault.clone()),
            _ => None,
        }
    }

    fn is_communication_failure(&self) -> bool {
        matches!(self, Self::Communication(_))
    }
}

impl TransportFailure for io::Error {
    fn is_timeout(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
        )
    }

    fn is_communication_failure(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof
                | io::ErrorKind::AddrNotAvailable
                | io::ErrorKind::HostUnreachable
                | io::ErrorKind::NetworkUnreachable
        )
    }
}

/// Discriminant of a [`ClassifiedError`], for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    RemoteFault,
    CommunicationFailure,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RemoteFault => "remote_fault",
            Self::CommunicationFailure => "communication_failure",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of classifying a failed call.
///
/// Exactly one of four kinds, built once at the failure site and never
/// mutated afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedError {
    /// No response within the transport's deadline
    #[error("operation timed out")]
    Timeout,

    /// The remote peer faulted the request
    #[error("remote fault {code}: {reason}")]
    RemoteFault { code: String, reason: String },

    /// The channel to the peer broke down
    #[error("communication failure: {message}")]
    CommunicationFailure { message: String },

    /// Anything else
    #[error("unknown failure: {message}")]
    Unknown { message: String },
}

impl ClassifiedError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::Timeout,
            Self::RemoteFault { .. } => ErrorKind::RemoteFault,
            Self::CommunicationFailure { .. } => ErrorKind::CommunicationFailure,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The peer's fault, if this is a [`ClassifiedError::RemoteFault`].
    #[must_use]
    pub fn as_fault(&self) -> Option<Fault> {
        match self {
            Self::RemoteFault { code, reason } => Some(Fault::new(code.clone(), reason.clone())),
            _ => None,
        }
    }
}

impl From<Fault> for ClassifiedError {
    fn from(fault: Fault) -> Self {
        Self::RemoteFault {
            code: fault.code,
            reason: fault.reason,
        }
    }
}
