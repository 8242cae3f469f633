//! Failure classification.
//!
//! Precedence, first match wins:
//! 1. timeout
//! 2. remote fault (code + reason from the peer)
//! 3. communication breakdown
//! 4. anything else
//!
//! The function is total: every transport error lands in exactly one kind.

use crate::error::{ClassifiedError, TransportFailure};

/// Classify a transport error into a [`ClassifiedError`].
#[must_use]
pub fn classify<E>(err: &E) -> ClassifiedError
where
    E: TransportFailure + ?Sized,
{
    if err.is_timeout() {
        return ClassifiedError::Timeout;
    }

    if let Some(fault) = err.fault() {
        return ClassifiedError::from(fault);
    }

    if err.is_communication_failure() {
        return ClassifiedError::CommunicationFailure {
            message: err.to_string(),
        };
    }

    ClassifiedError::Unknown {
        message: err.to_string(),
    }
}
