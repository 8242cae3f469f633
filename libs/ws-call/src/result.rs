use serde::Serialize;

use crate::error::ClassifiedError;

/// Outcome of one remote call: the raw response or a classified error.
///
/// Unlike `Result`, a `CallResult` is data to be inspected and reported, not an
/// error to be propagated; use [`CallResult::into_result`] when `?` is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
#[must_use]
pub enum CallResult<T> {
    Success(T),
    Failure(ClassifiedError),
}

impl<T> CallResult<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The response, if the call succeeded.
    #[must_use]
    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The classified error, if the call failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }

    /// Transform the response, leaving failures untouched.
    pub fn map<U, F>(self, f: F) -> CallResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => CallResult::Success(f(value)),
            Self::Failure(err) => CallResult::Failure(err),
        }
    }

    /// Convert into a `Result` for `?`-style propagation.
    ///
    /// # Errors
    /// Returns the [`ClassifiedError`] when the call failed.
    pub fn into_result(self) -> Result<T, ClassifiedError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(err) => Err(err),
        }
    }
}

impl<T> From<CallResult<T>> for Result<T, ClassifiedError> {
    fn from(result: CallResult<T>) -> Self {
        result.into_result()
    }
}

impl<T> From<Result<T, ClassifiedError>> for CallResult<T> {
    fn from(result: Result<T, ClassifiedError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err),
        }
    }
}
