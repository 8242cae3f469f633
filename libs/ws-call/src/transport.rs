//! # Transport capability
//!
//! The only thing the executor knows about the network: something that takes an
//! [`OperationDescriptor`] and either produces a response or fails with an error
//! that can be classified.
//!
//! - **Opaque blocking**: `invoke` may block on I/O. Deadlines are the transport's
//!   own configuration; the executor never starts timers.
//! - **Optional abort**: transports holding in-flight resources override `abort`
//!   to release them after a failure. The default does nothing.
//! - **Shared use**: methods take `&self` so one transport can serve concurrent
//!   callers when it is `Sync`.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptor::OperationDescriptor;
use crate::error::{AbortError, TransportFailure};

/// A synchronous transport able to invoke operations taking `Req` and
/// producing `Res`.
pub trait Transport<Req, Res> {
    /// Error raised by `invoke`. Must be classifiable.
    type Error: TransportFailure;

    /// Perform the remote call.
    ///
    /// # Errors
    /// Returns `Self::Error` when no usable response was obtained.
    fn invoke(&self, op: &OperationDescriptor<Req, Res>) -> Result<Res, Self::Error>;

    /// Release in-flight resources after a failed call.
    ///
    /// Called at most once per failed `invoke`, never after a success.
    ///
    /// # Errors
    /// Failures are logged and ignored by the executor. A panic is caught and
    /// treated the same way.
    fn abort(&self) -> Result<(), AbortError> {
        Ok(())
    }
}

impl<Req, Res, T> Transport<Req, Res> for &T
where
    T: Transport<Req, Res> + ?Sized,
{
    type Error = T::Error;

    fn invoke(&self, op: &OperationDescriptor<Req, Res>) -> Result<Res, Self::Error> {
        (**self).invoke(op)
    }

    fn abort(&self) -> Result<(), AbortError> {
        (**self).abort()
    }
}

impl<Req, Res, T> Transport<Req, Res> for Arc<T>
where
    T: Transport<Req, Res> + ?Sized,
{
    type Error = T::Error;

    fn invoke(&self, op: &OperationDescriptor<Req, Res>) -> Result<Res, Self::Error> {
        (**self).invoke(op)
    }

    fn abort(&self) -> Result<(), AbortError> {
        (**self).abort()
    }
}

/// An asynchronous transport.
///
/// Same contract as [`Transport`], for transports built on an async runtime.
/// The object-safe shape (`Arc<dyn AsyncTransport<..>>`) comes from `async_trait`.
#[async_trait::async_trait]
pub trait AsyncTransport<Req, Res>: Send + Sync
where
    Req: Send + Sync,
    Res: Send,
{
    type Error: TransportFailure + Send;

    /// Perform the remote call.
    ///
    /// # Errors
    /// Returns `Self::Error` when no usable response was obtained.
    async fn invoke(&self, op: &OperationDescriptor<Req, Res>) -> Result<Res, Self::Error>;

    /// Release in-flight resources after a failed call.
    ///
    /// # Errors
    /// Failures and panics are logged and ignored by the executor.
    async fn abort(&self) -> Result<(), AbortError> {
        Ok(())
    }
}

/// A transport backed by a closure. Never aborts.
///
/// Useful for in-process stubs and tests:
///
/// ```ignore
/// let transport = ws_call::from_fn(|op: &OperationDescriptor<String, String>| {
///     Ok::<_, TransportError>(format!("echo: {}", op.request()))
/// });
/// ```
pub struct FnTransport<F, E> {
    handler: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnTransport<F, E> {
    #[must_use]
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _error: PhantomData,
        }
    }
}

/// Build a [`FnTransport`] from a closure.
#[must_use]
pub fn from_fn<Req, Res, F, E>(handler: F) -> FnTransport<F, E>
where
    F: Fn(&OperationDescriptor<Req, Res>) -> Result<Res, E>,
    E: TransportFailure,
{
    FnTransport::new(handler)
}

impl<Req, Res, F, E> Transport<Req, Res> for FnTransport<F, E>
where
    F: Fn(&OperationDescriptor<Req, Res>) -> Result<Res, E>,
    E: TransportFailure,
{
    type Error = E;

    fn invoke(&self, op: &OperationDescriptor<Req, Res>) -> Result<Res, E> {
        (self.handler)(op)
    }
}
