//! Call execution.
//!
//! [`execute`] (and its async twin [`execute_async`]) performs exactly one
//! `invoke` against the supplied transport:
//!
//! - on success the response is wrapped unchanged and `abort` is never called;
//! - on failure the error is classified, then `abort` is called exactly once,
//!   then the classified error is returned.
//!
//! Nothing here retries, sleeps or keeps state between calls. A failing or
//! panicking `abort` is logged at `warn` and otherwise ignored.

use std::panic::{AssertUnwindSafe, catch_unwind};

use futures::FutureExt;
use tracing::Instrument;

use crate::classify::classify;
use crate::descriptor::OperationDescriptor;
use crate::error::{AbortError, ClassifiedError};
use crate::result::CallResult;
use crate::transport::{AsyncTransport, Transport};

/// Execute one remote operation through `transport`.
///
/// # Example
///
/// ```ignore
/// let op = OperationDescriptor::<String, String>::new("GetQuote", payload);
/// match execute(&op, &transport) {
///     CallResult::Success(body) => println!("{body}"),
///     CallResult::Failure(err) => eprintln!("{err}"),
/// }
/// ```
pub fn execute<Req, Res, T>(op: &OperationDescriptor<Req, Res>, transport: &T) -> CallResult<Res>
where
    T: Transport<Req, Res> + ?Sized,
{
    let _span = tracing::debug_span!("ws_call", op = op.name(), action = op.action()).entered();

    match transport.invoke(op) {
        Ok(res) => {
            tracing::debug!(op = op.name(), "remote call succeeded");
            CallResult::Success(res)
        }
        Err(err) => {
            let classified = classify(&err);
            drop(err);
            report_failure(op.name(), &classified);
            report_abort(op.name(), guarded_abort(|| transport.abort()));
            CallResult::Failure(classified)
        }
    }
}

/// Execute one remote operation through an async `transport`.
///
/// Same contract as [`execute`].
pub async fn execute_async<Req, Res, T>(
    op: &OperationDescriptor<Req, Res>,
    transport: &T,
) -> CallResult<Res>
where
    T: AsyncTransport<Req, Res> + ?Sized,
    Req: Send + Sync,
    Res: Send,
{
    let span = tracing::debug_span!("ws_call", op = op.name(), action = op.action());

    async {
        match transport.invoke(op).await {
            Ok(res) => {
                tracing::debug!(op = op.name(), "remote call succeeded");
                CallResult::Success(res)
            }
            Err(err) => {
                let classified = classify(&err);
                drop(err);
                report_failure(op.name(), &classified);
                let outcome = AssertUnwindSafe(transport.abort())
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(panic_message(panic.as_ref())));
                report_abort(op.name(), outcome);
                CallResult::Failure(classified)
            }
        }
    }
    .instrument(span)
    .await
}

fn guarded_abort(abort: impl FnOnce() -> Result<(), AbortError>) -> Result<(), AbortError> {
    catch_unwind(AssertUnwindSafe(abort)).unwrap_or_else(|panic| Err(panic_message(panic.as_ref())))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> AbortError {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_owned());
    format!("abort panicked: {detail}").into()
}

fn report_failure(op: &str, err: &ClassifiedError) {
    tracing::warn!(
        op,
        kind = err.kind().as_str(),
        error = %err,
        "remote call failed",
    );
}

fn report_abort(op: &str, outcome: Result<(), AbortError>) {
    if let Err(e) = outcome {
        tracing::warn!(op, error = %e, "transport abort failed, ignoring");
    }
}

/// A transport bound to the execution policy.
///
/// Stateless apart from the transport it owns; cloning it clones the transport
/// (use an `Arc` transport to share one connection pool).
#[derive(Debug, Clone, Default)]
pub struct CallExecutor<T> {
    transport: T,
}

impl<T> CallExecutor<T> {
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// See [`execute`].
    pub fn execute<Req, Res>(&self, op: &OperationDescriptor<Req, Res>) -> CallResult<Res>
    where
        T: Transport<Req, Res>,
    {
        execute(op, &self.transport)
    }

    /// See [`execute_async`].
    pub async fn execute_async<Req, Res>(
        &self,
        op: &OperationDescriptor<Req, Res>,
    ) -> CallResult<Res>
    where
        T: AsyncTransport<Req, Res>,
        Req: Send + Sync,
        Res: Send,
    {
        execute_async(op, &self.transport).await
    }
}
