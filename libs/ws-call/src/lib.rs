#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Single-shot remote call execution for SOAP/RPC clients.
//!
//! This crate provides the piece every web-service client repeats: invoke one
//! remote operation through a transport, and turn whatever went wrong into a
//! small, fixed error taxonomy instead of letting raw transport errors leak.
//!
//! - [`OperationDescriptor`] names the operation and carries its request payload
//! - [`Transport`] / [`AsyncTransport`] are the injected capabilities that perform the call
//! - [`execute`] / [`execute_async`] run the call and return a [`CallResult`]
//! - [`classify`] maps any [`TransportFailure`] onto a [`ClassifiedError`]
//!
//! No retries, no backoff and no timers live here. Deadlines belong to the
//! transport; retry decisions belong to the caller.
//!
//! # Example
//!
//! ```ignore
//! use ws_call::{execute, CallResult, ClassifiedError, OperationDescriptor};
//!
//! let op = OperationDescriptor::<_, String>::new("GetFlights", payload)
//!     .with_action("http://www.springframework.org/spring-ws/samples/airline/GetFlights");
//!
//! match execute(&op, &transport) {
//!     CallResult::Success(body) => println!("{body}"),
//!     CallResult::Failure(ClassifiedError::RemoteFault { code, reason }) => {
//!         eprintln!("SOAP Fault Code: {code}");
//!         eprintln!("SOAP Fault String: {reason}");
//!     }
//!     CallResult::Failure(other) => eprintln!("{other}"),
//! }
//! ```

mod classify;
mod descriptor;
mod error;
mod executor;
mod result;
mod transport;

pub use classify::classify;
pub use descriptor::OperationDescriptor;
pub use error::{AbortError, ClassifiedError, ErrorKind, Fault, TransportError, TransportFailure};
pub use executor::{CallExecutor, execute, execute_async};
pub use result::CallResult;
pub use transport::{AsyncTransport, FnTransport, Transport, from_fn};
