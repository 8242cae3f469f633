#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! SOAP over HTTP transport for `ws_call`.
//!
//! A thin binding, not a SOAP stack: the caller supplies the body payload as
//! XML text, this crate wraps it in a SOAP 1.1 or 1.2 envelope, posts it with a
//! blocking HTTP client, and hands back the contents of the response `Body`.
//! Failures come back as [`SoapError`], which `ws_call` knows how to classify.
//!
//! Fault detection follows the usual HTTP binding rules:
//! - a `500` (or `400` under SOAP 1.2) carrying a `Fault` element is a remote fault;
//! - any other `4xx`/`5xx` is a transport failure;
//! - `202`/`204` or an empty body is an empty one-way response.
//!
//! No WSDL, WS-Security or MTOM support lives here.
//!
//! # Example
//!
//! ```ignore
//! use ws_call::{execute, OperationDescriptor};
//! use ws_soap::{SoapClientConfig, SoapTransport};
//! use std::time::Duration;
//!
//! let transport = SoapTransport::new(
//!     SoapClientConfig::new("http://localhost:8080/airline-server/services")
//!         .with_deadline(Duration::from_secs(10)),
//! )?;
//!
//! let op = OperationDescriptor::new("GetFlights", payload)
//!     .with_action("http://www.springframework.org/spring-ws/samples/airline/GetFlights");
//! let result = execute(&op, &transport);
//! ```

mod config;
mod envelope;
mod error;
mod transport;

pub use config::{
    DEFAULT_ENDPOINT, DEFAULT_USER_AGENT, SoapClientConfig, SoapVersion, validate_action,
};
pub use envelope::{build_envelope, extract_body, parse_fault};
pub use error::SoapError;
pub use transport::{SoapTransport, interpret_response};
