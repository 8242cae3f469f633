//! Operation descriptors: what to call and with which payload.

use std::fmt;
use std::marker::PhantomData;

/// One remote operation to invoke: its name, an optional action URI, the
/// request payload, and (at the type level) the response it is expected to
/// produce.
///
/// Descriptors are immutable once built. Transports receive them by reference,
/// so the same descriptor may be executed any number of times.
pub struct OperationDescriptor<Req, Res> {
    name: String,
    action: Option<String>,
    request: Req,
    _response: PhantomData<fn() -> Res>,
}

impl<Req, Res> OperationDescriptor<Req, Res> {
    /// Create a descriptor for the operation `name` carrying `request`.
    #[must_use]
    pub fn new(name: impl Into<String>, request: Req) -> Self {
        Self {
            name: name.into(),
            action: None,
            request,
            _response: PhantomData,
        }
    }

    /// Attach an action URI (`SOAPAction` header, SOAP 1.2 `action` parameter).
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Operation name, used for logging and by transports that route on it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    #[must_use]
    pub fn request(&self) -> &Req {
        &self.request
    }

    /// Consume the descriptor and return the request payload.
    #[must_use]
    pub fn into_request(self) -> Req {
        self.request
    }
}

impl<Req: Clone, Res> Clone for OperationDescriptor<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            action: self.action.clone(),
            request: self.request.clone(),
            _response: PhantomData,
        }
    }
}

impl<Req: PartialEq, Res> PartialEq for OperationDescriptor<Req, Res> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.action == other.action && self.request == other.request
    }
}

impl<Req: Eq, Res> Eq for OperationDescriptor<Req, Res> {}

impl<Req: fmt::Debug, Res> fmt::Debug for OperationDescriptor<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}
