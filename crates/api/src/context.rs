//! Per-request values placed in request extensions by [`crate::middleware`].

use warehouse_core::Deadline;

/// Correlation id of a request: the inbound `x-request-id`, or a fresh UUIDv7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deadline by which the engine must have answered this request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestDeadline(Deadline);

impl RequestDeadline {
    pub fn new(deadline: Deadline) -> Self {
        Self(deadline)
    }

    pub fn deadline(&self) -> Deadline {
        self.0
    }
}
