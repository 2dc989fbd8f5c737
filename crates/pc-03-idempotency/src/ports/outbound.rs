//! # Outbound Ports
//!
//! The store does not know about HTTP; the handler layer passes in whatever
//! it answers the client through.

use serde_json::Value;

/// Destination of a replayed or rejected response.
pub trait ResponseSink {
    /// Emit `status` with a JSON `body`.
    fn send(&mut self, status: u16, body: Value);
}

/// Sink that keeps the last response in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl ResponseSink for CapturedResponse {
    fn send(&mut self, status: u16, body: Value) {
        self.status = Some(status);
        self.body = Some(body);
    }
}
