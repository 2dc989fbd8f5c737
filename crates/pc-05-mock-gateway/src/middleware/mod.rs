//! Middleware stack for the mock gateway.
//!
//! Layer order: Request → SignatureAuth → Handler
//!
//! `/health` is mounted outside the stack and never authenticated.

pub mod signature_auth;

pub use signature_auth::{AuthenticatedRequest, SignatureAuthLayer};
