//! # Ports Layer
//!
//! - **Inbound (Driving)**: [`inbound::ResponseValidationApi`], used by the
//!   conformance client and the integration suite

pub mod inbound;
