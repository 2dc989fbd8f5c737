//! # Ports Layer
//!
//! - **Inbound (Driving)**: the signing API used by clients and gateways

pub mod inbound;
