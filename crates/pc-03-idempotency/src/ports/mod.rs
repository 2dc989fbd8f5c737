//! # Ports Layer
//!
//! - **Outbound (Driven)**: [`outbound::ResponseSink`], where replies are written

pub mod outbound;
