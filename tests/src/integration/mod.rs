//! Cross-crate scenarios.

pub mod e2e_choreography;
pub mod flows;
