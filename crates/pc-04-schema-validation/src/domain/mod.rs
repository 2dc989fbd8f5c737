//! # Domain Layer

pub mod document;
pub mod errors;
pub mod index;
pub mod normalize;
pub mod outcome;
pub mod resolver;
