//! Core types and constants for location acquisition

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
