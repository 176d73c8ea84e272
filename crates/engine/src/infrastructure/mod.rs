//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod narration;
pub mod ollama;
pub mod persistence;
pub mod ports;
