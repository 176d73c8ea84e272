//! API layer - HTTP and WebSocket entry points.

pub mod http;
pub mod stream;
pub mod views;

#[cfg(test)]
mod test_support;

pub use http::{routes, ApiError};
