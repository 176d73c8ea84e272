//! Skirmish Engine library.
//!
//! Turn-based combat between two stat blocks, served over HTTP and WebSocket.
//!
//! ## Structure
//!
//! - `use_cases/` - battle creation and the three ways of driving a battle
//! - `stores/` - battles resident between requests
//! - `infrastructure/` - external dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
