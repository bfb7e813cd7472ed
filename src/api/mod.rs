//! Typed surface over the backend's REST API.
//!
//! `transport` owns the HTTP mechanics; the sibling modules are mechanical
//! endpoint accessors, one function per backend route, shaped exactly like
//! the route table they wrap.

pub mod auth;
pub mod categories;
pub mod entries;
pub mod feeds;
pub mod transport;

pub use transport::{ApiClient, ApiError};
