//! Client-side sync layer for a self-hosted feed reader.
//!
//! `weir` talks to the reader's REST API and keeps three in-memory stores
//! consistent with it: the session (credential plus profile), the
//! feed/category metadata, and a windowed view of the entry listing. The
//! binary is a thin command-line consumer of these stores; embedding them
//! in another frontend works the same way.

pub mod api;
pub mod config;
pub mod notify;
pub mod session;
pub mod store;
pub mod types;
