//! Client-owned reactive state.
//!
//! Each store exclusively owns its cached slice of backend state and
//! mutates it only from confirmed responses. Reads are lock-scoped
//! snapshots, and no lock is ever held across an await point, so
//! overlapping operations interleave at the request boundary only.

pub mod entries;
pub mod metadata;
pub mod session;

pub use entries::{EntryStore, EntryWindow};
pub use metadata::MetadataStore;
pub use session::SessionStore;
