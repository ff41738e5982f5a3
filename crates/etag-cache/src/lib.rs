//! Entity tags and the entity-tag cache.
//!
//! An entity tag is a fingerprint of the serialized bytes of a served
//! representation. The cache remembers the latest tagged representation per
//! entity ID so conditional requests can be answered without recomputing it.

pub mod cache;
pub mod error;
pub mod memory;
pub mod tag;

pub use cache::{Epoch, EtagCache, NoopEtagCache};
pub use error::{Result, TagError};
pub use memory::InMemoryEtagCache;
pub use tag::{EntityTag, Tagged};
