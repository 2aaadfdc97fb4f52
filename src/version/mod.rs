//! Version identity subsystem
//!
//! A dictionary version is identified solely by its timestamp. The registry
//! hands out one shared [`DictionaryVersion`] per timestamp so identity
//! comparisons can rely on `Arc::ptr_eq`; equality and ordering otherwise
//! compare timestamps only, never snapshot contents.

mod id;
mod identity;
mod registry;

pub use id::{VersionId, CACHE_PREFIX, VERSION_PREFIX};
pub use identity::DictionaryVersion;
pub use registry::{VersionRef, VersionRegistry};
