//! Version construction
//!
//! A new version is the old snapshot plus a [`VersionEdit`] (remove, then
//! add, then update), stamped with a timestamp strictly after the old one.
//! The derived relation graph is cloned when the edit leaves terms, roots
//! and inhibitions untouched and rebuilt otherwise.

mod apply;
mod clock;
mod edit;
mod version_builder;

pub use apply::apply_edit;
pub use clock::{reserve_version_id, Clock, ManualClock, SystemClock};
pub use edit::{AddOps, UpdateOps, VersionEdit};
pub use version_builder::VersionBuilder;
