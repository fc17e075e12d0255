//! In-memory target surface for the reconciler.
//!
//! [`SurfaceStore`] owns an ordered tree of elements, text objects and
//! fragment containers, journals every operation it applies, and can replay a
//! journal into another store. [`SurfaceSnapshot`] renders a subtree as
//! comparable lines.

pub mod snapshot;
pub mod store;

pub use snapshot::{SnapshotOptions, SurfaceSnapshot, assert_snapshot};
pub use store::{MutationCounts, SurfaceStore};
