//! Keyed tree reconciliation.
//!
//! Given the previous descriptor tree of a rendered UI and the next one, the
//! [`Reconciler`] applies the smallest set of insertions, moves, removals and
//! in-place updates to a [`TargetSurface`] so that the live tree matches the
//! next descriptors, keeping the identity of every matched subtree.

pub mod attrs;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod props;
pub mod recycle;
pub mod stats;
pub mod surface;

mod detach;
mod differ;
mod keyed;
mod mount;
mod non_keyed;
mod reconciler;
#[cfg(test)]
mod test_surface;

pub use component::{
    ComponentNode, ComponentType, Hooks, InstanceArena, StatefulComponent, StatefulType,
    StatelessType,
};
pub use config::ReconcileConfig;
pub use context::Context;
pub use core_types::{Handle, InstanceId, Key, TemplateId};
pub use differ::same_shape;
pub use error::ReconcileError;
pub use node::{ElementNode, VChild, VNode, VNodeKind};
pub use props::{PropValue, Props, Style};
pub use reconciler::Reconciler;
pub use recycle::{NoRecycling, Recycler, TemplatePool};
pub use stats::ReconcileStats;
pub use surface::{Mutation, SurfaceError, TargetSurface};
