use crate::surface::SurfaceError;
use core_types::{InstanceId, Key};
use std::fmt;

/// Fatal reconciliation failure.
///
/// Every variant is a programmer error (malformed or half-mounted
/// descriptors, or a surface rejecting a mutation); reconciliation itself has
/// no transient failure modes and is never retried.
#[derive(Debug)]
pub enum ReconcileError {
    /// A previous item that should be live has no handle: it never finished
    /// mounting. Skipping it would corrupt the anchors of later moves.
    MissingHandle { key: Option<Key> },
    /// A previous component node carries no instance.
    MissingInstance { key: Option<Key> },
    /// The instance arena has no entry for a component's instance id.
    UnknownInstance(InstanceId),
    /// Internal dispatch reached a pair it cannot patch in place.
    ShapeMismatch,
    Surface(SurfaceError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::MissingHandle { key: Some(key) } => {
                write!(f, "previous item with key {key} was never mounted")
            }
            ReconcileError::MissingHandle { key: None } => {
                write!(f, "previous unkeyed item was never mounted")
            }
            ReconcileError::MissingInstance { key: Some(key) } => {
                write!(f, "component with key {key} has no instance")
            }
            ReconcileError::MissingInstance { key: None } => {
                write!(f, "unkeyed component has no instance")
            }
            ReconcileError::UnknownInstance(id) => write!(f, "unknown component instance {}", id.0),
            ReconcileError::ShapeMismatch => write!(f, "descriptor shapes cannot be patched in place"),
            ReconcileError::Surface(err) => write!(f, "surface rejected mutation: {err}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Surface(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SurfaceError> for ReconcileError {
    fn from(err: SurfaceError) -> Self {
        ReconcileError::Surface(err)
    }
}
