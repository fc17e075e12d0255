//! Target surface protocol.
//!
//! The reconciler never owns live objects. It drives an implementation of
//! [`TargetSurface`], which owns a mutable ordered tree and hands out
//! [`Handle`]s for the objects it creates. [`Mutation`] is the journal form of
//! the same operations, for surfaces that record or forward what was applied.
//!
//! Invariants:
//! - Mutations are synchronous and observable by the next call.
//! - The tree is validly ordered after every individual mutation.
//! - Inserting a child that already has a parent relocates it (a move); the
//!   object and its subtree keep their identity.
//! - `insert_before` with no anchor appends.
//! - Unlinking (`remove`, `replace`, `clear_children`) does not destroy the
//!   unlinked subtree; `release` does. An unlinked subtree may be inserted
//!   again until it is released.
//! - Handles are never reused after release.

use crate::props::PropValue;
use core_types::Handle;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    UnknownHandle(Handle),
    InvalidHandle,
    NotAChild { parent: Handle, child: Handle },
    InvalidParent(Handle),
    WrongNodeKind(Handle),
    CycleDetected { parent: Handle, child: Handle },
    /// Released an object that is still linked under a parent.
    StillAttached(Handle),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::UnknownHandle(handle) => write!(f, "unknown handle {handle}"),
            SurfaceError::InvalidHandle => write!(f, "invalid handle"),
            SurfaceError::NotAChild { parent, child } => {
                write!(f, "{child} is not a child of {parent}")
            }
            SurfaceError::InvalidParent(handle) => write!(f, "{handle} cannot have children"),
            SurfaceError::WrongNodeKind(handle) => write!(f, "wrong node kind for {handle}"),
            SurfaceError::CycleDetected { parent, child } => {
                write!(f, "inserting {child} under {parent} would create a cycle")
            }
            SurfaceError::StillAttached(handle) => write!(f, "{handle} is still attached"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Mutable ordered tree the reconciler applies its decisions to.
pub trait TargetSurface {
    fn create_element(&mut self, tag: &str) -> Handle;
    fn create_text(&mut self, text: &str) -> Handle;
    /// Creates a container whose children are rendered inline in its parent.
    fn create_fragment(&mut self) -> Handle;

    fn append(&mut self, parent: Handle, child: Handle) -> Result<(), SurfaceError>;
    fn insert_before(
        &mut self,
        parent: Handle,
        child: Handle,
        anchor: Option<Handle>,
    ) -> Result<(), SurfaceError>;
    fn remove(&mut self, parent: Handle, child: Handle) -> Result<(), SurfaceError>;
    fn replace(&mut self, parent: Handle, old: Handle, new: Handle) -> Result<(), SurfaceError>;
    fn clear_children(&mut self, parent: Handle) -> Result<(), SurfaceError>;
    /// Destroys an unlinked subtree.
    fn release(&mut self, handle: Handle) -> Result<(), SurfaceError>;

    fn next_sibling(&self, handle: Handle) -> Option<Handle>;

    fn set_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError>;
    fn set_attribute(&mut self, handle: Handle, name: &str, value: &str)
    -> Result<(), SurfaceError>;
    /// Sets an attribute that belongs to `namespace`, keeping `name` qualified.
    fn set_attribute_ns(
        &mut self,
        handle: Handle,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError>;
    fn remove_attribute(&mut self, handle: Handle, name: &str) -> Result<(), SurfaceError>;
    /// Sets a live property (`checked`, `value`, ...) rather than an attribute.
    fn set_property(
        &mut self,
        handle: Handle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SurfaceError>;
    /// Sets one style property; an empty value resets it.
    fn set_style(&mut self, handle: Handle, name: &str, value: &str) -> Result<(), SurfaceError>;
    fn set_style_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError>;
    fn remove_style(&mut self, handle: Handle) -> Result<(), SurfaceError>;
}

/// Journal entry for one applied surface operation.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    CreateElement {
        handle: Handle,
        tag: Arc<str>,
    },
    CreateText {
        handle: Handle,
        text: String,
    },
    CreateFragment {
        handle: Handle,
    },
    /// Append a detached child to the end of a parent's children.
    AppendChild {
        parent: Handle,
        child: Handle,
    },
    /// Insert a detached child before an existing sibling.
    InsertBefore {
        parent: Handle,
        child: Handle,
        before: Handle,
    },
    /// Relocate an attached child; `before: None` moves it to the end.
    Move {
        parent: Handle,
        child: Handle,
        before: Option<Handle>,
    },
    RemoveChild {
        parent: Handle,
        child: Handle,
    },
    ReplaceChild {
        parent: Handle,
        old: Handle,
        new: Handle,
    },
    ClearChildren {
        parent: Handle,
    },
    Release {
        handle: Handle,
    },
    SetText {
        handle: Handle,
        text: String,
    },
    SetAttribute {
        handle: Handle,
        name: Arc<str>,
        value: String,
    },
    SetAttributeNs {
        handle: Handle,
        namespace: Arc<str>,
        name: Arc<str>,
        value: String,
    },
    RemoveAttribute {
        handle: Handle,
        name: Arc<str>,
    },
    SetProperty {
        handle: Handle,
        name: Arc<str>,
        value: PropValue,
    },
    SetStyle {
        handle: Handle,
        name: Arc<str>,
        value: String,
    },
    SetStyleText {
        handle: Handle,
        text: String,
    },
    RemoveStyle {
        handle: Handle,
    },
}

impl Mutation {
    /// Returns `true` for operations that change the shape of the tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::AppendChild { .. }
                | Mutation::InsertBefore { .. }
                | Mutation::Move { .. }
                | Mutation::RemoveChild { .. }
                | Mutation::ReplaceChild { .. }
                | Mutation::ClearChildren { .. }
        )
    }

    pub fn is_create(&self) -> bool {
        matches!(
            self,
            Mutation::CreateElement { .. }
                | Mutation::CreateText { .. }
                | Mutation::CreateFragment { .. }
        )
    }
}
