//! Node and slot differ.
//!
//! A matched pair is patched in place only if it has the same shape: same
//! template, same key, and the same kind (same tag for elements, same
//! component type for components). Any other pair is replaced: the next
//! subtree is mounted, swapped in at the previous one's position, and the
//! previous one is detached.

use crate::attrs;
use crate::context::Context;
use crate::error::ReconcileError;
use crate::node::{self, VChild, VNode, VNodeKind};
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::Handle;

/// Returns `true` if `next` can be patched onto the live objects of `prev`.
pub fn same_shape(prev: &VNode, next: &VNode) -> bool {
    if prev.template != next.template || prev.key != next.key {
        return false;
    }
    match (&prev.kind, &next.kind) {
        (VNodeKind::Text(_), VNodeKind::Text(_)) => true,
        (VNodeKind::Element(a), VNodeKind::Element(b)) => a.tag == b.tag,
        (VNodeKind::Fragment(_), VNodeKind::Fragment(_)) => true,
        (VNodeKind::Component(a), VNodeKind::Component(b)) => a.component.same_as(&b.component),
        _ => false,
    }
}

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    pub(crate) fn patch_node(
        &mut self,
        prev: Option<VNode>,
        next: Option<&mut VNode>,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        match (prev, next) {
            (None, None) => Ok(()),
            (None, Some(next)) => {
                let handle = self.mount_node(next, cx)?;
                self.surface.append(parent, handle)?;
                Ok(())
            }
            (Some(prev), None) => self.unmount_child(VChild::Node(prev), parent),
            (Some(prev), Some(next)) => self.diff_nodes(prev, next, parent, cx),
        }
    }

    pub(crate) fn diff_nodes(
        &mut self,
        prev: VNode,
        next: &mut VNode,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        if same_shape(&prev, next) {
            return self.patch_in_place(prev, next, parent, cx);
        }
        log::trace!(
            target: "vdom.differ",
            "replace {} with {}",
            prev.kind_name(),
            next.kind_name()
        );
        let handle = self.mount_node(next, cx)?;
        self.swap_in(VChild::Node(prev), handle, parent)
    }

    /// Patches a same-shape pair, transplanting the live objects of `prev`.
    pub(crate) fn patch_in_place(
        &mut self,
        prev: VNode,
        next: &mut VNode,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.stats.patches += 1;
        self.reshape(prev, next, parent, cx)
    }

    /// [`Self::patch_in_place`] without counting the pair itself.
    pub(crate) fn reshape(
        &mut self,
        prev: VNode,
        next: &mut VNode,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        if matches!(next.kind, VNodeKind::Component(_)) {
            return self.update_component(prev, next, parent, cx);
        }
        let VNode {
            kind, key, handle, ..
        } = prev;
        let handle = handle.ok_or(ReconcileError::MissingHandle { key })?;
        next.handle = Some(handle);
        match (kind, &mut next.kind) {
            (VNodeKind::Text(old), VNodeKind::Text(new)) => {
                if old != *new {
                    self.surface.set_text(handle, new)?;
                    self.stats.text_updates += 1;
                }
                Ok(())
            }
            (VNodeKind::Element(old), VNodeKind::Element(new)) => {
                let ops = attrs::patch_props(&mut self.surface, handle, &old.props, &new.props)?;
                self.stats.attribute_ops += ops;
                self.patch_children(old.children, &mut new.children, handle, cx)
            }
            (VNodeKind::Fragment(old), VNodeKind::Fragment(new)) => {
                self.patch_children(old, new, handle, cx)
            }
            _ => Err(ReconcileError::ShapeMismatch),
        }
    }

    /// Routes a child sequence pair to the keyed or the positional algorithm.
    pub(crate) fn patch_children(
        &mut self,
        prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        if prev.is_empty() && next.is_empty() {
            return Ok(());
        }
        if node::is_keyed(&prev, next) {
            if self.config.check_duplicate_keys
                && prev.iter().chain(next.iter()).any(|child| child.key().is_none())
            {
                log::warn!(target: "vdom.keyed", "mixed keyed and unkeyed items under {parent}");
            }
            self.patch_keyed(prev, next, parent, cx)
        } else {
            self.patch_non_keyed(prev, next, parent, cx)
        }
    }

    /// Patches one slot against its counterpart at the same position.
    pub(crate) fn patch_child(
        &mut self,
        prev: VChild,
        next: &mut VChild,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        match (prev, next) {
            (VChild::Node(prev), VChild::Node(next)) => self.diff_nodes(prev, next, parent, cx),
            (
                VChild::Text { text: old, handle },
                VChild::Text {
                    text: new,
                    handle: slot,
                },
            ) => {
                let handle = handle.ok_or(ReconcileError::MissingHandle { key: None })?;
                *slot = Some(handle);
                if old != *new {
                    self.surface.set_text(handle, new)?;
                    self.stats.text_updates += 1;
                }
                Ok(())
            }
            (VChild::Empty { handle }, VChild::Empty { handle: slot }) => {
                *slot = Some(handle.ok_or(ReconcileError::MissingHandle { key: None })?);
                Ok(())
            }
            (VChild::Empty { handle }, VChild::Text { text, handle: slot }) => {
                let handle = handle.ok_or(ReconcileError::MissingHandle { key: None })?;
                *slot = Some(handle);
                self.surface.set_text(handle, text)?;
                self.stats.text_updates += 1;
                Ok(())
            }
            (VChild::Text { handle, .. }, VChild::Empty { handle: slot }) => {
                let handle = handle.ok_or(ReconcileError::MissingHandle { key: None })?;
                *slot = Some(handle);
                self.surface.set_text(handle, "")?;
                self.stats.text_updates += 1;
                Ok(())
            }
            (
                VChild::List { items, handle },
                VChild::List {
                    items: next_items,
                    handle: slot,
                },
            ) => {
                let handle = handle.ok_or(ReconcileError::MissingHandle { key: None })?;
                *slot = Some(handle);
                self.patch_children(items, next_items, handle, cx)
            }
            (prev, next) => {
                let handle = self.mount_child(next, cx)?;
                self.swap_in(prev, handle, parent)
            }
        }
    }

    /// Puts the freshly mounted `handle` at the position of `prev` and
    /// detaches `prev`.
    fn swap_in(&mut self, prev: VChild, handle: Handle, parent: Handle) -> Result<(), ReconcileError> {
        let old = prev.handle().ok_or_else(|| ReconcileError::MissingHandle {
            key: prev.key().cloned(),
        })?;
        self.surface.replace(parent, old, handle)?;
        self.detach(prev)
    }
}
