use crate::attrs;
use crate::context::Context;
use crate::differ::same_shape;
use crate::error::ReconcileError;
use crate::node::{VChild, VNode, VNodeKind};
use crate::props::Props;
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::Handle;

static NO_PROPS: Props = Props::new();

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    /// Creates the live objects for a new subtree; the result is unlinked.
    pub(crate) fn mount_node(
        &mut self,
        node: &mut VNode,
        cx: &Context,
    ) -> Result<Handle, ReconcileError> {
        self.stats.mounts += 1;
        self.build_node(node, cx)
    }

    pub(crate) fn mount_child(
        &mut self,
        child: &mut VChild,
        cx: &Context,
    ) -> Result<Handle, ReconcileError> {
        self.stats.mounts += 1;
        self.build_child(child, cx)
    }

    pub(crate) fn build_node(
        &mut self,
        node: &mut VNode,
        cx: &Context,
    ) -> Result<Handle, ReconcileError> {
        if let Some(handle) = self.reissue(node, cx)? {
            return Ok(handle);
        }
        if matches!(node.kind, VNodeKind::Component(_)) {
            let handle = self.mount_component(node, cx)?;
            node.handle = Some(handle);
            return Ok(handle);
        }
        let handle = match &mut node.kind {
            VNodeKind::Text(text) => self.surface.create_text(text),
            VNodeKind::Element(element) => {
                let handle = self.surface.create_element(&element.tag);
                let ops = attrs::patch_props(&mut self.surface, handle, &NO_PROPS, &element.props)?;
                self.stats.attribute_ops += ops;
                self.build_children(&mut element.children, handle, cx)?;
                handle
            }
            VNodeKind::Fragment(items) => {
                let handle = self.surface.create_fragment();
                self.build_children(items, handle, cx)?;
                handle
            }
            VNodeKind::Component(_) => return Err(ReconcileError::ShapeMismatch),
        };
        node.handle = Some(handle);
        Ok(handle)
    }

    fn build_child(&mut self, child: &mut VChild, cx: &Context) -> Result<Handle, ReconcileError> {
        let handle = match child {
            VChild::Empty { .. } => self.surface.create_text(""),
            VChild::Text { text, .. } => self.surface.create_text(text),
            VChild::List { items, .. } => {
                let handle = self.surface.create_fragment();
                self.build_children(items, handle, cx)?;
                handle
            }
            VChild::Node(node) => return self.build_node(node, cx),
        };
        child.set_handle(handle);
        Ok(handle)
    }

    fn build_children(
        &mut self,
        children: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        for child in children {
            let handle = self.build_child(child, cx)?;
            self.surface.append(parent, handle)?;
        }
        Ok(())
    }

    /// Serves `node` from the recycler by patching a pooled subtree of the
    /// same template into shape.
    fn reissue(&mut self, node: &mut VNode, cx: &Context) -> Result<Option<Handle>, ReconcileError> {
        if !self.config.recycling || matches!(node.kind, VNodeKind::Component(_)) {
            return Ok(None);
        }
        let Some(template) = node.template else {
            return Ok(None);
        };
        let Some(mut pooled) = self.recycler.reissue(template) else {
            return Ok(None);
        };
        // Pooled subtrees carry the key of their last owner.
        pooled.key.clone_from(&node.key);
        if !same_shape(&pooled, node) {
            log::debug!(
                target: "vdom.recycle",
                "pooled {} does not fit {}; releasing",
                pooled.kind_name(),
                node.kind_name()
            );
            if let Some(handle) = pooled.handle {
                self.surface.release(handle)?;
            }
            return Ok(None);
        }
        // Counted as a mount, not as a patch.
        self.reshape(pooled, node, Handle::INVALID, cx)?;
        self.stats.recycled += 1;
        Ok(node.handle)
    }
}
