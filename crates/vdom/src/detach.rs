use crate::error::ReconcileError;
use crate::node::{VChild, VNode, VNodeKind};
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::Handle;

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    /// Unlinks a live child from `parent`, then detaches it.
    pub(crate) fn unmount_child(&mut self, child: VChild, parent: Handle) -> Result<(), ReconcileError> {
        let handle = child.handle().ok_or_else(|| ReconcileError::MissingHandle {
            key: child.key().cloned(),
        })?;
        self.surface.remove(parent, handle)?;
        self.stats.removals += 1;
        self.detach(child)
    }

    /// Tears down an unlinked subtree: component instances first, then the
    /// live objects, which go to the recycler or are released.
    pub(crate) fn detach(&mut self, child: VChild) -> Result<(), ReconcileError> {
        match child {
            VChild::Node(node) => {
                self.teardown_node(&node)?;
                let declined = if self.config.recycling {
                    self.recycler.offer(node)
                } else {
                    Some(node)
                };
                if let Some(handle) = declined.and_then(|node| node.handle) {
                    self.surface.release(handle)?;
                }
            }
            other => {
                self.teardown_child(&other)?;
                if let Some(handle) = other.handle() {
                    self.surface.release(handle)?;
                }
            }
        }
        Ok(())
    }

    /// Runs `will_unmount` for every component instance in the subtree,
    /// outermost first.
    pub(crate) fn teardown_node(&mut self, node: &VNode) -> Result<(), ReconcileError> {
        match &node.kind {
            VNodeKind::Text(_) => Ok(()),
            VNodeKind::Element(element) => self.teardown_children(&element.children),
            VNodeKind::Fragment(items) => self.teardown_children(items),
            VNodeKind::Component(component) => match component.instance {
                Some(id) => self.teardown_instance(id),
                None => Err(ReconcileError::MissingInstance {
                    key: node.key.clone(),
                }),
            },
        }
    }

    fn teardown_child(&mut self, child: &VChild) -> Result<(), ReconcileError> {
        match child {
            VChild::Empty { .. } | VChild::Text { .. } => Ok(()),
            VChild::List { items, .. } => self.teardown_children(items),
            VChild::Node(node) => self.teardown_node(node),
        }
    }

    fn teardown_children(&mut self, children: &[VChild]) -> Result<(), ReconcileError> {
        children
            .iter()
            .try_for_each(|child| self.teardown_child(child))
    }
}
