//! Reuse of detached subtrees.
//!
//! The reconciler offers every subtree it detaches to its [`Recycler`]. A
//! recycler that keeps a subtree owns it, live surface objects included,
//! until it reissues it for a new descriptor built from the same template or
//! until it is drained. Declined subtrees are released on the surface.

use crate::node::VNode;
use core_types::TemplateId;
use std::collections::HashMap;

pub trait Recycler {
    /// Takes ownership of a detached subtree, or hands it back if declined.
    fn offer(&mut self, node: VNode) -> Option<VNode>;

    /// Hands out a pooled subtree built from `template`, if any.
    fn reissue(&mut self, template: TemplateId) -> Option<VNode>;

    /// Gives up every pooled subtree so the caller can release it.
    fn drain(&mut self) -> Vec<VNode> {
        Vec::new()
    }
}

/// Recycler that declines everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRecycling;

impl Recycler for NoRecycling {
    fn offer(&mut self, node: VNode) -> Option<VNode> {
        Some(node)
    }

    fn reissue(&mut self, _template: TemplateId) -> Option<VNode> {
        None
    }
}

/// Pools mounted, component-free subtrees by template.
#[derive(Debug)]
pub struct TemplatePool {
    pools: HashMap<TemplateId, Vec<VNode>>,
    capacity: usize,
    offered: u64,
}

impl Default for TemplatePool {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl TemplatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool keeping at most `per_template` subtrees per template.
    pub fn with_capacity(per_template: usize) -> Self {
        Self {
            pools: HashMap::new(),
            capacity: per_template,
            offered: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pooled(&self, template: TemplateId) -> usize {
        self.pools.get(&template).map_or(0, Vec::len)
    }

    /// Number of subtrees ever offered, kept or not.
    pub fn offered(&self) -> u64 {
        self.offered
    }
}

impl Recycler for TemplatePool {
    fn offer(&mut self, node: VNode) -> Option<VNode> {
        self.offered += 1;
        let Some(template) = node.template else {
            return Some(node);
        };
        if node.handle.is_none() || !node.is_component_free() {
            return Some(node);
        }
        let pool = self.pools.entry(template).or_default();
        if pool.len() >= self.capacity {
            return Some(node);
        }
        log::trace!(target: "vdom.recycle", "pool {} for template {}", node.kind_name(), template.0);
        pool.push(node);
        None
    }

    fn reissue(&mut self, template: TemplateId) -> Option<VNode> {
        self.pools.get_mut(&template).and_then(Vec::pop)
    }

    fn drain(&mut self) -> Vec<VNode> {
        self.pools.drain().flat_map(|(_, nodes)| nodes).collect()
    }
}
