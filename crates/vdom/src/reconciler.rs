use crate::component::InstanceArena;
use crate::config::ReconcileConfig;
use crate::context::Context;
use crate::error::ReconcileError;
use crate::node::{VChild, VNode};
use crate::recycle::{NoRecycling, Recycler};
use crate::stats::ReconcileStats;
use crate::surface::TargetSurface;
use core_types::{Handle, InstanceId};

/// Reconciliation engine bound to one target surface.
///
/// A pass runs to completion on the calling thread; there is no suspension
/// point and no cancellation. Callers must not start a pass on a subtree
/// while another pass over an overlapping subtree is running.
pub struct Reconciler<S, R = NoRecycling> {
    pub(crate) surface: S,
    pub(crate) recycler: R,
    pub(crate) instances: InstanceArena,
    pub(crate) config: ReconcileConfig,
    pub(crate) stats: ReconcileStats,
    pub(crate) pending_mounts: Vec<InstanceId>,
}

impl<S: TargetSurface> Reconciler<S, NoRecycling> {
    pub fn new(surface: S) -> Self {
        Self::with_recycler(surface, NoRecycling, ReconcileConfig::default())
    }
}

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    pub fn with_recycler(surface: S, recycler: R, config: ReconcileConfig) -> Self {
        Self {
            surface,
            recycler,
            instances: InstanceArena::new(),
            config,
            stats: ReconcileStats::default(),
            pending_mounts: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn recycler(&self) -> &R {
        &self.recycler
    }

    pub fn instances(&self) -> &InstanceArena {
        &self.instances
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    pub fn take_stats(&mut self) -> ReconcileStats {
        std::mem::take(&mut self.stats)
    }

    pub fn into_parts(self) -> (S, R) {
        (self.surface, self.recycler)
    }

    /// Mounts `node` and appends it under `parent`.
    pub fn mount_root(
        &mut self,
        node: &mut VNode,
        parent: Handle,
        cx: &Context,
    ) -> Result<Handle, ReconcileError> {
        let handle = self.mount_node(node, cx)?;
        self.surface.append(parent, handle)?;
        self.flush_mounted();
        Ok(handle)
    }

    /// Reconciles one node pair under `parent`.
    ///
    /// An absent `prev` mounts `next`; an absent `next` removes and detaches
    /// `prev`. The previous tree is consumed; its handles and component
    /// instances are transplanted onto `next`.
    pub fn reconcile(
        &mut self,
        prev: Option<VNode>,
        next: Option<&mut VNode>,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.patch_node(prev, next, parent, cx)?;
        self.flush_mounted();
        log::debug!(target: "vdom.differ", "pass done: {:?}", self.stats);
        Ok(())
    }

    /// Reconciles a whole child sequence of `parent`, keyed or not.
    pub fn reconcile_children(
        &mut self,
        prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.patch_children(prev, next, parent, cx)?;
        self.flush_mounted();
        Ok(())
    }

    /// Unlinks `node` from `parent` and detaches it.
    pub fn unmount(&mut self, node: VNode, parent: Handle) -> Result<(), ReconcileError> {
        self.unmount_child(VChild::Node(node), parent)
    }

    /// Releases every subtree the recycler still holds.
    pub fn purge_recycler(&mut self) -> Result<usize, ReconcileError> {
        let drained = self.recycler.drain();
        let count = drained.len();
        for node in drained {
            if let Some(handle) = node.handle {
                self.surface.release(handle)?;
            }
        }
        Ok(count)
    }
}
