//! Positional reconciliation of sequences without keys.
//!
//! Slot `i` of the previous sequence is patched against slot `i` of the next
//! one. Surplus previous slots are removed from the tail backwards; surplus
//! next slots are mounted and appended.

use crate::context::Context;
use crate::error::ReconcileError;
use crate::node::VChild;
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::Handle;

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    /// Reconciles two unkeyed sequences by position.
    ///
    /// Keys, if any, are ignored.
    pub fn reconcile_non_keyed(
        &mut self,
        prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.patch_non_keyed(prev, next, parent, cx)?;
        self.flush_mounted();
        Ok(())
    }

    pub(crate) fn patch_non_keyed(
        &mut self,
        mut prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        let common = prev.len().min(next.len());
        log::trace!(
            target: "vdom.non_keyed",
            "{} -> {} slots under {parent}",
            prev.len(),
            next.len()
        );
        let surplus = prev.split_off(common);
        for child in surplus.into_iter().rev() {
            self.unmount_child(child, parent)?;
        }
        for (old, new) in prev.into_iter().zip(next.iter_mut()) {
            self.patch_child(old, new, parent, cx)?;
        }
        for new in &mut next[common..] {
            let handle = self.mount_child(new, cx)?;
            self.surface.append(parent, handle)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::node::{VChild, VNode};
    use crate::reconciler::Reconciler;
    use crate::surface::Mutation;
    use crate::test_surface::TestSurface;

    fn items(texts: &[&str]) -> Vec<VChild> {
        texts
            .iter()
            .map(|text| VNode::element("li").child(*text).into())
            .collect()
    }

    #[test]
    fn truncate_removes_tail_backwards() {
        let mut reconciler = Reconciler::new(TestSurface::new());
        let root = reconciler.surface().root();
        let cx = Context::new();
        let mut prev = items(&["a", "b", "c", "d"]);
        reconciler
            .reconcile_non_keyed(Vec::new(), &mut prev, root, &cx)
            .expect("mount failed");
        let removed: Vec<_> = prev[2..].iter().rev().filter_map(VChild::handle).collect();
        reconciler.surface_mut().journal.clear();

        let mut next = items(&["a", "b"]);
        reconciler
            .reconcile_non_keyed(prev, &mut next, root, &cx)
            .expect("reconcile failed");
        let removes: Vec<_> = reconciler
            .surface()
            .journal
            .iter()
            .filter_map(|m| match m {
                Mutation::RemoveChild { child, .. } => Some(*child),
                _ => None,
            })
            .collect();
        assert_eq!(removes, removed);
        assert_eq!(reconciler.surface().render(root), "<li>a</li><li>b</li>");
    }

    #[test]
    fn extend_appends_new_slots() {
        let mut reconciler = Reconciler::new(TestSurface::new());
        let root = reconciler.surface().root();
        let cx = Context::new();
        let mut prev = items(&["a"]);
        reconciler
            .reconcile_non_keyed(Vec::new(), &mut prev, root, &cx)
            .expect("mount failed");
        let first = prev[0].handle();

        let mut next = items(&["a", "b", "c"]);
        reconciler
            .reconcile_non_keyed(prev, &mut next, root, &cx)
            .expect("reconcile failed");
        assert_eq!(next[0].handle(), first);
        assert_eq!(
            reconciler.surface().render(root),
            "<li>a</li><li>b</li><li>c</li>"
        );
        assert_eq!(reconciler.stats().mounts, 3);
    }

    #[test]
    fn identical_sequences_issue_no_mutations() {
        let mut reconciler = Reconciler::new(TestSurface::new());
        let root = reconciler.surface().root();
        let cx = Context::new();
        let mut prev = vec![VChild::text("x"), VChild::empty(), items(&["y"]).remove(0)];
        reconciler
            .reconcile_non_keyed(Vec::new(), &mut prev, root, &cx)
            .expect("mount failed");
        reconciler.surface_mut().journal.clear();

        let mut next = prev.clone();
        reconciler
            .reconcile_non_keyed(prev, &mut next, root, &cx)
            .expect("reconcile failed");
        assert!(reconciler.surface().journal.is_empty());
    }
}
