//! Keyed reconciliation.
//!
//! Items are matched by key, never by position. The pass narrows the
//! unresolved region from both ends while the heads, the tails, or a head
//! and the opposite tail match, relocating crossed items in the last two
//! cases. Whatever remains is either pure insertion, pure removal, or
//! resolved through a key-to-index map and a reverse walk that places each
//! item before the one after it. Unmatched previous items are removed once
//! the walk is done.
//!
//! Invariants:
//! - Every previous item is either matched and patched exactly once, or
//!   unlinked and detached exactly once.
//! - Unkeyed items never match; they are always mounted or removed.
//! - A matched item is relocated only when its next live sibling is not the
//!   item it must precede.

use crate::context::Context;
use crate::error::ReconcileError;
use crate::node::VChild;
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::{Handle, Key};
use std::collections::HashMap;
use std::mem;

fn same_key(a: &VChild, b: &VChild) -> bool {
    matches!((a.key(), b.key()), (Some(a), Some(b)) if a == b)
}

fn live_handle(child: &VChild) -> Result<Handle, ReconcileError> {
    child.handle().ok_or_else(|| ReconcileError::MissingHandle {
        key: child.key().cloned(),
    })
}

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    /// Reconciles two sequences by key.
    pub fn reconcile_keyed(
        &mut self,
        prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.patch_keyed(prev, next, parent, cx)?;
        self.flush_mounted();
        Ok(())
    }

    pub(crate) fn patch_keyed(
        &mut self,
        mut prev: Vec<VChild>,
        next: &mut [VChild],
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        if next.is_empty() {
            if prev.len() >= self.config.bulk_clear_threshold {
                return self.bulk_clear(prev, parent);
            }
            for child in prev {
                self.unmount_child(child, parent)?;
            }
            return Ok(());
        }
        if prev.is_empty() {
            for child in next.iter_mut() {
                let handle = self.mount_child(child, cx)?;
                self.surface.append(parent, handle)?;
            }
            return Ok(());
        }

        let mut old_start = 0;
        let mut old_end = prev.len();
        let mut new_start = 0;
        let mut new_end = next.len();

        while old_start < old_end && new_start < new_end {
            let mark = (old_start, old_end, new_start, new_end);
            while old_start < old_end
                && new_start < new_end
                && same_key(&prev[old_start], &next[new_start])
            {
                let old = mem::take(&mut prev[old_start]);
                self.patch_child(old, &mut next[new_start], parent, cx)?;
                old_start += 1;
                new_start += 1;
            }
            while old_start < old_end
                && new_start < new_end
                && same_key(&prev[old_end - 1], &next[new_end - 1])
            {
                let old = mem::take(&mut prev[old_end - 1]);
                self.patch_child(old, &mut next[new_end - 1], parent, cx)?;
                old_end -= 1;
                new_end -= 1;
            }
            // Old head is the new tail.
            while old_start < old_end
                && new_start < new_end
                && same_key(&prev[old_start], &next[new_end - 1])
            {
                let old = mem::take(&mut prev[old_start]);
                self.patch_child(old, &mut next[new_end - 1], parent, cx)?;
                let anchor = next.get(new_end).and_then(VChild::handle);
                let handle = live_handle(&next[new_end - 1])?;
                self.surface.insert_before(parent, handle, anchor)?;
                self.stats.moves += 1;
                old_start += 1;
                new_end -= 1;
            }
            // Old tail is the new head.
            while old_start < old_end
                && new_start < new_end
                && same_key(&prev[old_end - 1], &next[new_start])
            {
                let anchor = live_handle(&prev[old_start])?;
                let old = mem::take(&mut prev[old_end - 1]);
                self.patch_child(old, &mut next[new_start], parent, cx)?;
                let handle = live_handle(&next[new_start])?;
                // The last unresolved old item is its own anchor and already in place.
                if handle != anchor {
                    self.surface.insert_before(parent, handle, Some(anchor))?;
                    self.stats.moves += 1;
                }
                old_end -= 1;
                new_start += 1;
            }
            if mark == (old_start, old_end, new_start, new_end) {
                break;
            }
        }

        if old_start >= old_end {
            let anchor = next.get(new_end).and_then(VChild::handle);
            for child in &mut next[new_start..new_end] {
                let handle = self.mount_child(child, cx)?;
                self.surface.insert_before(parent, handle, anchor)?;
            }
            return Ok(());
        }
        if new_start >= new_end {
            for child in &mut prev[old_start..old_end] {
                self.unmount_child(mem::take(child), parent)?;
            }
            return Ok(());
        }
        let anchor = next.get(new_end).and_then(VChild::handle);
        self.patch_keyed_by_map(
            &mut prev[old_start..old_end],
            &mut next[new_start..new_end],
            anchor,
            parent,
            cx,
        )
    }

    /// Resolves the unresolved region `old` against `region`, which must end
    /// right before the live item `anchor` (or at the end of `parent`).
    ///
    /// Every matched previous item is taken out of `old` as the walk reaches
    /// it; the rest stay linked until the walk is done and are removed in
    /// their previous order.
    fn patch_keyed_by_map(
        &mut self,
        old: &mut [VChild],
        region: &mut [VChild],
        mut anchor: Option<Handle>,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        self.stats.keyed_map_passes += 1;
        let check = self.config.check_duplicate_keys;

        let mut index: HashMap<&Key, usize> = HashMap::with_capacity(old.len());
        for (i, child) in old.iter().enumerate() {
            if let Some(key) = child.key()
                && index.insert(key, i).is_some()
                && check
            {
                log::warn!(target: "vdom.keyed", "duplicate key {key} in previous sequence");
            }
        }

        let mut taken = vec![false; old.len()];
        let mut sources: Vec<Option<usize>> = Vec::with_capacity(region.len());
        for child in region.iter() {
            let source = match child.key().and_then(|key| index.get(key)) {
                Some(&i) if !taken[i] => {
                    taken[i] = true;
                    Some(i)
                }
                Some(_) => {
                    if check {
                        log::warn!(
                            target: "vdom.keyed",
                            "duplicate key {} in next sequence",
                            child.key().map(Key::to_string).unwrap_or_default()
                        );
                    }
                    None
                }
                None => None,
            };
            sources.push(source);
        }
        drop(index);

        log::trace!(
            target: "vdom.keyed",
            "map pass: {} previous, {} next, {} matched",
            old.len(),
            sources.len(),
            taken.iter().filter(|t| **t).count()
        );

        for (slot, source) in region.iter_mut().zip(sources).rev() {
            let handle = match source {
                Some(i) => {
                    let prev = mem::take(&mut old[i]);
                    self.patch_child(prev, slot, parent, cx)?;
                    let handle = live_handle(slot)?;
                    if self.surface.next_sibling(handle) != anchor {
                        self.surface.insert_before(parent, handle, anchor)?;
                        self.stats.moves += 1;
                    }
                    handle
                }
                None => {
                    let handle = self.mount_child(slot, cx)?;
                    self.surface.insert_before(parent, handle, anchor)?;
                    handle
                }
            };
            anchor = Some(handle);
        }

        for (child, taken) in old.iter_mut().zip(taken) {
            if !taken {
                self.unmount_child(mem::take(child), parent)?;
            }
        }
        Ok(())
    }

    /// Clears `parent` in one operation and detaches every previous item.
    fn bulk_clear(&mut self, prev: Vec<VChild>, parent: Handle) -> Result<(), ReconcileError> {
        log::debug!(
            target: "vdom.keyed",
            "bulk clear of {} items under {parent}",
            prev.len()
        );
        self.surface.clear_children(parent)?;
        self.stats.bulk_clears += 1;
        for child in prev {
            self.detach(child)?;
        }
        Ok(())
    }
}
