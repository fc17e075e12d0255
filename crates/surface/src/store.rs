//! Arena-backed in-memory target surface.
//!
//! Handles are slot indices into the arena, allocated in creation order and
//! never reused. Every applied operation is journaled; an insert of a child
//! that is already attached is journaled as [`Mutation::Move`].

use core_types::Handle;
use std::collections::BTreeMap;
use std::sync::Arc;
use vdom::{Mutation, PropValue, SurfaceError, TargetSurface};

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Element {
        tag: Arc<str>,
        attributes: BTreeMap<Arc<str>, String>,
        /// Namespace of each attribute set through `set_attribute_ns`.
        namespaces: BTreeMap<Arc<str>, Arc<str>>,
        properties: BTreeMap<Arc<str>, PropValue>,
        style: StyleState,
    },
    Text {
        text: String,
    },
    Fragment,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct StyleState {
    pub(crate) text: Option<String>,
    pub(crate) entries: BTreeMap<Arc<str>, String>,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<Handle>,
    pub(crate) children: Vec<Handle>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. } | NodeKind::Fragment)
    }
}

/// Per-kind totals of the operations applied to a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationCounts {
    pub creates: usize,
    /// Appends and inserts of unattached children.
    pub inserts: usize,
    pub moves: usize,
    pub removes: usize,
    pub replaces: usize,
    pub clears: usize,
    pub releases: usize,
    pub text_updates: usize,
    pub attribute_updates: usize,
    pub style_updates: usize,
}

impl MutationCounts {
    pub fn from_journal(journal: &[Mutation]) -> Self {
        let mut counts = Self::default();
        for mutation in journal {
            match mutation {
                Mutation::CreateElement { .. }
                | Mutation::CreateText { .. }
                | Mutation::CreateFragment { .. } => counts.creates += 1,
                Mutation::AppendChild { .. } | Mutation::InsertBefore { .. } => {
                    counts.inserts += 1
                }
                Mutation::Move { .. } => counts.moves += 1,
                Mutation::RemoveChild { .. } => counts.removes += 1,
                Mutation::ReplaceChild { .. } => counts.replaces += 1,
                Mutation::ClearChildren { .. } => counts.clears += 1,
                Mutation::Release { .. } => counts.releases += 1,
                Mutation::SetText { .. } => counts.text_updates += 1,
                Mutation::SetAttribute { .. }
                | Mutation::SetAttributeNs { .. }
                | Mutation::RemoveAttribute { .. }
                | Mutation::SetProperty { .. } => counts.attribute_updates += 1,
                Mutation::SetStyle { .. }
                | Mutation::SetStyleText { .. }
                | Mutation::RemoveStyle { .. } => counts.style_updates += 1,
                _ => {}
            }
        }
        counts
    }

    /// Number of operations that changed the shape of the tree.
    pub fn structural(&self) -> usize {
        self.inserts + self.moves + self.removes + self.replaces + self.clears
    }
}

#[derive(Debug)]
pub struct SurfaceStore {
    pub(crate) slots: Vec<Option<NodeRecord>>,
    journal: Vec<Mutation>,
    journaling: bool,
}

impl Default for SurfaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self {
            slots: vec![None],
            journal: Vec::new(),
            journaling: true,
        }
    }

    /// Stops recording applied operations. The journal keeps what it holds.
    pub fn without_journal(mut self) -> Self {
        self.journaling = false;
        self
    }

    /// Creates a detached container element to reconcile into. Root creation
    /// is not journaled.
    pub fn create_root(&mut self, tag: &str) -> Handle {
        self.alloc(NodeKind::Element {
            tag: Arc::from(tag),
            attributes: BTreeMap::new(),
            namespaces: BTreeMap::new(),
            properties: BTreeMap::new(),
            style: StyleState::default(),
        })
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    pub fn counts(&self) -> MutationCounts {
        MutationCounts::from_journal(&self.journal)
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.record(handle).is_ok()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn parent(&self, handle: Handle) -> Option<Handle> {
        self.record(handle).ok()?.parent
    }

    pub fn children(&self, handle: Handle) -> &[Handle] {
        self.record(handle)
            .map(|record| record.children.as_slice())
            .unwrap_or_default()
    }

    /// Children of `handle` with fragment containers replaced by their own
    /// (recursively flattened) children.
    pub fn flattened_children(&self, handle: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        self.flatten_into(handle, &mut out);
        out
    }

    fn flatten_into(&self, handle: Handle, out: &mut Vec<Handle>) {
        for child in self.children(handle) {
            match self.record(*child).map(|record| &record.kind) {
                Ok(NodeKind::Fragment) => self.flatten_into(*child, out),
                _ => out.push(*child),
            }
        }
    }

    pub fn tag(&self, handle: Handle) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self, handle: Handle) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn attribute(&self, handle: Handle, name: &str) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn attribute_namespace(&self, handle: Handle, name: &str) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { namespaces, .. } => namespaces.get(name).map(AsRef::as_ref),
            _ => None,
        }
    }

    pub fn property(&self, handle: Handle, name: &str) -> Option<&PropValue> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { properties, .. } => properties.get(name),
            _ => None,
        }
    }

    pub fn style(&self, handle: Handle, name: &str) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { style, .. } => style.entries.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn style_text(&self, handle: Handle) -> Option<&str> {
        match &self.record(handle).ok()?.kind {
            NodeKind::Element { style, .. } => style.text.as_deref(),
            _ => None,
        }
    }

    /// Concatenated text of every text object below `handle`.
    pub fn text_content(&self, handle: Handle) -> String {
        let mut out = String::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Ok(record) = self.record(current) else {
                continue;
            };
            if let NodeKind::Text { text } = &record.kind {
                out.push_str(text);
            }
            stack.extend(record.children.iter().rev().copied());
        }
        out
    }

    /// Verifies that parent and child links agree everywhere.
    pub fn check_invariants(&self) -> Result<(), SurfaceError> {
        for (index, record) in self.slots.iter().enumerate() {
            let Some(record) = record else { continue };
            let handle = Handle(index as u32);
            for child in &record.children {
                if self.record(*child)?.parent != Some(handle) {
                    return Err(SurfaceError::NotAChild {
                        parent: handle,
                        child: *child,
                    });
                }
            }
            if let Some(parent) = record.parent {
                let listed = self.record(parent)?;
                if listed.children.iter().filter(|c| **c == handle).count() != 1 {
                    return Err(SurfaceError::NotAChild {
                        parent,
                        child: handle,
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies a journal produced by another store created with the same
    /// roots in the same order. Created handles must line up exactly.
    pub fn replay(&mut self, journal: &[Mutation]) -> Result<(), SurfaceError> {
        journal.iter().try_for_each(|mutation| self.apply(mutation))
    }

    pub fn apply(&mut self, mutation: &Mutation) -> Result<(), SurfaceError> {
        match mutation {
            Mutation::CreateElement { handle, tag } => {
                let created = self.create_element(tag);
                expect_handle(*handle, created)
            }
            Mutation::CreateText { handle, text } => {
                let created = self.create_text(text);
                expect_handle(*handle, created)
            }
            Mutation::CreateFragment { handle } => {
                let created = self.create_fragment();
                expect_handle(*handle, created)
            }
            Mutation::AppendChild { parent, child } => self.append(*parent, *child),
            Mutation::InsertBefore {
                parent,
                child,
                before,
            } => self.insert_before(*parent, *child, Some(*before)),
            Mutation::Move {
                parent,
                child,
                before,
            } => self.insert_before(*parent, *child, *before),
            Mutation::RemoveChild { parent, child } => self.remove(*parent, *child),
            Mutation::ReplaceChild { parent, old, new } => self.replace(*parent, *old, *new),
            Mutation::ClearChildren { parent } => self.clear_children(*parent),
            Mutation::Release { handle } => self.release(*handle),
            Mutation::SetText { handle, text } => self.set_text(*handle, text),
            Mutation::SetAttribute {
                handle,
                name,
                value,
            } => self.set_attribute(*handle, name, value),
            Mutation::SetAttributeNs {
                handle,
                namespace,
                name,
                value,
            } => self.set_attribute_ns(*handle, namespace, name, value),
            Mutation::RemoveAttribute { handle, name } => self.remove_attribute(*handle, name),
            Mutation::SetProperty {
                handle,
                name,
                value,
            } => self.set_property(*handle, name, value),
            Mutation::SetStyle {
                handle,
                name,
                value,
            } => self.set_style(*handle, name, value),
            Mutation::SetStyleText { handle, text } => self.set_style_text(*handle, text),
            Mutation::RemoveStyle { handle } => self.remove_style(*handle),
            other => {
                log::warn!(target: "surface.store", "skipping unsupported mutation {other:?}");
                Ok(())
            }
        }
    }

    pub(crate) fn record(&self, handle: Handle) -> Result<&NodeRecord, SurfaceError> {
        if !handle.is_valid() {
            return Err(SurfaceError::InvalidHandle);
        }
        self.slots
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(SurfaceError::UnknownHandle(handle))
    }

    fn record_mut(&mut self, handle: Handle) -> Result<&mut NodeRecord, SurfaceError> {
        if !handle.is_valid() {
            return Err(SurfaceError::InvalidHandle);
        }
        self.slots
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::UnknownHandle(handle))
    }

    fn alloc(&mut self, kind: NodeKind) -> Handle {
        self.slots.push(Some(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        Handle((self.slots.len() - 1) as u32)
    }

    fn record_mutation(&mut self, mutation: Mutation) {
        if self.journaling {
            self.journal.push(mutation);
        }
    }

    fn is_descendant(&self, ancestor: Handle, maybe_descendant: Handle) -> bool {
        let mut current = Some(maybe_descendant);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.record(handle).ok().and_then(|record| record.parent);
        }
        false
    }

    fn unlink(&mut self, child: Handle) -> Result<Option<Handle>, SurfaceError> {
        let parent = self.record_mut(child)?.parent.take();
        if let Some(parent) = parent {
            self.record_mut(parent)?.children.retain(|c| *c != child);
        }
        Ok(parent)
    }

    fn element_mut(&mut self, handle: Handle) -> Result<&mut NodeKind, SurfaceError> {
        let record = self.record_mut(handle)?;
        if !matches!(record.kind, NodeKind::Element { .. }) {
            return Err(SurfaceError::WrongNodeKind(handle));
        }
        Ok(&mut record.kind)
    }

    fn place(
        &mut self,
        parent: Handle,
        child: Handle,
        before: Option<Handle>,
    ) -> Result<(), SurfaceError> {
        if self.is_descendant(child, parent) {
            debug_assert!(false, "cannot create cycle");
            return Err(SurfaceError::CycleDetected { parent, child });
        }
        if !self.record(parent)?.allows_children() {
            debug_assert!(false, "parent node cannot have children");
            return Err(SurfaceError::InvalidParent(parent));
        }
        let attached = self.record(child)?.parent.is_some();
        if let Some(before) = before {
            if before == child {
                // Already in place.
                return Ok(());
            }
            if self.record(before)?.parent != Some(parent) {
                return Err(SurfaceError::NotAChild {
                    parent,
                    child: before,
                });
            }
        }
        self.unlink(child)?;
        let siblings = &mut self.record_mut(parent)?.children;
        let index = match before {
            Some(before) => siblings
                .iter()
                .position(|c| *c == before)
                .ok_or(SurfaceError::NotAChild {
                    parent,
                    child: before,
                })?,
            None => siblings.len(),
        };
        siblings.insert(index, child);
        self.record_mut(child)?.parent = Some(parent);
        log::trace!(target: "surface.store", "place {child} under {parent} before {before:?}");
        self.record_mutation(match (attached, before) {
            (true, before) => Mutation::Move {
                parent,
                child,
                before,
            },
            (false, Some(before)) => Mutation::InsertBefore {
                parent,
                child,
                before,
            },
            (false, None) => Mutation::AppendChild { parent, child },
        });
        Ok(())
    }
}

fn expect_handle(expected: Handle, created: Handle) -> Result<(), SurfaceError> {
    if expected == created {
        Ok(())
    } else {
        Err(SurfaceError::UnknownHandle(expected))
    }
}

impl TargetSurface for SurfaceStore {
    fn create_element(&mut self, tag: &str) -> Handle {
        let handle = self.create_root(tag);
        self.record_mutation(Mutation::CreateElement {
            handle,
            tag: Arc::from(tag),
        });
        handle
    }

    fn create_text(&mut self, text: &str) -> Handle {
        let handle = self.alloc(NodeKind::Text {
            text: text.to_string(),
        });
        self.record_mutation(Mutation::CreateText {
            handle,
            text: text.to_string(),
        });
        handle
    }

    fn create_fragment(&mut self) -> Handle {
        let handle = self.alloc(NodeKind::Fragment);
        self.record_mutation(Mutation::CreateFragment { handle });
        handle
    }

    fn append(&mut self, parent: Handle, child: Handle) -> Result<(), SurfaceError> {
        self.place(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: Handle,
        child: Handle,
        anchor: Option<Handle>,
    ) -> Result<(), SurfaceError> {
        self.place(parent, child, anchor)
    }

    fn remove(&mut self, parent: Handle, child: Handle) -> Result<(), SurfaceError> {
        if self.record(child)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild { parent, child });
        }
        self.unlink(child)?;
        log::trace!(target: "surface.store", "remove {child} from {parent}");
        self.record_mutation(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn replace(&mut self, parent: Handle, old: Handle, new: Handle) -> Result<(), SurfaceError> {
        if self.record(old)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild { parent, child: old });
        }
        if self.is_descendant(new, parent) {
            debug_assert!(false, "cannot create cycle");
            return Err(SurfaceError::CycleDetected { parent, child: new });
        }
        self.unlink(new)?;
        let siblings = &mut self.record_mut(parent)?.children;
        if let Some(slot) = siblings.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.record_mut(old)?.parent = None;
        self.record_mut(new)?.parent = Some(parent);
        self.record_mutation(Mutation::ReplaceChild { parent, old, new });
        Ok(())
    }

    fn clear_children(&mut self, parent: Handle) -> Result<(), SurfaceError> {
        let children = std::mem::take(&mut self.record_mut(parent)?.children);
        for child in &children {
            self.record_mut(*child)?.parent = None;
        }
        log::trace!(target: "surface.store", "clear {} children of {parent}", children.len());
        self.record_mutation(Mutation::ClearChildren { parent });
        Ok(())
    }

    fn release(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        if self.record(handle)?.parent.is_some() {
            return Err(SurfaceError::StillAttached(handle));
        }
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.slots.get_mut(current.0 as usize).and_then(Option::take) {
                stack.extend(record.children);
            }
        }
        self.record_mutation(Mutation::Release { handle });
        Ok(())
    }

    fn next_sibling(&self, handle: Handle) -> Option<Handle> {
        let parent = self.record(handle).ok()?.parent?;
        let siblings = &self.record(parent).ok()?.children;
        let index = siblings.iter().position(|c| *c == handle)?;
        siblings.get(index + 1).copied()
    }

    fn set_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError> {
        match &mut self.record_mut(handle)?.kind {
            NodeKind::Text { text: existing } => {
                existing.clear();
                existing.push_str(text);
            }
            _ => return Err(SurfaceError::WrongNodeKind(handle)),
        }
        self.record_mutation(Mutation::SetText {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&mut self, handle: Handle, name: &str, value: &str) -> Result<(), SurfaceError> {
        if let NodeKind::Element {
            attributes,
            namespaces,
            ..
        } = self.element_mut(handle)?
        {
            attributes.insert(Arc::from(name), value.to_string());
            namespaces.remove(name);
        }
        self.record_mutation(Mutation::SetAttribute {
            handle,
            name: Arc::from(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_attribute_ns(
        &mut self,
        handle: Handle,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<(), SurfaceError> {
        if let NodeKind::Element {
            attributes,
            namespaces,
            ..
        } = self.element_mut(handle)?
        {
            attributes.insert(Arc::from(name), value.to_string());
            namespaces.insert(Arc::from(name), Arc::from(namespace));
        }
        self.record_mutation(Mutation::SetAttributeNs {
            handle,
            namespace: Arc::from(namespace),
            name: Arc::from(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, handle: Handle, name: &str) -> Result<(), SurfaceError> {
        if let NodeKind::Element {
            attributes,
            namespaces,
            ..
        } = self.element_mut(handle)?
        {
            attributes.remove(name);
            namespaces.remove(name);
        }
        self.record_mutation(Mutation::RemoveAttribute {
            handle,
            name: Arc::from(name),
        });
        Ok(())
    }

    fn set_property(
        &mut self,
        handle: Handle,
        name: &str,
        value: &PropValue,
    ) -> Result<(), SurfaceError> {
        if let NodeKind::Element { properties, .. } = self.element_mut(handle)? {
            properties.insert(Arc::from(name), value.clone());
        }
        self.record_mutation(Mutation::SetProperty {
            handle,
            name: Arc::from(name),
            value: value.clone(),
        });
        Ok(())
    }

    fn set_style(&mut self, handle: Handle, name: &str, value: &str) -> Result<(), SurfaceError> {
        if let NodeKind::Element { style, .. } = self.element_mut(handle)? {
            if value.is_empty() {
                style.entries.remove(name);
            } else {
                style.entries.insert(Arc::from(name), value.to_string());
            }
        }
        self.record_mutation(Mutation::SetStyle {
            handle,
            name: Arc::from(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_style_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError> {
        if let NodeKind::Element { style, .. } = self.element_mut(handle)? {
            style.entries.clear();
            style.text = Some(text.to_string());
        }
        self.record_mutation(Mutation::SetStyleText {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn remove_style(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        if let NodeKind::Element { style, .. } = self.element_mut(handle)? {
            *style = StyleState::default();
        }
        self.record_mutation(Mutation::RemoveStyle { handle });
        Ok(())
    }
}
