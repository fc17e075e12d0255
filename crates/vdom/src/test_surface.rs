//! Minimal in-memory surface for the unit tests of this crate.

use crate::props::PropValue;
use crate::surface::{Mutation, SurfaceError, TargetSurface};
use core_types::Handle;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
enum TestKind {
    Element(Arc<str>),
    Text(String),
    Fragment,
}

#[derive(Clone, Debug)]
struct TestNode {
    kind: TestKind,
    parent: Option<Handle>,
    children: Vec<Handle>,
    attributes: BTreeMap<String, String>,
}

#[derive(Debug)]
pub(crate) struct TestSurface {
    nodes: Vec<Option<TestNode>>,
    pub(crate) journal: Vec<Mutation>,
}

impl Default for TestSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSurface {
    /// Creates a surface holding a single `#root` element at `Handle(1)`.
    pub(crate) fn new() -> Self {
        let mut surface = Self {
            nodes: vec![None],
            journal: Vec::new(),
        };
        surface.alloc(TestKind::Element(Arc::from("#root")));
        surface
    }

    pub(crate) fn root(&self) -> Handle {
        Handle(1)
    }

    pub(crate) fn is_live(&self, handle: Handle) -> bool {
        self.node(handle).is_ok()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Renders the children of `parent` as markup, inlining fragments.
    pub(crate) fn render(&self, parent: Handle) -> String {
        let mut out = String::new();
        if let Ok(node) = self.node(parent) {
            for child in &node.children {
                self.render_into(*child, &mut out);
            }
        }
        out
    }

    fn render_into(&self, handle: Handle, out: &mut String) {
        let Ok(node) = self.node(handle) else {
            out.push_str("<?>");
            return;
        };
        match &node.kind {
            TestKind::Text(text) => out.push_str(text),
            TestKind::Fragment => {
                for child in &node.children {
                    self.render_into(*child, out);
                }
            }
            TestKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attributes {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                for child in &node.children {
                    self.render_into(*child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        for (index, node) in self.nodes.iter().enumerate() {
            let Some(node) = node else { continue };
            let handle = Handle(index as u32);
            for child in &node.children {
                let parent = self.node(*child).map_err(|e| e.to_string())?.parent;
                if parent != Some(handle) {
                    return Err(format!("{child} listed under {handle} but parent is {parent:?}"));
                }
            }
            if let Some(parent) = node.parent {
                let listed = self.node(parent).map_err(|e| e.to_string())?;
                if listed.children.iter().filter(|c| **c == handle).count() != 1 {
                    return Err(format!("{handle} not listed exactly once under {parent}"));
                }
            }
        }
        Ok(())
    }

    fn alloc(&mut self, kind: TestKind) -> Handle {
        self.nodes.push(Some(TestNode {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }));
        Handle((self.nodes.len() - 1) as u32)
    }

    fn node(&self, handle: Handle) -> Result<&TestNode, SurfaceError> {
        self.nodes
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(SurfaceError::UnknownHandle(handle))
    }

    fn node_mut(&mut self, handle: Handle) -> Result<&mut TestNode, SurfaceError> {
        self.nodes
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::UnknownHandle(handle))
    }

    fn container(&self, handle: Handle) -> Result<&TestNode, SurfaceError> {
        let node = self.node(handle)?;
        if matches!(node.kind, TestKind::Text(_)) {
            return Err(SurfaceError::InvalidParent(handle));
        }
        Ok(node)
    }

    fn unlink(&mut self, child: Handle) -> Result<(), SurfaceError> {
        if let Some(parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(parent)?.children.retain(|c| *c != child);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: Handle, mut handle: Handle) -> bool {
        loop {
            if handle == ancestor {
                return true;
            }
            match self.node(handle).ok().and_then(|node| node.parent) {
                Some(parent) => handle = parent,
                None => return false,
            }
        }
    }

    fn place(
        &mut self,
        parent: Handle,
        child: Handle,
        anchor: Option<Handle>,
    ) -> Result<(), SurfaceError> {
        self.container(parent)?;
        let attached = self.node(child)?.parent.is_some();
        if self.is_ancestor(child, parent) {
            return Err(SurfaceError::CycleDetected { parent, child });
        }
        if let Some(anchor) = anchor
            && self.node(anchor)?.parent != Some(parent)
        {
            return Err(SurfaceError::NotAChild {
                parent,
                child: anchor,
            });
        }
        self.unlink(child)?;
        let children = &mut self.node_mut(parent)?.children;
        let index = anchor
            .and_then(|anchor| children.iter().position(|c| *c == anchor))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.journal.push(match (attached, anchor) {
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

    fn element_mut(&mut self, handle: Handle) -> Result<&mut TestNode, SurfaceError> {
        let node = self.node_mut(handle)?;
        if !matches!(node.kind, TestKind::Element(_)) {
            return Err(SurfaceError::WrongNodeKind(handle));
        }
        Ok(node)
    }
}

impl TargetSurface for TestSurface {
    fn create_element(&mut self, tag: &str) -> Handle {
        let tag: Arc<str> = Arc::from(tag);
        let handle = self.alloc(TestKind::Element(Arc::clone(&tag)));
        self.journal.push(Mutation::CreateElement { handle, tag });
        handle
    }

    fn create_text(&mut self, text: &str) -> Handle {
        let handle = self.alloc(TestKind::Text(text.to_string()));
        self.journal.push(Mutation::CreateText {
            handle,
            text: text.to_string(),
        });
        handle
    }

    fn create_fragment(&mut self) -> Handle {
        let handle = self.alloc(TestKind::Fragment);
        self.journal.push(Mutation::CreateFragment { handle });
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
        if self.node(child)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild { parent, child });
        }
        self.unlink(child)?;
        self.journal.push(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn replace(&mut self, parent: Handle, old: Handle, new: Handle) -> Result<(), SurfaceError> {
        if self.node(old)?.parent != Some(parent) {
            return Err(SurfaceError::NotAChild { parent, child: old });
        }
        self.unlink(new)?;
        let children = &mut self.node_mut(parent)?.children;
        if let Some(slot) = children.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        self.journal.push(Mutation::ReplaceChild { parent, old, new });
        Ok(())
    }

    fn clear_children(&mut self, parent: Handle) -> Result<(), SurfaceError> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        self.journal.push(Mutation::ClearChildren { parent });
        Ok(())
    }

    fn release(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        if self.node(handle)?.parent.is_some() {
            return Err(SurfaceError::StillAttached(handle));
        }
        let mut stack = vec![handle];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0 as usize).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        self.journal.push(Mutation::Release { handle });
        Ok(())
    }

    fn next_sibling(&self, handle: Handle) -> Option<Handle> {
        let parent = self.node(handle).ok()?.parent?;
        let children = &self.node(parent).ok()?.children;
        let index = children.iter().position(|c| *c == handle)?;
        children.get(index + 1).copied()
    }

    fn set_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError> {
        match &mut self.node_mut(handle)?.kind {
            TestKind::Text(current) => *current = text.to_string(),
            _ => return Err(SurfaceError::WrongNodeKind(handle)),
        }
        self.journal.push(Mutation::SetText {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&mut self, handle: Handle, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element_mut(handle)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.journal.push(Mutation::SetAttribute {
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
        self.element_mut(handle)?
            .attributes
            .insert(name.to_string(), value.to_string());
        self.journal.push(Mutation::SetAttributeNs {
            handle,
            namespace: Arc::from(namespace),
            name: Arc::from(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, handle: Handle, name: &str) -> Result<(), SurfaceError> {
        self.element_mut(handle)?.attributes.remove(name);
        self.journal.push(Mutation::RemoveAttribute {
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
        self.element_mut(handle)?;
        self.journal.push(Mutation::SetProperty {
            handle,
            name: Arc::from(name),
            value: value.clone(),
        });
        Ok(())
    }

    fn set_style(&mut self, handle: Handle, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.element_mut(handle)?;
        self.journal.push(Mutation::SetStyle {
            handle,
            name: Arc::from(name),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_style_text(&mut self, handle: Handle, text: &str) -> Result<(), SurfaceError> {
        self.element_mut(handle)?;
        self.journal.push(Mutation::SetStyleText {
            handle,
            text: text.to_string(),
        });
        Ok(())
    }

    fn remove_style(&mut self, handle: Handle) -> Result<(), SurfaceError> {
        self.element_mut(handle)?;
        self.journal.push(Mutation::RemoveStyle { handle });
        Ok(())
    }
}
