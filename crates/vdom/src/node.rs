//! Per-render node descriptors.
//!
//! A descriptor tree is an immutable description of what should exist after a
//! render pass. The only fields the reconciler writes are the `handle` of
//! each node or child slot and the `instance` of component nodes, which it
//! transplants from the previous tree (or fills in on mount).

use crate::component::{ComponentNode, ComponentType, Hooks};
use crate::props::Props;
use core_types::{Handle, InstanceId, Key, TemplateId};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct VNode {
    pub kind: VNodeKind,
    pub key: Option<Key>,
    pub template: Option<TemplateId>,
    pub handle: Option<Handle>,
}

#[derive(Clone, Debug)]
pub enum VNodeKind {
    Text(String),
    Element(ElementNode),
    Fragment(Vec<VChild>),
    Component(ComponentNode),
}

#[derive(Clone, Debug)]
pub struct ElementNode {
    pub tag: Arc<str>,
    pub props: Props,
    pub children: Vec<VChild>,
}

impl VNode {
    fn from_kind(kind: VNodeKind) -> Self {
        Self {
            kind,
            key: None,
            template: None,
            handle: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::from_kind(VNodeKind::Text(text.into()))
    }

    pub fn element(tag: &str) -> Self {
        Self::from_kind(VNodeKind::Element(ElementNode {
            tag: Arc::from(tag),
            props: Props::new(),
            children: Vec::new(),
        }))
    }

    pub fn fragment(children: Vec<VChild>) -> Self {
        Self::from_kind(VNodeKind::Fragment(children))
    }

    pub fn component(component: impl Into<ComponentType>, props: Props) -> Self {
        Self::from_kind(VNodeKind::Component(ComponentNode {
            component: component.into(),
            props,
            children: Vec::new(),
            hooks: None,
            instance: None,
        }))
    }

    pub fn keyed(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_template(mut self, template: TemplateId) -> Self {
        self.template = Some(template);
        self
    }

    /// Replaces the props of an element or component node.
    pub fn with_props(mut self, props: Props) -> Self {
        match &mut self.kind {
            VNodeKind::Element(element) => element.props = props,
            VNodeKind::Component(component) => component.props = props,
            VNodeKind::Text(_) | VNodeKind::Fragment(_) => {}
        }
        self
    }

    /// Replaces the children of an element, fragment or component node.
    pub fn with_children(mut self, children: Vec<VChild>) -> Self {
        match &mut self.kind {
            VNodeKind::Element(element) => element.children = children,
            VNodeKind::Fragment(items) => *items = children,
            VNodeKind::Component(component) => component.children = children,
            VNodeKind::Text(_) => {}
        }
        self
    }

    pub fn child(self, child: impl Into<VChild>) -> Self {
        let mut node = self;
        if let Some(children) = node.children_mut() {
            children.push(child.into());
        }
        node
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        if let VNodeKind::Component(component) = &mut self.kind {
            component.hooks = Some(Rc::new(hooks));
        }
        self
    }

    pub fn children(&self) -> Option<&[VChild]> {
        match &self.kind {
            VNodeKind::Element(element) => Some(&element.children),
            VNodeKind::Fragment(items) => Some(items),
            VNodeKind::Component(component) => Some(&component.children),
            VNodeKind::Text(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<VChild>> {
        match &mut self.kind {
            VNodeKind::Element(element) => Some(&mut element.children),
            VNodeKind::Fragment(items) => Some(items),
            VNodeKind::Component(component) => Some(&mut component.children),
            VNodeKind::Text(_) => None,
        }
    }

    pub fn instance(&self) -> Option<InstanceId> {
        match &self.kind {
            VNodeKind::Component(component) => component.instance,
            _ => None,
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            VNodeKind::Text(_) => "#text",
            VNodeKind::Element(element) => &element.tag,
            VNodeKind::Fragment(_) => "#fragment",
            VNodeKind::Component(component) => component.component.name(),
        }
    }

    /// Returns `true` if no component node appears anywhere in this subtree.
    pub fn is_component_free(&self) -> bool {
        match &self.kind {
            VNodeKind::Component(_) => false,
            VNodeKind::Text(_) => true,
            VNodeKind::Element(ElementNode { children, .. }) | VNodeKind::Fragment(children) => {
                children.iter().all(VChild::is_component_free)
            }
        }
    }
}

/// One slot of a child sequence.
///
/// Every slot occupies exactly one position among its parent's live
/// children: text and empty slots are text objects, nested sequences are
/// fragment containers.
#[derive(Clone, Debug)]
pub enum VChild {
    Empty { handle: Option<Handle> },
    Text { text: String, handle: Option<Handle> },
    List { items: Vec<VChild>, handle: Option<Handle> },
    Node(VNode),
}

impl Default for VChild {
    fn default() -> Self {
        VChild::empty()
    }
}

impl VChild {
    pub fn empty() -> Self {
        VChild::Empty { handle: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        VChild::Text {
            text: text.into(),
            handle: None,
        }
    }

    pub fn list(items: Vec<VChild>) -> Self {
        VChild::List {
            items,
            handle: None,
        }
    }

    pub fn handle(&self) -> Option<Handle> {
        match self {
            VChild::Empty { handle } | VChild::Text { handle, .. } | VChild::List { handle, .. } => {
                *handle
            }
            VChild::Node(node) => node.handle,
        }
    }

    pub fn set_handle(&mut self, value: Handle) {
        match self {
            VChild::Empty { handle } | VChild::Text { handle, .. } | VChild::List { handle, .. } => {
                *handle = Some(value)
            }
            VChild::Node(node) => node.handle = Some(value),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            VChild::Node(node) => node.key.as_ref(),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&VNode> {
        match self {
            VChild::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_component_free(&self) -> bool {
        match self {
            VChild::Empty { .. } | VChild::Text { .. } => true,
            VChild::List { items, .. } => items.iter().all(VChild::is_component_free),
            VChild::Node(node) => node.is_component_free(),
        }
    }
}

impl From<VNode> for VChild {
    fn from(node: VNode) -> Self {
        VChild::Node(node)
    }
}

impl From<&str> for VChild {
    fn from(text: &str) -> Self {
        VChild::text(text)
    }
}

impl From<String> for VChild {
    fn from(text: String) -> Self {
        VChild::text(text)
    }
}

impl From<Vec<VChild>> for VChild {
    fn from(items: Vec<VChild>) -> Self {
        VChild::list(items)
    }
}

/// Returns `true` if the pair of sequences must be reconciled by key.
pub fn is_keyed(prev: &[VChild], next: &[VChild]) -> bool {
    prev.iter().chain(next).any(|child| child.key().is_some())
}
