//! Components: descriptor types, the instance arena and the update protocol.
//!
//! A component node never owns a surface object of its own. Its `handle` is
//! the handle of its rendered root, and its rendered subtree lives in the
//! reconciler's [`InstanceArena`] rather than in the descriptor tree, so the
//! tree never holds a back-reference into itself.
//!
//! Update protocol:
//! - Stateful: merge the instance's child context, ask the instance for its
//!   next subtree, and if one is produced reconcile it against the previously
//!   rendered subtree and record it.
//! - Stateless: `should_update` (default true) gates `will_update`, render and
//!   `did_update`. A `false` answer keeps the previous subtree untouched.

use crate::context::Context;
use crate::error::ReconcileError;
use crate::node::{VChild, VNode, VNodeKind};
use crate::props::Props;
use crate::recycle::Recycler;
use crate::reconciler::Reconciler;
use crate::surface::TargetSurface;
use core_types::{Handle, InstanceId};
use std::fmt;
use std::rc::Rc;

/// Behaviour of a component that keeps state across renders.
pub trait StatefulComponent {
    fn render(&mut self, props: &Props, children: &[VChild], cx: &Context) -> VNode;

    /// Values this component contributes to the context of its subtree.
    fn child_context(&self) -> Option<Context> {
        None
    }

    fn should_update(&self, _prev: &Props, _next: &Props) -> bool {
        true
    }

    /// Computes the next rendered subtree, or `None` to keep the current one.
    fn update(
        &mut self,
        prev: &Props,
        next: &Props,
        children: &[VChild],
        cx: &Context,
    ) -> Option<VNode> {
        if self.should_update(prev, next) {
            Some(self.render(next, children, cx))
        } else {
            None
        }
    }

    fn did_mount(&mut self, _handle: Handle) {}

    fn will_unmount(&mut self) {}
}

type CreateFn = dyn Fn(&Props) -> Box<dyn StatefulComponent>;
type RenderFn = dyn Fn(&Props, &[VChild]) -> VNode;

/// Factory for instances of one stateful component.
///
/// Two descriptors refer to the same component only if they share the same
/// factory (clones of one `StatefulType`).
#[derive(Clone)]
pub struct StatefulType {
    name: &'static str,
    create: Rc<CreateFn>,
}

impl StatefulType {
    pub fn new(
        name: &'static str,
        create: impl Fn(&Props) -> Box<dyn StatefulComponent> + 'static,
    ) -> Self {
        Self {
            name,
            create: Rc::new(create),
        }
    }
}

/// Render function of a stateless component.
#[derive(Clone)]
pub struct StatelessType {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl StatelessType {
    pub fn new(name: &'static str, render: impl Fn(&Props, &[VChild]) -> VNode + 'static) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }
}

#[derive(Clone)]
pub enum ComponentType {
    Stateful(StatefulType),
    Stateless(StatelessType),
}

impl ComponentType {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::Stateful(ty) => ty.name,
            ComponentType::Stateless(ty) => ty.name,
        }
    }

    pub fn same_as(&self, other: &ComponentType) -> bool {
        match (self, other) {
            (ComponentType::Stateful(a), ComponentType::Stateful(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(&a.create), Rc::as_ptr(&b.create))
            }
            (ComponentType::Stateless(a), ComponentType::Stateless(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(&a.render), Rc::as_ptr(&b.render))
            }
            _ => false,
        }
    }
}

impl From<StatefulType> for ComponentType {
    fn from(ty: StatefulType) -> Self {
        ComponentType::Stateful(ty)
    }
}

impl From<StatelessType> for ComponentType {
    fn from(ty: StatelessType) -> Self {
        ComponentType::Stateless(ty)
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Stateful(ty) => write!(f, "Stateful({})", ty.name),
            ComponentType::Stateless(ty) => write!(f, "Stateless({})", ty.name),
        }
    }
}

type PropsHook = dyn Fn(Handle, &Props, &Props);
type ShouldUpdateHook = dyn Fn(Handle, &Props, &Props) -> bool;
type HandleHook = dyn Fn(Handle);

/// Optional lifecycle callbacks attached to a stateless component node.
#[derive(Default)]
pub struct Hooks {
    should_update: Option<Box<ShouldUpdateHook>>,
    will_update: Option<Box<PropsHook>>,
    did_update: Option<Box<PropsHook>>,
    did_mount: Option<Box<HandleHook>>,
    will_unmount: Option<Box<HandleHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_update(mut self, f: impl Fn(Handle, &Props, &Props) -> bool + 'static) -> Self {
        self.should_update = Some(Box::new(f));
        self
    }

    pub fn will_update(mut self, f: impl Fn(Handle, &Props, &Props) + 'static) -> Self {
        self.will_update = Some(Box::new(f));
        self
    }

    pub fn did_update(mut self, f: impl Fn(Handle, &Props, &Props) + 'static) -> Self {
        self.did_update = Some(Box::new(f));
        self
    }

    pub fn did_mount(mut self, f: impl Fn(Handle) + 'static) -> Self {
        self.did_mount = Some(Box::new(f));
        self
    }

    pub fn will_unmount(mut self, f: impl Fn(Handle) + 'static) -> Self {
        self.will_unmount = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("should_update", &self.should_update.is_some())
            .field("will_update", &self.will_update.is_some())
            .field("did_update", &self.did_update.is_some())
            .field("did_mount", &self.did_mount.is_some())
            .field("will_unmount", &self.will_unmount.is_some())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ComponentNode {
    pub component: ComponentType,
    pub props: Props,
    pub children: Vec<VChild>,
    pub hooks: Option<Rc<Hooks>>,
    pub instance: Option<InstanceId>,
}

pub(crate) enum InstanceBody {
    Stateful(Box<dyn StatefulComponent>),
    Stateless,
}

pub(crate) struct Instance {
    pub(crate) body: InstanceBody,
    pub(crate) props: Props,
    pub(crate) hooks: Option<Rc<Hooks>>,
    pub(crate) rendered: Option<VNode>,
}

impl Instance {
    fn handle(&self) -> Option<Handle> {
        self.rendered.as_ref().and_then(|node| node.handle)
    }
}

/// Slot storage for live component instances.
#[derive(Default)]
pub struct InstanceArena {
    slots: Vec<Option<Instance>>,
    free: Vec<u32>,
    live: usize,
}

impl InstanceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    /// Handle of the instance's rendered root, if it has been mounted.
    pub fn handle_of(&self, id: InstanceId) -> Option<Handle> {
        self.get(id).and_then(Instance::handle)
    }

    pub(crate) fn alloc(&mut self, instance: Instance) -> InstanceId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(instance);
            return InstanceId(index);
        }
        self.slots.push(Some(instance));
        InstanceId((self.slots.len() - 1) as u32)
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub(crate) fn free(&mut self, id: InstanceId) -> Option<Instance> {
        let instance = self.slots.get_mut(id.0 as usize)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(instance)
    }
}

impl fmt::Debug for InstanceArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceArena")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl<S: TargetSurface, R: Recycler> Reconciler<S, R> {
    /// Builds a component's first rendered subtree and registers its instance.
    pub(crate) fn mount_component(
        &mut self,
        node: &mut VNode,
        cx: &Context,
    ) -> Result<Handle, ReconcileError> {
        let VNodeKind::Component(component) = &mut node.kind else {
            return self.build_node(node, cx);
        };
        let (body, mut rendered, child_cx) = match &component.component {
            ComponentType::Stateful(ty) => {
                let mut object = (ty.create)(&component.props);
                let child_cx = match object.child_context() {
                    Some(extra) => cx.merged(&extra),
                    None => cx.clone(),
                };
                let rendered = object.render(&component.props, &component.children, &child_cx);
                (InstanceBody::Stateful(object), rendered, child_cx)
            }
            ComponentType::Stateless(ty) => {
                let rendered = (ty.render)(&component.props, &component.children);
                (InstanceBody::Stateless, rendered, cx.clone())
            }
        };
        log::trace!(
            target: "vdom.component",
            "mount component {}",
            component.component.name()
        );
        let props = component.props.clone();
        let hooks = component.hooks.clone();
        let handle = self.build_node(&mut rendered, &child_cx)?;
        let id = self.instances.alloc(Instance {
            body,
            props,
            hooks,
            rendered: Some(rendered),
        });
        if let VNodeKind::Component(component) = &mut node.kind {
            component.instance = Some(id);
        }
        self.pending_mounts.push(id);
        Ok(handle)
    }

    /// Runs the update protocol for two component nodes of the same type.
    pub(crate) fn update_component(
        &mut self,
        prev: VNode,
        next: &mut VNode,
        parent: Handle,
        cx: &Context,
    ) -> Result<(), ReconcileError> {
        let VNode {
            kind, key, handle, ..
        } = prev;
        let VNodeKind::Component(prev_component) = kind else {
            return Err(ReconcileError::ShapeMismatch);
        };
        let handle = handle.ok_or_else(|| ReconcileError::MissingHandle { key: key.clone() })?;
        let id = prev_component
            .instance
            .ok_or(ReconcileError::MissingInstance { key })?;
        let VNodeKind::Component(next_component) = &mut next.kind else {
            return Err(ReconcileError::ShapeMismatch);
        };
        next_component.instance = Some(id);
        next.handle = Some(handle);

        let instance = self
            .instances
            .get_mut(id)
            .ok_or(ReconcileError::UnknownInstance(id))?;
        let hooks = next_component.hooks.clone();
        instance.hooks = hooks.clone();

        let (rendered, child_cx) = match &mut instance.body {
            InstanceBody::Stateful(object) => {
                let child_cx = match object.child_context() {
                    Some(extra) => cx.merged(&extra),
                    None => cx.clone(),
                };
                let prev_props =
                    std::mem::replace(&mut instance.props, next_component.props.clone());
                let rendered = object.update(
                    &prev_props,
                    &next_component.props,
                    &next_component.children,
                    &child_cx,
                );
                (rendered, child_cx)
            }
            InstanceBody::Stateless => {
                let ComponentType::Stateless(ty) = &next_component.component else {
                    return Err(ReconcileError::ShapeMismatch);
                };
                let hooks = hooks.as_deref();
                let should_update = hooks
                    .and_then(|h| h.should_update.as_ref())
                    .is_none_or(|f| f(handle, &prev_component.props, &next_component.props));
                if should_update {
                    if let Some(f) = hooks.and_then(|h| h.will_update.as_ref()) {
                        f(handle, &prev_component.props, &next_component.props);
                    }
                    instance.props = next_component.props.clone();
                    let rendered = (ty.render)(&next_component.props, &next_component.children);
                    (Some(rendered), cx.clone())
                } else {
                    (None, cx.clone())
                }
            }
        };

        let Some(mut rendered) = rendered else {
            log::trace!(
                target: "vdom.component",
                "skip update of {}",
                next_component.component.name()
            );
            self.stats.component_skips += 1;
            return Ok(());
        };

        let last = self
            .instances
            .get_mut(id)
            .and_then(|instance| instance.rendered.take())
            .ok_or(ReconcileError::UnknownInstance(id))?;
        self.diff_nodes(last, &mut rendered, parent, &child_cx)?;
        next.handle = rendered.handle;
        if let Some(instance) = self.instances.get_mut(id) {
            instance.rendered = Some(rendered);
        }
        self.stats.component_updates += 1;

        if matches!(next_component.component, ComponentType::Stateless(_)) {
            let did_update = hooks.as_deref().and_then(|h| h.did_update.as_ref());
            if let (Some(f), Some(handle)) = (did_update, next.handle) {
                f(handle, &prev_component.props, &next_component.props);
            }
        }
        Ok(())
    }

    /// Tears down a component instance and the instances below it.
    pub(crate) fn teardown_instance(&mut self, id: InstanceId) -> Result<(), ReconcileError> {
        let mut instance = self
            .instances
            .free(id)
            .ok_or(ReconcileError::UnknownInstance(id))?;
        let handle = instance.handle();
        match &mut instance.body {
            InstanceBody::Stateful(object) => object.will_unmount(),
            InstanceBody::Stateless => {
                if let (Some(f), Some(handle)) = (
                    instance.hooks.as_deref().and_then(|h| h.will_unmount.as_ref()),
                    handle,
                ) {
                    f(handle);
                }
            }
        }
        if let Some(rendered) = &instance.rendered {
            self.teardown_node(rendered)?;
        }
        Ok(())
    }

    /// Delivers `did_mount` to every instance mounted since the last flush.
    pub(crate) fn flush_mounted(&mut self) {
        let pending = std::mem::take(&mut self.pending_mounts);
        for id in pending {
            let Some(instance) = self.instances.get_mut(id) else {
                continue;
            };
            let Some(handle) = instance.handle() else {
                continue;
            };
            match &mut instance.body {
                InstanceBody::Stateful(object) => object.did_mount(handle),
                InstanceBody::Stateless => {
                    if let Some(f) = instance.hooks.as_deref().and_then(|h| h.did_mount.as_ref()) {
                        f(handle);
                    }
                }
            }
        }
    }
}
