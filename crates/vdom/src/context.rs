use crate::props::PropValue;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

/// Ambient values handed down the tree during mount and reconciliation.
///
/// A context is an immutable snapshot; components that contribute values
/// produce a new context with [`Context::merged`] instead of editing the one
/// they received.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entries: Option<Rc<BTreeMap<Arc<str>, PropValue>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: impl Into<PropValue>) -> Self {
        let mut entries = self.entries.as_deref().cloned().unwrap_or_default();
        entries.insert(Arc::from(name), value.into());
        Self {
            entries: Some(Rc::new(entries)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.as_deref().and_then(|entries| entries.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.as_deref().is_none_or(BTreeMap::is_empty)
    }

    /// Returns a context holding both entry sets; entries of `child` win.
    pub fn merged(&self, child: &Context) -> Context {
        match (&self.entries, &child.entries) {
            (_, None) => self.clone(),
            (None, Some(_)) => child.clone(),
            (Some(parent), Some(child)) => {
                let mut entries = (**parent).clone();
                entries.extend(child.iter().map(|(k, v)| (Arc::clone(k), v.clone())));
                Context {
                    entries: Some(Rc::new(entries)),
                }
            }
        }
    }
}
