//! Attribute and style snapshots carried by element descriptors.
//!
//! Props are immutable once a descriptor is built; the patcher only ever
//! reads a previous and a next snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Scalar value of an attribute, live property, style entry or context entry.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl PropValue {
    pub fn is_number(&self) -> bool {
        matches!(self, PropValue::Int(_) | PropValue::Float(_))
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Str(value) => f.write_str(value),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Arc::from(value))
    }
}

/// Inline style of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum Style {
    /// Whole inline style text, applied verbatim.
    Text(Arc<str>),
    /// Individual style properties.
    Map(BTreeMap<Arc<str>, PropValue>),
}

/// Attribute and style snapshot of one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attrs: BTreeMap<Arc<str>, PropValue>,
    style: Option<Style>,
}

impl Props {
    pub const fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
            style: None,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(Arc::from(name), value.into());
        self
    }

    pub fn with_style(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        match &mut self.style {
            Some(Style::Map(map)) => {
                map.insert(Arc::from(name), value.into());
            }
            _ => {
                let mut map = BTreeMap::new();
                map.insert(Arc::from(name), value.into());
                self.style = Some(Style::Map(map));
            }
        }
        self
    }

    pub fn with_style_text(mut self, text: &str) -> Self {
        self.style = Some(Style::Text(Arc::from(text)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&Arc<str>, &PropValue)> {
        self.attrs.iter()
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.style.is_none()
    }
}
