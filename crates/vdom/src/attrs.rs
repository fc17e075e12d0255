//! Attribute and style patching for a single live element.
//!
//! Rules:
//! - `value`, `checked`, `disabled` and `selected` are live properties, not
//!   attributes. Removing one resets it to its default.
//! - `Bool(false)` removes an attribute, `Bool(true)` sets it to its own name.
//! - `on*` listener names are not attributes and are ignored.
//! - `xlink:` attributes are set in the XLink namespace.
//! - Numeric style values get a `px` suffix unless the property is unitless.
//! - A style property missing from the next map is reset, not left stale.

use crate::props::{PropValue, Props, Style};
use crate::surface::{SurfaceError, TargetSurface};
use core_types::Handle;
use std::collections::BTreeMap;
use std::sync::Arc;

const UNITLESS_STYLES: &[&str] = &[
    "animationIterationCount",
    "boxFlex",
    "boxFlexGroup",
    "columnCount",
    "counterIncrement",
    "fillOpacity",
    "flex",
    "flexGrow",
    "flexOrder",
    "flexPositive",
    "flexShrink",
    "float",
    "fontWeight",
    "gridColumn",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "stopOpacity",
    "strokeDashoffset",
    "strokeOpacity",
    "strokeWidth",
    "tabSize",
    "transform",
    "transformOrigin",
    "widows",
    "zIndex",
    "zoom",
];

pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

fn namespace_of(name: &str) -> Option<&'static str> {
    name.starts_with("xlink:").then_some(XLINK_NAMESPACE)
}

fn is_live_property(name: &str) -> bool {
    matches!(name, "value" | "checked" | "disabled" | "selected")
}

fn is_listener(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 2 && bytes.starts_with(b"on") && bytes[2].is_ascii_uppercase()
}

fn default_property(name: &str) -> PropValue {
    match name {
        "value" => PropValue::Str(Arc::from("")),
        _ => PropValue::Bool(false),
    }
}

pub fn style_value(name: &str, value: &PropValue) -> String {
    if value.is_number() && UNITLESS_STYLES.binary_search(&name).is_err() {
        format!("{value}px")
    } else {
        value.to_string()
    }
}

/// Applies the delta between two prop snapshots to `handle`.
///
/// Returns the number of surface operations issued.
pub fn patch_props<S: TargetSurface + ?Sized>(
    surface: &mut S,
    handle: Handle,
    prev: &Props,
    next: &Props,
) -> Result<u64, SurfaceError> {
    let mut ops = 0;
    for (name, value) in next.attrs() {
        if is_listener(name) || prev.get(name) == Some(value) {
            continue;
        }
        patch_attribute(surface, handle, name, value)?;
        ops += 1;
    }
    for (name, _) in prev.attrs() {
        if is_listener(name) || next.get(name).is_some() {
            continue;
        }
        if is_live_property(name) {
            surface.set_property(handle, name, &default_property(name))?;
        } else {
            surface.remove_attribute(handle, name)?;
        }
        ops += 1;
    }
    ops += patch_style(surface, handle, prev.style(), next.style())?;
    Ok(ops)
}

fn patch_attribute<S: TargetSurface + ?Sized>(
    surface: &mut S,
    handle: Handle,
    name: &str,
    value: &PropValue,
) -> Result<(), SurfaceError> {
    if is_live_property(name) {
        return surface.set_property(handle, name, value);
    }
    let value = match value {
        PropValue::Bool(false) => return surface.remove_attribute(handle, name),
        PropValue::Bool(true) => name.to_string(),
        other => other.to_string(),
    };
    match namespace_of(name) {
        Some(namespace) => surface.set_attribute_ns(handle, namespace, name, &value),
        None => surface.set_attribute(handle, name, &value),
    }
}

fn patch_style<S: TargetSurface + ?Sized>(
    surface: &mut S,
    handle: Handle,
    prev: Option<&Style>,
    next: Option<&Style>,
) -> Result<u64, SurfaceError> {
    match (prev, next) {
        (None, None) => Ok(0),
        (Some(_), None) => {
            surface.remove_style(handle)?;
            Ok(1)
        }
        (prev, Some(Style::Text(text))) => {
            if prev == next {
                return Ok(0);
            }
            surface.set_style_text(handle, text)?;
            Ok(1)
        }
        (None, Some(Style::Map(next))) => set_styles(surface, handle, None, next),
        (Some(Style::Text(_)), Some(Style::Map(next))) => {
            surface.remove_style(handle)?;
            Ok(1 + set_styles(surface, handle, None, next)?)
        }
        (Some(Style::Map(prev)), Some(Style::Map(next))) => {
            let mut ops = set_styles(surface, handle, Some(prev), next)?;
            for name in prev.keys() {
                if !next.contains_key(name) {
                    surface.set_style(handle, name, "")?;
                    ops += 1;
                }
            }
            Ok(ops)
        }
    }
}

fn set_styles<S: TargetSurface + ?Sized>(
    surface: &mut S,
    handle: Handle,
    prev: Option<&BTreeMap<Arc<str>, PropValue>>,
    next: &BTreeMap<Arc<str>, PropValue>,
) -> Result<u64, SurfaceError> {
    let mut ops = 0;
    for (name, value) in next {
        if prev.and_then(|prev| prev.get(name)) == Some(value) {
            continue;
        }
        surface.set_style(handle, name, &style_value(name, value))?;
        ops += 1;
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Mutation;
    use crate::test_surface::TestSurface;

    fn patched(prev: &Props, next: &Props) -> Vec<Mutation> {
        let mut surface = TestSurface::new();
        let handle = surface.create_element("input");
        surface.journal.clear();
        patch_props(&mut surface, handle, prev, next).expect("patch failed");
        surface.journal
    }

    #[test]
    fn unitless_table_is_sorted() {
        let mut sorted = UNITLESS_STYLES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, UNITLESS_STYLES);
    }

    #[test]
    fn unchanged_props_issue_nothing() {
        let props = Props::new().with("class", "a").with_style("width", 3i64);
        assert!(patched(&props, &props.clone()).is_empty());
    }

    #[test]
    fn boolean_attributes_follow_presence_rules() {
        let prev = Props::new().with("hidden", true);
        let next = Props::new().with("hidden", false).with("required", true);
        let journal = patched(&prev, &next);
        assert!(journal.contains(&Mutation::RemoveAttribute {
            handle: Handle(2),
            name: Arc::from("hidden"),
        }));
        assert!(journal.contains(&Mutation::SetAttribute {
            handle: Handle(2),
            name: Arc::from("required"),
            value: "required".to_string(),
        }));
    }

    #[test]
    fn removed_live_property_resets_to_default() {
        let prev = Props::new().with("checked", true).with("value", "x");
        let journal = patched(&prev, &Props::new());
        assert_eq!(
            journal,
            vec![
                Mutation::SetProperty {
                    handle: Handle(2),
                    name: Arc::from("checked"),
                    value: PropValue::Bool(false),
                },
                Mutation::SetProperty {
                    handle: Handle(2),
                    name: Arc::from("value"),
                    value: PropValue::from(""),
                },
            ]
        );
    }

    #[test]
    fn xlink_attributes_carry_their_namespace() {
        let prev = Props::new().with("xlink:href", "#a");
        let next = Props::new().with("xlink:href", "#b").with("href", "#c");
        assert_eq!(
            patched(&prev, &next),
            vec![
                Mutation::SetAttribute {
                    handle: Handle(2),
                    name: Arc::from("href"),
                    value: "#c".to_string(),
                },
                Mutation::SetAttributeNs {
                    handle: Handle(2),
                    namespace: Arc::from(XLINK_NAMESPACE),
                    name: Arc::from("xlink:href"),
                    value: "#b".to_string(),
                },
            ]
        );
        let journal = patched(&next, &Props::new().with("href", "#c"));
        assert_eq!(
            journal,
            vec![Mutation::RemoveAttribute {
                handle: Handle(2),
                name: Arc::from("xlink:href"),
            }]
        );
    }

    #[test]
    fn listeners_are_not_attributes() {
        let next = Props::new().with("onClick", "handler").with("one", 1i64);
        let journal = patched(&Props::new(), &next);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn style_map_delta_sets_changes_and_resets_missing() {
        let prev = Props::new().with_style("width", 10i64).with_style("color", "red");
        let next = Props::new().with_style("width", 12i64).with_style("opacity", 0.5);
        let journal = patched(&prev, &next);
        assert_eq!(
            journal,
            vec![
                Mutation::SetStyle {
                    handle: Handle(2),
                    name: Arc::from("opacity"),
                    value: "0.5".to_string(),
                },
                Mutation::SetStyle {
                    handle: Handle(2),
                    name: Arc::from("width"),
                    value: "12px".to_string(),
                },
                Mutation::SetStyle {
                    handle: Handle(2),
                    name: Arc::from("color"),
                    value: String::new(),
                },
            ]
        );
    }

    #[test]
    fn style_text_and_removal() {
        let text = Props::new().with_style_text("color: red");
        assert_eq!(
            patched(&Props::new(), &text),
            vec![Mutation::SetStyleText {
                handle: Handle(2),
                text: "color: red".to_string(),
            }]
        );
        assert_eq!(
            patched(&text, &Props::new()),
            vec![Mutation::RemoveStyle { handle: Handle(2) }]
        );
    }
}
