//! Descriptor builders for list-shaped test cases.

use vdom::{Key, Props, TemplateId, VChild, VNode};

/// Numeric labels become integer keys, anything else a string key.
pub fn key_for(label: &str) -> Key {
    label
        .parse::<i64>()
        .map(Key::Int)
        .unwrap_or_else(|_| Key::from(label))
}

/// `<li>` item keyed and labelled by `label`.
pub fn keyed_row(label: &str) -> VChild {
    VNode::element("li")
        .keyed(key_for(label))
        .with_props(Props::new().with("data-label", label))
        .child(label)
        .into()
}

pub fn keyed_rows(labels: &[&str]) -> Vec<VChild> {
    labels.iter().map(|label| keyed_row(label)).collect()
}

/// Same as [`keyed_row`] without a key.
pub fn plain_row(label: &str) -> VChild {
    VNode::element("li")
        .with_props(Props::new().with("data-label", label))
        .child(label)
        .into()
}

pub fn plain_rows(labels: &[&str]) -> Vec<VChild> {
    labels.iter().map(|label| plain_row(label)).collect()
}

/// Keyed row built from a shared template, eligible for recycling.
pub fn template_row(label: &str, template: TemplateId) -> VChild {
    match keyed_row(label) {
        VChild::Node(node) => VChild::Node(node.with_template(template)),
        other => other,
    }
}

/// Reads the label of a row built by this module.
pub fn label_of(child: &VChild) -> Option<String> {
    let node = child.as_node()?;
    match &node.kind {
        vdom::VNodeKind::Element(element) => {
            element.props.get("data-label").map(ToString::to_string)
        }
        _ => None,
    }
}
