#![no_main]

use libfuzzer_sys::fuzz_target;
use surface::SurfaceStore;
use vdom::{Context, Reconciler, VChild, VNode};

/// Decodes one child per byte; nested lists consume the following bytes.
fn decode(bytes: &mut std::slice::Iter<'_, u8>, depth: usize, out: &mut Vec<VChild>) {
    while let Some(&byte) = bytes.next() {
        let label = (byte >> 3) % 8;
        let child = match byte % 8 {
            0 => VChild::empty(),
            1 | 2 => VChild::text(format!("t{label}")),
            3 if depth < 3 => {
                let mut items = Vec::new();
                decode(bytes, depth + 1, &mut items);
                VChild::list(items)
            }
            4 if depth > 0 => return,
            5 => VNode::element("i").keyed(i64::from(label)).child(format!("k{label}")).into(),
            6 => VNode::element("b").child(format!("p{label}")).into(),
            _ => VNode::text(format!("n{label}")).into(),
        };
        out.push(child);
    }
}

fn children(data: &[u8]) -> Vec<VChild> {
    let mut out = Vec::new();
    decode(&mut data.iter(), 0, &mut out);
    out
}

fn expected_text(children: &[VChild]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            VChild::Empty { .. } => {}
            VChild::Text { text, .. } => out.push_str(text),
            VChild::List { items, .. } => out.push_str(&expected_text(items)),
            VChild::Node(node) => match node.children() {
                Some(items) => out.push_str(&expected_text(items)),
                None => {
                    if let vdom::VNodeKind::Text(text) = &node.kind {
                        out.push_str(text);
                    }
                }
            },
        }
    }
    out
}

/// Duplicate keys are tolerated but leave the order of a sequence unspecified.
fn keys_unique(children: &[VChild]) -> bool {
    let mut keys: Vec<_> = children.iter().filter_map(VChild::key).collect();
    keys.sort();
    keys.windows(2).all(|pair| pair[0] != pair[1])
        && children.iter().all(|child| match child {
            VChild::List { items, .. } => keys_unique(items),
            VChild::Node(node) => node.children().is_none_or(keys_unique),
            _ => true,
        })
}

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|b| *b == 0xFF).unwrap_or(data.len() / 2);
    let (left, right) = data.split_at(split);

    let mut store = SurfaceStore::new();
    let root = store.create_root("div");
    let mut reconciler = Reconciler::new(store);
    let cx = Context::new();

    let mut prev = children(left);
    let mut next = children(right);
    let expected = expected_text(&next);
    let unique = keys_unique(&prev) && keys_unique(&next);

    reconciler
        .reconcile_children(Vec::new(), &mut prev, root, &cx)
        .expect("mount failed");
    reconciler
        .reconcile_children(prev, &mut next, root, &cx)
        .expect("reconcile failed");

    let store = reconciler.surface();
    store.check_invariants().expect("surface invariants violated");
    assert_eq!(store.children(root).len(), next.len());
    if unique {
        assert_eq!(store.text_content(root), expected);
    }
});
