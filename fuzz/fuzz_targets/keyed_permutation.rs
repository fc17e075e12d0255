#![no_main]

use core_types::TemplateId;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use surface::SurfaceStore;
use vdom::{Context, Key, Props, ReconcileConfig, Reconciler, TemplatePool, VChild, VNode};

const ROW: TemplateId = TemplateId(1);

fn keys(bytes: &[u8]) -> Vec<u8> {
    let mut seen = [false; 64];
    let mut out = Vec::new();
    for byte in bytes {
        let key = byte % 64;
        if !seen[key as usize] {
            seen[key as usize] = true;
            out.push(key);
        }
    }
    out
}

fn rows(keys: &[u8]) -> Vec<VChild> {
    keys.iter()
        .map(|key| {
            VNode::element("li")
                .keyed(i64::from(*key))
                .with_template(ROW)
                .with_props(Props::new().with("data-key", i64::from(*key)))
                .child(format!("{key},"))
                .into()
        })
        .collect()
}

fn text_of(keys: &[u8]) -> String {
    keys.iter().map(|key| format!("{key},")).collect()
}

fuzz_target!(|data: &[u8]| {
    let Some((&flags, rest)) = data.split_first() else {
        return;
    };
    let split = rest.iter().position(|b| *b == 0xFF).unwrap_or(rest.len() / 2);
    let (left, right) = rest.split_at(split);
    let prev_keys = keys(left);
    let next_keys = keys(right);

    let config = ReconcileConfig::default()
        .with_bulk_clear_threshold(usize::from(flags % 8))
        .with_recycling(flags & 0x80 != 0);
    let mut store = SurfaceStore::new();
    let root = store.create_root("ul");
    let mut reconciler = Reconciler::with_recycler(store, TemplatePool::with_capacity(8), config);
    let cx = Context::new();

    let mut prev = rows(&prev_keys);
    reconciler
        .reconcile_children(Vec::new(), &mut prev, root, &cx)
        .expect("mount failed");
    let before: HashMap<Key, _> = prev
        .iter()
        .filter_map(|child| Some((child.key()?.clone(), child.handle()?)))
        .collect();

    let mut next = rows(&next_keys);
    reconciler
        .reconcile_children(prev, &mut next, root, &cx)
        .expect("reconcile failed");

    let store = reconciler.surface();
    store.check_invariants().expect("surface invariants violated");
    assert_eq!(store.text_content(root), text_of(&next_keys));
    assert_eq!(store.children(root).len(), next.len());
    for child in &next {
        let handle = child.handle().expect("unmounted item");
        assert!(store.is_live(handle));
        if let Some(previous) = child.key().and_then(|key| before.get(key)) {
            assert_eq!(*previous, handle, "matched item was remounted");
        }
    }

    reconciler.purge_recycler().expect("purge failed");
    assert_eq!(reconciler.surface().live_count(), 1 + 2 * next.len());
});
