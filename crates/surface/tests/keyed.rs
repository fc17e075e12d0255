use surface::{SurfaceStore, assert_snapshot};
use vdom::{
    Context, Handle, Mutation, ReconcileConfig, Reconciler, Recycler, TemplatePool, VChild, VNode,
};
use vdom_test_support::builders::{keyed_rows, label_of};

fn mounted(labels: &[&str]) -> (Reconciler<SurfaceStore>, Handle, Vec<VChild>) {
    let mut store = SurfaceStore::new();
    let root = store.create_root("ul");
    let mut reconciler = Reconciler::new(store);
    let mut items = keyed_rows(labels);
    reconciler
        .reconcile_children(Vec::new(), &mut items, root, &Context::new())
        .expect("initial mount failed");
    reconciler.surface_mut().take_journal();
    reconciler.take_stats();
    (reconciler, root, items)
}

fn handles_by_label(items: &[VChild]) -> Vec<(String, Option<Handle>)> {
    items
        .iter()
        .map(|item| (label_of(item).unwrap_or_default(), item.handle()))
        .collect()
}

fn handle_of(items: &[(String, Option<Handle>)], label: &str) -> Option<Handle> {
    items
        .iter()
        .find(|(l, _)| l == label)
        .and_then(|(_, handle)| *handle)
}

fn run(
    reconciler: &mut Reconciler<SurfaceStore>,
    root: Handle,
    prev: Vec<VChild>,
    labels: &[&str],
) -> Vec<VChild> {
    let mut next = keyed_rows(labels);
    reconciler
        .reconcile_children(prev, &mut next, root, &Context::new())
        .expect("reconcile failed");
    reconciler
        .surface()
        .check_invariants()
        .expect("surface invariants violated");
    next
}

fn order(reconciler: &Reconciler<SurfaceStore>, root: Handle) -> String {
    reconciler.surface().text_content(root)
}

#[test]
fn matched_items_keep_their_handles() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c", "d", "e"]);
    let before = handles_by_label(&prev);
    let next = run(&mut reconciler, root, prev, &["e", "c", "a", "d", "b"]);
    for (label, handle) in handles_by_label(&next) {
        assert_eq!(handle, handle_of(&before, &label), "item {label} was remounted");
    }
    assert_eq!(order(&reconciler, root), "ecadb");
    assert_eq!(reconciler.stats().mounts, 0);
}

#[test]
fn pure_append_mounts_and_inserts_once() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c"]);
    let next = run(&mut reconciler, root, prev, &["a", "b", "c", "d"]);
    let counts = reconciler.surface().counts();
    assert_eq!(counts.inserts, 2, "the new row and its text child");
    assert_eq!(counts.moves, 0);
    assert_eq!(counts.removes, 0);
    assert!(reconciler.surface().journal().contains(&Mutation::AppendChild {
        parent: root,
        child: next[3].handle().unwrap_or(Handle::INVALID),
    }));
    assert_eq!(reconciler.stats().mounts, 1);
    assert_eq!(order(&reconciler, root), "abcd");
}

#[test]
fn pure_prepend_inserts_at_front_without_moves() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c"]);
    let a = prev[0].handle();
    let next = run(&mut reconciler, root, prev, &["z", "a", "b", "c"]);
    let z = next[0].handle().unwrap_or(Handle::INVALID);
    assert!(reconciler.surface().journal().contains(&Mutation::InsertBefore {
        parent: root,
        child: z,
        before: a.unwrap_or(Handle::INVALID),
    }));
    assert_eq!(reconciler.surface().counts().moves, 0);
    assert_eq!(reconciler.stats().mounts, 1);
    assert_eq!(order(&reconciler, root), "zabc");
}

#[test]
fn reversal_uses_crossed_matches_only() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c", "d"]);
    let before = handles_by_label(&prev);
    let next = run(&mut reconciler, root, prev, &["d", "c", "b", "a"]);
    assert_eq!(reconciler.stats().keyed_map_passes, 0);
    assert_eq!(order(&reconciler, root), "dcba");
    for (label, handle) in handles_by_label(&next) {
        assert_eq!(handle, handle_of(&before, &label));
    }
    let counts = reconciler.surface().counts();
    assert_eq!(counts.creates, 0);
    assert_eq!(counts.removes, 0);
}

#[test]
fn permutation_with_insert_and_delete() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c", "d", "e"]);
    let before = handles_by_label(&prev);
    let next = run(&mut reconciler, root, prev, &["c", "f", "a", "e"]);
    assert_eq!(order(&reconciler, root), "cfae");
    for label in ["a", "c", "e"] {
        assert_eq!(
            handle_of(&handles_by_label(&next), label),
            handle_of(&before, label)
        );
    }
    let removed: Vec<Handle> = reconciler
        .surface()
        .journal()
        .iter()
        .filter_map(|m| match m {
            Mutation::RemoveChild { child, .. } => Some(*child),
            _ => None,
        })
        .collect();
    assert_eq!(removed.len(), 2);
    for label in ["b", "d"] {
        let handle = handle_of(&before, label).unwrap_or(Handle::INVALID);
        assert!(removed.contains(&handle));
        assert!(!reconciler.surface().is_live(handle));
    }
    assert_eq!(reconciler.stats().mounts, 1);
    assert_eq!(reconciler.stats().keyed_map_passes, 1);
}

#[test]
fn map_pass_removes_leftovers_after_placing() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c", "d", "e"]);
    let before = handles_by_label(&prev);
    let old = |label: &str| handle_of(&before, label).unwrap_or(Handle::INVALID);
    let next = run(&mut reconciler, root, prev, &["c", "f", "a", "e"]);
    let f = handle_of(&handles_by_label(&next), "f").unwrap_or(Handle::INVALID);

    let structural: Vec<Mutation> = reconciler
        .surface()
        .journal()
        .iter()
        .filter(|m| match m {
            Mutation::Move { parent, .. }
            | Mutation::InsertBefore { parent, .. }
            | Mutation::AppendChild { parent, .. }
            | Mutation::RemoveChild { parent, .. } => *parent == root,
            _ => false,
        })
        .cloned()
        .collect();
    assert_eq!(
        structural,
        vec![
            Mutation::Move {
                parent: root,
                child: old("a"),
                before: Some(old("e")),
            },
            Mutation::InsertBefore {
                parent: root,
                child: f,
                before: old("a"),
            },
            Mutation::Move {
                parent: root,
                child: old("c"),
                before: Some(f),
            },
            Mutation::RemoveChild {
                parent: root,
                child: old("b"),
            },
            Mutation::RemoveChild {
                parent: root,
                child: old("d"),
            },
        ]
    );
    assert_eq!(reconciler.stats().moves, 2);
}

#[test]
fn crossed_matches_relocate_every_item_they_consume() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c", "d"]);
    run(&mut reconciler, root, prev, &["d", "c", "b", "a"]);
    assert_eq!(order(&reconciler, root), "dcba");
    assert_eq!(reconciler.stats().moves, 4);
    assert_eq!(reconciler.surface().counts().moves, 4);
}

#[test]
fn anchors_hold_across_region_boundaries() {
    let (mut reconciler, root, prev) = mounted(&["h", "a", "b", "c", "t"]);
    let next = run(&mut reconciler, root, prev, &["h", "x", "c", "a", "y", "t"]);
    assert_eq!(order(&reconciler, root), "hxcayt");
    let next = run(&mut reconciler, root, next, &["t", "y", "a"]);
    assert_eq!(order(&reconciler, root), "tya");
    let next = run(&mut reconciler, root, next, &[]);
    assert!(next.is_empty());
    assert_eq!(order(&reconciler, root), "");
}

#[test]
fn identical_sequence_is_a_no_op() {
    let (mut reconciler, root, prev) = mounted(&["a", "b", "c"]);
    run(&mut reconciler, root, prev, &["a", "b", "c"]);
    assert!(reconciler.surface().journal().is_empty());
}

/// Wraps a pool and records every offer.
struct CountingPool {
    inner: TemplatePool,
    offers: Vec<Option<Handle>>,
}

impl Recycler for CountingPool {
    fn offer(&mut self, node: VNode) -> Option<VNode> {
        self.offers.push(node.handle);
        self.inner.offer(node)
    }

    fn reissue(&mut self, template: vdom::TemplateId) -> Option<VNode> {
        self.inner.reissue(template)
    }
}

#[test]
fn bulk_clear_offers_every_item_once() {
    let mut store = SurfaceStore::new();
    let root = store.create_root("ul");
    let pool = CountingPool {
        inner: TemplatePool::new(),
        offers: Vec::new(),
    };
    let mut reconciler = Reconciler::with_recycler(store, pool, ReconcileConfig::default());
    let cx = Context::new();
    let mut prev = keyed_rows(&["a", "b", "c", "d", "e", "f"]);
    reconciler
        .reconcile_children(Vec::new(), &mut prev, root, &cx)
        .expect("mount failed");
    let mut handles: Vec<_> = prev.iter().map(VChild::handle).collect();
    reconciler.surface_mut().take_journal();

    reconciler
        .reconcile_children(prev, &mut [], root, &cx)
        .expect("clear failed");
    let counts = reconciler.surface().counts();
    assert_eq!(counts.clears, 1);
    assert_eq!(counts.removes, 0);
    assert_eq!(reconciler.stats().bulk_clears, 1);

    let mut offers = reconciler.recycler().offers.clone();
    offers.sort();
    handles.sort();
    assert_eq!(offers, handles);
    assert_snapshot(reconciler.surface(), root, &[]);
}

#[test]
fn bulk_clear_threshold_is_configurable() {
    let mut store = SurfaceStore::new();
    let root = store.create_root("ul");
    let config = ReconcileConfig::default().with_bulk_clear_threshold(10);
    let mut reconciler = Reconciler::with_recycler(store, vdom::NoRecycling, config);
    let cx = Context::new();
    let mut prev = keyed_rows(&["a", "b", "c", "d", "e", "f"]);
    reconciler
        .reconcile_children(Vec::new(), &mut prev, root, &cx)
        .expect("mount failed");
    reconciler
        .reconcile_children(prev, &mut [], root, &cx)
        .expect("clear failed");
    assert_eq!(reconciler.stats().bulk_clears, 0);
    assert_eq!(reconciler.stats().removals, 6);
    assert_eq!(reconciler.surface().live_count(), 1);
}

#[test]
fn nested_keyed_list_inside_unkeyed_slots() {
    let mut store = SurfaceStore::new();
    let root = store.create_root("div");
    let mut reconciler = Reconciler::new(store);
    let cx = Context::new();
    let mut prev = VNode::element("section").with_children(vec![
        VChild::text("head:"),
        VChild::list(keyed_rows(&["a", "b", "c"])),
        VChild::text(":tail"),
    ]);
    reconciler.mount_root(&mut prev, root, &cx).expect("mount failed");
    let a = match prev.children() {
        Some([_, VChild::List { items, .. }, _]) => items[0].handle(),
        _ => None,
    };

    let mut next = VNode::element("section").with_children(vec![
        VChild::text("head:"),
        VChild::list(keyed_rows(&["c", "a"])),
        VChild::text(":tail"),
    ]);
    reconciler
        .reconcile(Some(prev), Some(&mut next), root, &cx)
        .expect("reconcile failed");
    assert_eq!(order(&reconciler, root), "head:ca:tail");
    let a_after = match next.children() {
        Some([_, VChild::List { items, .. }, _]) => items[1].handle(),
        _ => None,
    };
    assert_eq!(a_after, a);
}
