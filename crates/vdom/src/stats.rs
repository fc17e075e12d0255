use std::ops::AddAssign;

/// Counters describing the work done by the reconciler since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Subtrees mounted from scratch or reissued from the recycler.
    pub mounts: u64,
    /// Subtrees unlinked and detached one by one.
    pub removals: u64,
    /// Live subtrees relocated among their siblings.
    pub moves: u64,
    /// Matched node pairs patched in place. The root of a subtree reissued
    /// from the recycler counts as a mount instead; its descendants count here.
    pub patches: u64,
    pub text_updates: u64,
    pub attribute_ops: u64,
    pub bulk_clears: u64,
    /// Keyed passes that fell back to the key map.
    pub keyed_map_passes: u64,
    pub component_updates: u64,
    pub component_skips: u64,
    /// Mounts served from the recycler.
    pub recycled: u64,
}

impl AddAssign for ReconcileStats {
    fn add_assign(&mut self, rhs: Self) {
        self.mounts += rhs.mounts;
        self.removals += rhs.removals;
        self.moves += rhs.moves;
        self.patches += rhs.patches;
        self.text_updates += rhs.text_updates;
        self.attribute_ops += rhs.attribute_ops;
        self.bulk_clears += rhs.bulk_clears;
        self.keyed_map_passes += rhs.keyed_map_passes;
        self.component_updates += rhs.component_updates;
        self.component_skips += rhs.component_skips;
        self.recycled += rhs.recycled;
    }
}
