/// Reconciler tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Minimum number of previous keyed items for which an empty next
    /// sequence clears the parent in one operation instead of removing each
    /// item.
    pub bulk_clear_threshold: usize,
    /// Offer detached subtrees to the recycler before releasing them.
    pub recycling: bool,
    /// Scan keyed sequences for duplicate keys and log them. The result of
    /// reconciling a sequence with duplicate keys is unspecified either way.
    pub check_duplicate_keys: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            bulk_clear_threshold: 5,
            recycling: true,
            check_duplicate_keys: cfg!(debug_assertions),
        }
    }
}

impl ReconcileConfig {
    pub fn with_bulk_clear_threshold(mut self, threshold: usize) -> Self {
        self.bulk_clear_threshold = threshold;
        self
    }

    pub fn with_recycling(mut self, enabled: bool) -> Self {
        self.recycling = enabled;
        self
    }

    pub fn with_duplicate_key_check(mut self, enabled: bool) -> Self {
        self.check_duplicate_keys = enabled;
        self
    }
}
