use std::collections::HashMap;

use crate::pattern_list::PatternId;

/// Hits of one pattern against the current buffer.
///
/// Positions are ascending byte offsets of the hit starts. Selection scope
/// only changes how hits are shown, so the same positions serve both scopes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternResult {
    positions: Vec<usize>,
    dirty: bool,
}

impl PatternResult {
    pub fn fresh(positions: Vec<usize>) -> Self {
        Self {
            positions,
            dirty: false,
        }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn hit_count(&self) -> usize {
        self.positions.len()
    }

    /// Stale results must be recomputed before they are trusted again.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Results keyed by the identifiers of the paired pattern list.
#[derive(Clone, Debug, Default)]
pub struct ResultList {
    results: HashMap<PatternId, PatternResult>,
}

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Stores `result` for `id`, returning the result it replaced.
    pub fn insert(&mut self, id: PatternId, result: PatternResult) -> Option<PatternResult> {
        self.results.insert(id, result)
    }

    pub fn get(&self, id: PatternId) -> Option<&PatternResult> {
        self.results.get(&id)
    }

    pub fn get_mut(&mut self, id: PatternId) -> Option<&mut PatternResult> {
        self.results.get_mut(&id)
    }

    pub fn remove(&mut self, id: PatternId) -> Option<PatternResult> {
        self.results.remove(&id)
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Keeps only the results for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(PatternId, &PatternResult) -> bool,
    {
        self.results.retain(|id, result| keep(*id, result));
    }

    /// Relocates the hits stored under `old_id` to `new_id` without searching
    /// again. The caller guarantees that both identifiers describe
    /// search-equal patterns and that the result is not dirty; neither is
    /// verified here. Returns false when `old_id` has no result.
    pub fn move_result(&mut self, old_id: PatternId, new_id: PatternId) -> bool {
        let Some(result) = self.results.remove(&old_id) else {
            return false;
        };
        if result.is_dirty() {
            log::warn!("moving dirty result {old_id} -> {new_id}; hits stay stale until re-search");
        } else {
            log::debug!("moving result {old_id} -> {new_id}");
        }
        self.results.insert(new_id, result);
        true
    }

    pub fn mark_all_dirty(&mut self) {
        for result in self.results.values_mut() {
            result.mark_dirty();
        }
    }

    pub fn is_any_dirty(&self) -> bool {
        self.results.values().any(PatternResult::is_dirty)
    }

    pub fn total_hits(&self) -> usize {
        self.results.values().map(PatternResult::hit_count).sum()
    }
}
