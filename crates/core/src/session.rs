use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use analyse_search::{SearchEngine, SearchError};

use crate::pattern::Pattern;
use crate::pattern_list::{PatternId, PatternList, SortKey, SortOrder};
use crate::result::{PatternResult, ResultList};

/// Runs one pattern against the current buffer.
pub trait PatternSearcher {
    /// Returns hit positions as described on [`PatternResult`].
    fn search(&mut self, pattern: &Pattern) -> Result<Vec<usize>, SearchError>;
}

/// [`PatternSearcher`] over an in-memory buffer.
pub struct BufferSearcher<'a> {
    engine: SearchEngine<'a>,
}

impl<'a> BufferSearcher<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            engine: SearchEngine::new(text),
        }
    }
}

impl PatternSearcher for BufferSearcher<'_> {
    fn search(&mut self, pattern: &Pattern) -> Result<Vec<usize>, SearchError> {
        let ranges = self.engine.find_ranges(&pattern.search_options())?;
        Ok(ranges.into_iter().map(|range| range.start).collect())
    }
}

/// Where a new pattern goes relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// Outcome of [`AnalyseSession::set_pattern`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternChange {
    Unchanged,
    /// Only display attributes changed; the stored hits remain valid.
    StyleOnly,
    /// The pattern now finds different hits; its result was marked dirty.
    Search,
    Missing,
}

/// Statistics of one [`AnalyseSession::research`] pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub searched: usize,
    pub reused: usize,
    pub total_hits: usize,
    pub failures: Vec<(PatternId, SearchError)>,
}

/// One line of the analysed view of a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultLine {
    /// 1-based line number in the buffer.
    pub line: usize,
    /// First pattern, in display order, that hit the line.
    pub pattern: PatternId,
    pub text: String,
}

/// Pattern list and result list of one analysis, kept in step.
#[derive(Clone, Debug, Default)]
pub struct AnalyseSession {
    patterns: PatternList,
    results: ResultList,
    dirty: bool,
}

impl AnalyseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &PatternList {
        &self.patterns
    }

    pub fn results(&self) -> &ResultList {
        &self.results
    }

    pub fn result(&self, id: PatternId) -> Option<&PatternResult> {
        self.results.get(id)
    }

    pub fn hit_count(&self, id: PatternId) -> Option<usize> {
        self.results.get(id).map(PatternResult::hit_count)
    }

    /// True when a search-relevant change happened since the last search.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn push_pattern(&mut self, pattern: Pattern) -> PatternId {
        self.dirty = true;
        self.patterns.push(pattern)
    }

    /// Inserts next to `anchor` (`None` appends). Unknown anchors are ignored.
    pub fn add_pattern(
        &mut self,
        anchor: Option<PatternId>,
        pattern: Pattern,
        placement: Placement,
    ) -> Option<PatternId> {
        let id = match placement {
            Placement::Before => self.patterns.insert_before(anchor, pattern),
            Placement::After => self.patterns.insert_after(anchor, pattern),
        }?;
        self.dirty = true;
        Some(id)
    }

    /// Stores an edited pattern. Cosmetic edits keep the current hits.
    pub fn set_pattern(&mut self, id: PatternId, pattern: Pattern) -> PatternChange {
        let Some(current) = self.patterns.get(id) else {
            return PatternChange::Missing;
        };
        let change = if *current == pattern {
            PatternChange::Unchanged
        } else if current.is_search_equal(&pattern) {
            PatternChange::StyleOnly
        } else {
            PatternChange::Search
        };
        if change == PatternChange::Search {
            self.invalidate(id);
        }
        self.patterns.set(id, pattern);
        change
    }

    pub fn remove_pattern(&mut self, id: PatternId) -> Option<Pattern> {
        let removed = self.patterns.remove(id)?;
        self.results.remove(id);
        if self.patterns.is_empty() {
            self.results.clear();
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.results.clear();
        self.dirty = false;
    }

    /// Replaces the whole list, as loading a configuration does.
    pub fn replace_patterns(&mut self, patterns: impl IntoIterator<Item = Pattern>) {
        self.clear();
        self.append_patterns(patterns);
    }

    pub fn append_patterns(&mut self, patterns: impl IntoIterator<Item = Pattern>) {
        for pattern in patterns {
            self.patterns.push(pattern);
            self.dirty = true;
        }
    }

    /// Moves the pattern at `position` one row up. Returns its new identifier.
    pub fn move_up(&mut self, position: usize) -> Option<PatternId> {
        if position == 0 || position >= self.patterns.len() {
            return None;
        }
        let old_id = self.patterns.id_at(position)?;
        let neighbour = self.patterns.id_at(position - 1)?;
        self.relocate(old_id, neighbour, Placement::Before)
    }

    /// Moves the pattern at `position` one row down. Returns its new identifier.
    pub fn move_down(&mut self, position: usize) -> Option<PatternId> {
        if position + 1 >= self.patterns.len() {
            return None;
        }
        let old_id = self.patterns.id_at(position)?;
        let neighbour = self.patterns.id_at(position + 1)?;
        self.relocate(old_id, neighbour, Placement::After)
    }

    pub fn sort(&mut self, key: SortKey, order: SortOrder) {
        self.patterns.sort(key, order);
    }

    pub fn has_order_labels(&self) -> bool {
        self.patterns
            .patterns()
            .any(|pattern| !pattern.order_label().is_empty())
    }

    /// Overwrites every order label with its 1-based row number, zero padded
    /// to the digit count of the list size.
    pub fn apply_order_labels(&mut self) {
        let width = label_width(self.patterns.len());
        let mut changed = Vec::new();
        for (row, (id, pattern)) in self.patterns.iter_mut().enumerate() {
            let label = format!("{:0width$}", row + 1);
            if pattern.order_label() != label {
                pattern.set_order_label(label);
                changed.push(id);
            }
        }
        for id in changed {
            self.invalidate(id);
        }
    }

    /// Enables or disables every pattern. Returns how many changed.
    pub fn set_all_enabled(&mut self, enabled: bool) -> usize {
        self.set_enabled_where(enabled, |_| true)
    }

    /// Enables or disables the patterns of one group. Returns how many changed.
    pub fn set_group_enabled(&mut self, group: &str, enabled: bool) -> usize {
        self.set_enabled_where(enabled, |pattern| pattern.group() == group)
    }

    /// Distinct non-empty groups in display order.
    pub fn groups(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.patterns
            .patterns()
            .map(Pattern::group)
            .filter(|group| !group.is_empty() && seen.insert(*group))
            .map(str::to_string)
            .collect()
    }

    /// The buffer changed underneath every stored result.
    pub fn buffer_modified(&mut self) {
        self.results.mark_all_dirty();
        self.dirty = true;
    }

    /// Searches every enabled pattern whose result is missing or dirty.
    /// Disabled patterns get an empty result. A pattern that fails to compile
    /// is reported in the summary and left without result.
    pub fn research(&mut self, searcher: &mut impl PatternSearcher) -> SearchSummary {
        let mut summary = SearchSummary::default();
        let live: HashSet<PatternId> = self.patterns.ids().into_iter().collect();
        self.results.retain(|id, _| live.contains(&id));
        let stale: HashSet<PatternId> = live
            .iter()
            .copied()
            .filter(|id| self.results.get(*id).map_or(true, PatternResult::is_dirty))
            .collect();

        for (id, pattern) in self.patterns.iter() {
            if !stale.contains(&id) {
                summary.reused += 1;
                continue;
            }
            if !pattern.is_enabled() || pattern.search_text().is_empty() {
                self.results.insert(id, PatternResult::fresh(Vec::new()));
                continue;
            }
            match searcher.search(pattern) {
                Ok(positions) => {
                    summary.searched += 1;
                    self.results.insert(id, PatternResult::fresh(positions));
                }
                Err(err) => {
                    log::warn!("pattern {id} ({:?}) failed: {err}", pattern.search_text());
                    self.results.remove(id);
                    summary.failures.push((id, err));
                }
            }
        }

        summary.total_hits = self.results.total_hits();
        self.dirty = false;
        log::debug!(
            "research: {} searched, {} reused, {} hits",
            summary.searched,
            summary.reused,
            summary.total_hits
        );
        summary
    }

    /// Lines of `text` hit by enabled patterns with fresh results, in buffer
    /// order. Lines owned by a hide-text pattern are left out and lines owned
    /// by a replace-enabled pattern show the replacement applied.
    pub fn result_lines(&self, text: &str) -> Vec<ResultLine> {
        let engine = SearchEngine::new(text);
        let mut owners: BTreeMap<usize, PatternId> = BTreeMap::new();
        for (id, pattern) in self.patterns.iter() {
            if !pattern.is_enabled() {
                continue;
            }
            let Some(result) = self.results.get(id).filter(|result| !result.is_dirty()) else {
                log::debug!("skipping pattern {id} without fresh result");
                continue;
            };
            for &position in result.positions() {
                if let Entry::Vacant(slot) = owners.entry(engine.line_of(position)) {
                    slot.insert(id);
                }
            }
        }

        owners
            .into_iter()
            .filter_map(|(line, id)| {
                let pattern = self.patterns.get(id)?;
                if pattern.is_hide_text() {
                    return None;
                }
                let raw = engine.line_text(line);
                let text = if pattern.is_replace_enabled() {
                    replace_in_line(raw, pattern)
                } else {
                    raw.to_string()
                };
                Some(ResultLine {
                    line,
                    pattern: id,
                    text,
                })
            })
            .collect()
    }

    fn relocate(
        &mut self,
        old_id: PatternId,
        neighbour: PatternId,
        placement: Placement,
    ) -> Option<PatternId> {
        let pattern = self.patterns.get(old_id)?.clone();
        let new_id = match placement {
            Placement::Before => self.patterns.insert_before(Some(neighbour), pattern),
            Placement::After => self.patterns.insert_after(Some(neighbour), pattern),
        }?;

        match self.results.get(old_id).map(PatternResult::is_dirty) {
            Some(false) => {
                self.results.move_result(old_id, new_id);
            }
            Some(true) => {
                self.results.remove(old_id);
                self.dirty = true;
            }
            None => {}
        }
        self.patterns.remove(old_id);
        log::debug!("moved pattern {old_id} -> {new_id} ({placement:?} {neighbour})");
        Some(new_id)
    }

    fn set_enabled_where<F>(&mut self, enabled: bool, mut predicate: F) -> usize
    where
        F: FnMut(&Pattern) -> bool,
    {
        let mut changed = Vec::new();
        for (id, pattern) in self.patterns.iter_mut() {
            if predicate(&*pattern) && pattern.is_enabled() != enabled {
                pattern.set_enabled(enabled);
                changed.push(id);
            }
        }
        let count = changed.len();
        for id in changed {
            self.invalidate(id);
        }
        count
    }

    fn invalidate(&mut self, id: PatternId) {
        if let Some(result) = self.results.get_mut(id) {
            result.mark_dirty();
        }
        self.dirty = true;
    }
}

fn replace_in_line(line: &str, pattern: &Pattern) -> String {
    match SearchEngine::new(line).replace_all(pattern.replace_text(), &pattern.search_options()) {
        Ok(outcome) => outcome.replaced_text,
        Err(err) => {
            log::debug!("replacement skipped: {err}");
            line.to_string()
        }
    }
}

fn label_width(count: usize) -> usize {
    match count {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
