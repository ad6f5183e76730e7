//! Ordered collection of patterns addressed by stable identifiers.
//!
//! Identifiers survive every reordering: results computed for a pattern are
//! keyed on its identifier, so moving or sorting rows never invalidates them.

use std::cmp::Ordering;
use std::fmt;

use crate::pattern::Pattern;

/// Stable handle of a pattern inside one [`PatternList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u32);

impl PatternId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PatternId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pattern attribute used as sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Comment,
    Group,
    OrderLabel,
    SearchText,
}

impl SortKey {
    fn select(self, pattern: &Pattern) -> &str {
        match self {
            SortKey::Comment => pattern.comment(),
            SortKey::Group => pattern.group(),
            SortKey::OrderLabel => pattern.order_label(),
            SortKey::SearchText => pattern.search_text(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Debug)]
struct Entry {
    id: PatternId,
    pattern: Pattern,
}

/// Patterns in display (and search) order.
#[derive(Clone, Debug)]
pub struct PatternList {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Default for PatternList {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl PatternList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every pattern. Identifiers handed out earlier are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Appends a pattern and returns its identifier.
    pub fn push(&mut self, pattern: Pattern) -> PatternId {
        let id = self.allocate_id();
        self.entries.push(Entry { id, pattern });
        id
    }

    /// Inserts in front of `anchor`; `None` appends. Returns `None` when the
    /// anchor is unknown, leaving the list untouched.
    pub fn insert_before(
        &mut self,
        anchor: Option<PatternId>,
        pattern: Pattern,
    ) -> Option<PatternId> {
        match anchor {
            None => Some(self.push(pattern)),
            Some(anchor) => {
                let index = self.position_of(anchor)?;
                Some(self.insert_at(index, pattern))
            }
        }
    }

    /// Inserts behind `anchor`; `None` appends. Returns `None` when the
    /// anchor is unknown, leaving the list untouched.
    pub fn insert_after(
        &mut self,
        anchor: Option<PatternId>,
        pattern: Pattern,
    ) -> Option<PatternId> {
        match anchor {
            None => Some(self.push(pattern)),
            Some(anchor) => {
                let index = self.position_of(anchor)?;
                Some(self.insert_at(index + 1, pattern))
            }
        }
    }

    pub fn remove(&mut self, id: PatternId) -> Option<Pattern> {
        let index = self.position_of(id)?;
        Some(self.entries.remove(index).pattern)
    }

    pub fn contains(&self, id: PatternId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.pattern)
    }

    pub fn get_mut(&mut self, id: PatternId) -> Option<&mut Pattern> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.pattern)
    }

    /// Replaces the pattern stored under `id`. Returns false for unknown ids.
    pub fn set(&mut self, id: PatternId, pattern: Pattern) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                *slot = pattern;
                true
            }
            None => false,
        }
    }

    /// Identifier displayed at `position`.
    pub fn id_at(&self, position: usize) -> Option<PatternId> {
        self.entries.get(position).map(|entry| entry.id)
    }

    pub fn position_of(&self, id: PatternId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Stable sort on a text attribute, compared case-insensitively.
    pub fn sort(&mut self, key: SortKey, order: SortOrder) {
        log::debug!("sorting {} patterns by {key:?} ({order:?})", self.len());
        self.entries.sort_by(|left, right| {
            let ordering = compare_caseless(key.select(&left.pattern), key.select(&right.pattern));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (PatternId, &Pattern)> + '_ {
        self.entries.iter().map(|entry| (entry.id, &entry.pattern))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PatternId, &mut Pattern)> + '_ {
        self.entries
            .iter_mut()
            .map(|entry| (entry.id, &mut entry.pattern))
    }

    pub fn ids(&self) -> Vec<PatternId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.entries.iter().map(|entry| &entry.pattern)
    }

    fn insert_at(&mut self, index: usize, pattern: Pattern) -> PatternId {
        let id = self.allocate_id();
        self.entries.insert(index, Entry { id, pattern });
        id
    }

    fn allocate_id(&mut self) -> PatternId {
        let id = PatternId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl FromIterator<Pattern> for PatternList {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        let mut list = PatternList::new();
        for pattern in iter {
            list.push(pattern);
        }
        list
    }
}

fn compare_caseless(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &PatternList) -> Vec<&str> {
        list.patterns().map(Pattern::search_text).collect()
    }

    fn labelled(text: &str, comment: &str) -> Pattern {
        let mut pattern = Pattern::new(text);
        pattern.set_comment(comment);
        pattern
    }

    #[test]
    fn insert_sort_remove_scenario() {
        let mut list = PatternList::new();
        let a = list.push(Pattern::new("foo"));
        let b = list.push(Pattern::new("bar"));
        let c = list.push(Pattern::new("baz"));
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));

        let d = list.insert_after(Some(b), Pattern::new("qux")).unwrap();
        assert_eq!(d.get(), 4);
        assert_eq!(texts(&list), ["foo", "bar", "qux", "baz"]);

        list.sort(SortKey::Comment, SortOrder::Ascending);
        assert_eq!(texts(&list), ["foo", "bar", "qux", "baz"]);

        assert!(list.remove(b).is_some());
        assert_eq!(texts(&list), ["foo", "qux", "baz"]);
        assert_eq!(list.id_at(1), Some(d));
        assert!(list.get(b).is_none());
        assert_eq!(list.position_of(b), None);
    }

    #[test]
    fn insert_before_places_entry_in_front() {
        let mut list = PatternList::new();
        let a = list.push(Pattern::new("a"));
        list.push(Pattern::new("c"));
        let b = list.insert_before(Some(a), Pattern::new("b")).unwrap();
        assert_eq!(texts(&list), ["b", "a", "c"]);
        assert_eq!(list.position_of(b), Some(0));
    }

    #[test]
    fn unknown_anchor_is_a_noop() {
        let mut list = PatternList::new();
        let a = list.push(Pattern::new("a"));
        list.remove(a);
        assert_eq!(list.insert_after(Some(a), Pattern::new("x")), None);
        assert_eq!(list.insert_before(Some(a), Pattern::new("x")), None);
        assert!(list.is_empty());
        assert!(!list.set(a, Pattern::new("y")));
    }

    #[test]
    fn none_anchor_appends() {
        let mut list = PatternList::new();
        list.push(Pattern::new("a"));
        list.insert_before(None, Pattern::new("b"));
        list.insert_after(None, Pattern::new("c"));
        assert_eq!(texts(&list), ["a", "b", "c"]);
    }

    #[test]
    fn ids_are_not_reused_after_removal_or_clear() {
        let mut list = PatternList::new();
        let a = list.push(Pattern::new("a"));
        list.remove(a);
        let b = list.push(Pattern::new("b"));
        assert_ne!(a, b);
        list.clear();
        let c = list.push(Pattern::new("c"));
        assert!(c > b);
    }

    #[test]
    fn identifiers_survive_unrelated_edits() {
        let mut list = PatternList::new();
        let first = list.push(Pattern::new("first"));
        let tracked = list.push(Pattern::new("tracked"));
        let last = list.push(Pattern::new("last"));

        list.insert_before(Some(first), Pattern::new("new head"));
        list.insert_after(Some(last), Pattern::new("new tail"));
        assert_eq!(list.position_of(tracked), Some(2));
        list.remove(first);
        assert_eq!(list.position_of(tracked), Some(1));
        assert_eq!(list.get(tracked).unwrap().search_text(), "tracked");
    }

    #[test]
    fn sort_is_case_insensitive() {
        let mut list: PatternList = ["beta", "Alpha", "gamma", "ALPHA2"]
            .into_iter()
            .map(Pattern::new)
            .collect();
        list.sort(SortKey::SearchText, SortOrder::Ascending);
        assert_eq!(texts(&list), ["Alpha", "ALPHA2", "beta", "gamma"]);
        list.sort(SortKey::SearchText, SortOrder::Descending);
        assert_eq!(texts(&list), ["gamma", "beta", "ALPHA2", "Alpha"]);
    }

    #[test]
    fn sort_keeps_ties_in_relative_order_both_directions() {
        let mut list = PatternList::new();
        list.push(labelled("1", "b"));
        list.push(labelled("2", "a"));
        list.push(labelled("3", "B"));
        list.push(labelled("4", "a"));

        list.sort(SortKey::Comment, SortOrder::Ascending);
        assert_eq!(texts(&list), ["2", "4", "1", "3"]);
        list.sort(SortKey::Comment, SortOrder::Descending);
        assert_eq!(texts(&list), ["1", "3", "2", "4"]);
        list.sort(SortKey::Comment, SortOrder::Ascending);
        assert_eq!(texts(&list), ["2", "4", "1", "3"]);
    }

    #[test]
    fn sort_by_group_and_order_label() {
        let mut list = PatternList::new();
        for (text, group, label) in [("x", "net", "03"), ("y", "disk", "01"), ("z", "cpu", "02")] {
            let mut pattern = Pattern::new(text);
            pattern.set_group(group);
            pattern.set_order_label(label);
            list.push(pattern);
        }
        list.sort(SortKey::Group, SortOrder::Ascending);
        assert_eq!(texts(&list), ["z", "y", "x"]);
        list.sort(SortKey::OrderLabel, SortOrder::Ascending);
        assert_eq!(texts(&list), ["y", "z", "x"]);
    }
}
