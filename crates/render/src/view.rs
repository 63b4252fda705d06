use std::cmp::Ordering;
use std::collections::HashSet;

use crate::card::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Score, highest first.
    #[default]
    Relevance,
    /// Title, case-insensitive A-Z.
    Name,
}

/// `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub kind: Option<String>,
    pub priority: Option<String>,
}

impl Filter {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            priority: None,
        }
    }

    fn accepts<T: Card>(&self, item: &T) -> bool {
        let kind_ok = match &self.kind {
            Some(wanted) => item.kind().is_some_and(|k| k.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        let priority_ok = match &self.priority {
            Some(wanted) => item.priority().is_some_and(|p| p.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        kind_ok && priority_ok
    }
}

/// A list of cards with a filter, a sort order and per-card expansion.
///
/// Expansion is keyed by position in the unfiltered list, so changing the
/// filter or sort leaves open cards open. Replacing the items closes them all.
#[derive(Debug, Clone)]
pub struct ResultView<T> {
    items: Vec<T>,
    filter: Filter,
    sort: SortKey,
    expanded: HashSet<usize>,
}

impl<T: Card> ResultView<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            filter: Filter::default(),
            sort: SortKey::default(),
            expanded: HashSet::new(),
        }
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.expanded.clear();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Flip one card. Returns whether it is now expanded; out-of-range
    /// indices are ignored.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if self.expanded.remove(&index) {
            false
        } else {
            self.expanded.insert(index);
            true
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn expand_all(&mut self) {
        self.expanded = (0..self.items.len()).collect();
    }

    /// Items passing the filter, in display order, with their original index.
    pub fn visible(&self) -> Vec<(usize, &T)> {
        let mut rows: Vec<(usize, &T)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.filter.accepts(*item))
            .collect();

        match self.sort {
            SortKey::Relevance => rows.sort_by(|a, b| b.1.score().cmp(&a.1.score())),
            SortKey::Name => rows.sort_by(|a, b| compare_names(a.1.title(), b.1.title())),
        }
        rows
    }

    /// Distinct kinds in first-seen order with how many items carry each.
    pub fn kinds(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for kind in self.items.iter().filter_map(|item| item.kind()) {
            match counts.iter_mut().find(|(k, _)| k == kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((kind.to_string(), 1)),
            }
        }
        counts
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{Channel, ChannelType, Funder, FunderType, Priority};

    fn channel(name: &str, kind: &str, score: u8) -> Channel {
        Channel {
            name: name.to_string(),
            channel_type: ChannelType::from(kind.to_string()),
            relevance_score: score,
            ..Default::default()
        }
    }

    fn twelve_channels() -> Vec<Channel> {
        vec![
            channel("Gandhi Hospital", "hospital", 88),
            channel("PHC Ghatkesar", "PHC", 75),
            channel("Fernandez Hospital", "hospital", 95),
            channel("Infosys Pocharam", "corporate", 60),
            channel("Osmania Medical College", "medical_college", 82),
            channel("Dhaatri Milk Bank", "ngo", 70),
            channel("Niloufer Hospital", "hospital", 91),
            channel("Mother Care Clinic", "clinic", 55),
            channel("DMHO Hyderabad", "health_office", 78),
            channel("Lotus Hospital", "hospital", 88),
            channel("Area Hospital Malkajgiri", "Hospital", 64),
            channel("TCS Synergy Park", "corporate", 58),
        ]
    }

    #[test]
    fn test_filter_hospitals_then_sort_by_relevance() {
        let mut view = ResultView::new(twelve_channels());
        view.set_filter(Filter::kind("hospital"));
        view.set_sort(SortKey::Relevance);

        let visible = view.visible();
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|(_, c)| c.channel_type == ChannelType::Hospital));
        assert!(visible.windows(2).all(|w| w[0].1.relevance_score >= w[1].1.relevance_score));
        for (index, c) in &visible {
            assert_eq!(&view.items()[*index], *c);
        }
    }

    #[test]
    fn test_sort_by_name() {
        let mut view = ResultView::new(twelve_channels());
        view.set_sort(SortKey::Name);
        let names: Vec<&str> = view.visible().into_iter().map(|(_, c)| c.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"Area Hospital Malkajgiri"));
        assert_eq!(names.last(), Some(&"TCS Synergy Park"));
    }

    #[test]
    fn test_kinds_with_counts() {
        let view = ResultView::new(twelve_channels());
        let kinds = view.kinds();
        assert_eq!(kinds[0], ("hospital".to_string(), 5));
        assert!(kinds.contains(&("corporate".to_string(), 2)));
        assert!(kinds.contains(&("PHC".to_string(), 1)));
    }

    #[test]
    fn test_cards_expand_independently() {
        let mut view = ResultView::new(twelve_channels());
        assert!(view.toggle(2));
        assert!(view.toggle(6));
        assert!(view.is_expanded(2) && view.is_expanded(6));

        assert!(!view.toggle(2));
        assert!(!view.is_expanded(2));
        assert!(view.is_expanded(6));

        assert!(!view.toggle(99));
    }

    #[test]
    fn test_replace_resets_expansion() {
        let mut view = ResultView::new(twelve_channels());
        view.expand_all();
        view.replace(twelve_channels());
        assert!((0..12).all(|i| !view.is_expanded(i)));
    }

    #[test]
    fn test_priority_filter_on_funders() {
        let funder = |name: &str, priority: Option<Priority>, score: u8| Funder {
            name: name.to_string(),
            funder_type: FunderType::Foundation,
            priority,
            relevance_score: score,
            ..Default::default()
        };
        let mut view = ResultView::new(vec![
            funder("A", Some(Priority::High), 70),
            funder("B", Some(Priority::Low), 90),
            funder("C", Some(Priority::High), 95),
            funder("D", None, 99),
        ]);
        view.set_filter(Filter {
            kind: Some("foundation".to_string()),
            priority: Some("high".to_string()),
        });
        let names: Vec<&str> = view.visible().into_iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);

        view.set_filter(Filter {
            kind: None,
            priority: Some("low".to_string()),
        });
        let names: Vec<&str> = view.visible().into_iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }
}
