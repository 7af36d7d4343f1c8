use std::collections::BTreeSet;

use super::aggregate::FilteredView;
use super::model::{AnimeRecord, AnimeTable};

// ---------------------------------------------------------------------------
// Selection: which values of one dimension are admitted
// ---------------------------------------------------------------------------

/// Selection state for one categorical dimension (studio, genre, status).
///
/// An `Only` set that is empty admits everything, exactly like `All`: a user
/// who clears every checkbox has stopped filtering on that dimension, not
/// asked for an empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    /// Build a selection from an iterator of admitted values.
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    /// Whether `value` passes this selection.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) if set.is_empty() => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Whether `value` is explicitly ticked. `All` ticks everything,
    /// an empty `Only` ticks nothing.
    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Toggle one value. `universe` is the full list of values, needed to
    /// expand `All` into an explicit set first.
    pub fn toggle(&mut self, value: &str, universe: &[String]) {
        if let Selection::All = self {
            *self = Selection::only(universe.iter().cloned());
        }
        if let Selection::Only(set) = self {
            if !set.remove(value) {
                set.insert(value.to_string());
            }
        }
    }

    /// Number of ticked values out of `total`.
    pub fn selected_count(&self, total: usize) -> usize {
        match self {
            Selection::All => total,
            Selection::Only(set) => set.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// The active filter configuration chosen by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    pub studios: Selection,
    /// Compared against each record's primary genre.
    pub genres: Selection,
    pub statuses: Selection,
    /// Records rated below this, or unrated, are excluded.
    pub min_rating: f64,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            studios: Selection::All,
            genres: Selection::All,
            statuses: Selection::All,
            min_rating: 0.0,
        }
    }
}

impl Criteria {
    /// The dashboard's initial selection: the first `studio_count` studios
    /// alphabetically, every genre and status, and `min_rating`.
    pub fn initial(table: &AnimeTable, studio_count: usize, min_rating: f64) -> Self {
        Self {
            studios: Selection::only(table.studios.iter().take(studio_count).cloned()),
            genres: Selection::All,
            statuses: Selection::All,
            min_rating,
        }
    }

    /// Whether a single record passes every dimension.
    pub fn matches(&self, record: &AnimeRecord) -> bool {
        self.studios.admits(&record.studio)
            && self.genres.admits(&record.primary_genre)
            && self.statuses.admits(&record.status)
            && record
                .overall_rating
                .is_some_and(|rating| rating >= self.min_rating)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Filter an arbitrary record slice, e.g. an already filtered view.
pub fn filter_records(records: &[AnimeRecord], criteria: &Criteria) -> FilteredView {
    let matching = records
        .iter()
        .filter(|rec| criteria.matches(rec))
        .cloned()
        .collect();
    FilteredView::new(matching)
}

/// Filter the full table. Pure: the table is only read.
pub fn filter(table: &AnimeTable, criteria: &Criteria) -> FilteredView {
    filter_records(&table.records, criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LoadReport;
    use crate::data::model::tests::record;

    fn table(records: Vec<AnimeRecord>) -> AnimeTable {
        AnimeTable::from_records(records, LoadReport::default())
    }

    fn titles(view: &FilteredView) -> Vec<&str> {
        view.records().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_passes_everything() {
        let sel = Selection::Only(BTreeSet::new());
        assert!(sel.admits("Pierrot"));
        assert!(!sel.is_selected("Pierrot"));
        assert!(Selection::All.admits("anything"));
        assert!(!Selection::only(["Bones"]).admits("Pierrot"));
    }

    #[test]
    fn test_toggle_expands_all() {
        let universe = vec!["A".to_string(), "B".to_string()];
        let mut sel = Selection::All;
        sel.toggle("A", &universe);
        assert_eq!(sel, Selection::only(["B"]));
        sel.toggle("A", &universe);
        assert_eq!(sel, Selection::only(["A", "B"]));
        assert_eq!(sel.selected_count(2), 2);
    }

    #[test]
    fn test_all_criteria_returns_full_table_in_order() {
        let t = table(vec![
            record("C", "X", Some(1.0), 1),
            record("A", "Y", Some(0.0), 1),
            record("B", "X", Some(9.0), 1),
        ]);
        let view = filter(&t, &Criteria::default());
        assert_eq!(titles(&view), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_null_rating_never_passes() {
        let t = table(vec![record("A", "X", None, 1), record("B", "X", Some(0.0), 1)]);
        let view = filter(&t, &Criteria::default());
        assert_eq!(titles(&view), vec!["B"]);
    }

    #[test]
    fn test_dimensions_combine() {
        let mut a = record("A", "Pierrot", Some(8.0), 1);
        a.status = "En cours".to_string();
        let mut b = record("B", "Pierrot", Some(8.0), 1);
        b.primary_genre = "drama".to_string();
        let c = record("C", "Bones", Some(8.0), 1);
        let d = record("D", "Pierrot", Some(8.0), 1);
        let t = table(vec![a, b, c, d]);

        let criteria = Criteria {
            studios: Selection::only(["Pierrot"]),
            genres: Selection::only(["action"]),
            statuses: Selection::only(["Terminé"]),
            min_rating: 5.0,
        };
        assert_eq!(titles(&filter(&t, &criteria)), vec!["D"]);
    }

    #[test]
    fn test_min_rating_is_inclusive() {
        let t = table(vec![record("A", "X", Some(7.0), 1), record("B", "X", Some(6.99), 1)]);
        let criteria = Criteria {
            min_rating: 7.0,
            ..Criteria::default()
        };
        assert_eq!(titles(&filter(&t, &criteria)), vec!["A"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let t = table(vec![
            record("A", "Pierrot", Some(8.0), 1),
            record("B", "Bones", Some(9.0), 1),
            record("C", "Pierrot", Some(4.0), 1),
            record("D", "Pierrot", None, 1),
        ]);
        let criteria = Criteria {
            studios: Selection::only(["Pierrot"]),
            min_rating: 5.0,
            ..Criteria::default()
        };
        let once = filter(&t, &criteria);
        let twice = filter_records(once.records(), &criteria);
        assert_eq!(once.records(), twice.records());
    }

    #[test]
    fn test_initial_criteria_takes_first_studios() {
        let t = table(vec![
            record("A", "Sunrise", Some(8.0), 1),
            record("B", "Bones", Some(8.0), 1),
            record("C", "MAPPA", Some(8.0), 1),
        ]);
        let criteria = Criteria::initial(&t, 2, 7.0);
        assert_eq!(criteria.studios, Selection::only(["Bones", "MAPPA"]));
        assert_eq!(criteria.min_rating, 7.0);
        assert_eq!(titles(&filter(&t, &criteria)), vec!["B", "C"]);
    }

    #[test]
    fn test_table_is_not_mutated() {
        let t = table(vec![record("A", "X", Some(3.0), 1), record("B", "X", Some(8.0), 1)]);
        let before = t.records.clone();
        let criteria = Criteria {
            min_rating: 5.0,
            ..Criteria::default()
        };
        let _ = filter(&t, &criteria);
        assert_eq!(t.records, before);
    }
}
