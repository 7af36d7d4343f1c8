//! Derived metrics and chart series over a filtered record set.
//!
//! Nothing here raises on an empty view: every metric that has no value
//! for zero records is an `Option`.

use std::cmp::Ordering;

use super::model::{AnimeRecord, RATING_MAX, RATING_MIN};

/// One bar of a grouped count: a category value and how many records have it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// One equal-width bin of the rating histogram, `[lower, upper)`.
/// The last bin is closed so that a perfect 10 is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// A point of the episodes-vs-rating scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint<'a> {
    pub episodes: u32,
    pub rating: f64,
    pub genre: &'a str,
    pub title: &'a str,
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The records passing a set of criteria plus their summary metrics.
///
/// Scalar metrics are computed once when the view is built; grouped series
/// are computed on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    records: Vec<AnimeRecord>,
    mean_rating: Option<f64>,
    top_title: Option<String>,
    total_episodes: u64,
    dominant_studio: Option<String>,
}

impl FilteredView {
    /// Wrap records (already filtered, in source order) and derive metrics.
    pub fn new(records: Vec<AnimeRecord>) -> Self {
        let mean_rating = mean_rating(&records);
        let top_title = top_title(&records);
        let total_episodes = records.iter().map(|r| u64::from(r.episode_count)).sum();
        let dominant_studio = first_mode(records.iter().map(|r| r.studio.as_str()));
        Self {
            records,
            mean_rating,
            top_title,
            total_episodes,
            dominant_studio,
        }
    }

    /// Records in source order.
    pub fn records(&self) -> &[AnimeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Arithmetic mean of the non-null overall ratings.
    pub fn mean_rating(&self) -> Option<f64> {
        self.mean_rating
    }

    /// Title with the highest overall rating; first occurrence wins ties.
    pub fn top_title(&self) -> Option<&str> {
        self.top_title.as_deref()
    }

    pub fn total_episodes(&self) -> u64 {
        self.total_episodes
    }

    /// Most frequent studio; the first to reach the top count wins ties.
    pub fn dominant_studio(&self) -> Option<&str> {
        self.dominant_studio.as_deref()
    }

    /// Records ordered by overall rating, best first. Stable, so equal
    /// ratings keep source order; unrated records sink to the end.
    pub fn sorted_by_rating(&self) -> Vec<&AnimeRecord> {
        let mut sorted: Vec<&AnimeRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| match (a.overall_rating, b.overall_rating) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        sorted
    }

    /// Count per status, descending.
    pub fn status_counts(&self) -> Vec<GroupCount> {
        group_counts(self.records.iter().map(|r| r.status.as_str()))
    }

    /// The `top_n` most frequent studios, descending.
    pub fn studio_counts(&self, top_n: usize) -> Vec<GroupCount> {
        let mut counts = group_counts(self.records.iter().map(|r| r.studio.as_str()));
        counts.truncate(top_n);
        counts
    }

    /// Equal-width histogram of overall ratings over the full rating scale.
    pub fn rating_histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let bins = bins.max(1);
        let width = (RATING_MAX - RATING_MIN) / bins as f64;
        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: RATING_MIN + width * i as f64,
                upper: RATING_MIN + width * (i + 1) as f64,
                count: 0,
            })
            .collect();

        for rating in self.records.iter().filter_map(|r| r.overall_rating) {
            let idx = (((rating - RATING_MIN) / width).floor() as usize).min(bins - 1);
            out[idx].count += 1;
        }
        out
    }

    /// Episodes-vs-rating points for rated records.
    pub fn episode_rating_points(&self) -> Vec<ScatterPoint<'_>> {
        self.records
            .iter()
            .filter_map(|r| {
                r.overall_rating.map(|rating| ScatterPoint {
                    episodes: r.episode_count,
                    rating,
                    genre: &r.primary_genre,
                    title: &r.title,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mean_rating(records: &[AnimeRecord]) -> Option<f64> {
    let (sum, n) = records
        .iter()
        .filter_map(|r| r.overall_rating)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn top_title(records: &[AnimeRecord]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for rec in records {
        let Some(rating) = rec.overall_rating else { continue };
        match best {
            Some((_, top)) if rating <= top => {}
            _ => best = Some((rec.title.as_str(), rating)),
        }
    }
    best.map(|(title, _)| title.to_string())
}

/// Counts in first-seen order, then stably sorted by count descending, so
/// ties keep first-seen order.
fn group_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<GroupCount> {
    let mut counts: Vec<GroupCount> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|g| g.key == value) {
            Some(group) => group.count += 1,
            None => counts.push(GroupCount {
                key: value.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The value that first reaches the highest count while scanning in order.
fn first_mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut best: Option<(&str, usize)> = None;
    for value in values {
        let count = match counts.iter_mut().find(|(k, _)| *k == value) {
            Some((_, c)) => {
                *c += 1;
                *c
            }
            None => {
                counts.push((value, 1));
                1
            }
        };
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{Criteria, filter};
    use crate::data::model::tests::record;
    use crate::data::model::{AnimeTable, LoadReport};

    fn view(records: Vec<AnimeRecord>) -> FilteredView {
        FilteredView::new(records)
    }

    #[test]
    fn test_naruto_bleach_example() {
        let table = AnimeTable::from_records(
            vec![
                record("NARUTO", "Pierrot", Some(8.7), 220),
                record("BLEACH", "Pierrot", Some(6.2), 366),
            ],
            LoadReport::default(),
        );
        let criteria = Criteria {
            min_rating: 7.0,
            ..Criteria::default()
        };
        let v = filter(&table, &criteria);

        assert_eq!(v.len(), 1);
        assert_eq!(v.records()[0].title, "NARUTO");
        assert_eq!(v.mean_rating(), Some(8.7));
        assert_eq!(v.top_title(), Some("NARUTO"));
        assert_eq!(v.total_episodes(), 220);
        assert_eq!(v.dominant_studio(), Some("Pierrot"));
    }

    #[test]
    fn test_empty_view_metrics_are_undefined() {
        let v = view(Vec::new());
        assert!(v.is_empty());
        assert_eq!(v.mean_rating(), None);
        assert_eq!(v.top_title(), None);
        assert_eq!(v.total_episodes(), 0);
        assert_eq!(v.dominant_studio(), None);
        assert!(v.status_counts().is_empty());
        assert!(v.studio_counts(10).is_empty());
        assert!(v.rating_histogram(20).iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_mean_ignores_null_ratings() {
        let v = view(vec![
            record("A", "X", Some(6.0), 1),
            record("B", "X", None, 1),
            record("C", "X", Some(8.0), 1),
        ]);
        assert_eq!(v.mean_rating(), Some(7.0));
    }

    #[test]
    fn test_top_title_tie_keeps_first() {
        let v = view(vec![
            record("A", "X", Some(7.0), 1),
            record("B", "X", Some(9.0), 1),
            record("C", "X", Some(9.0), 1),
        ]);
        assert_eq!(v.top_title(), Some("B"));
    }

    #[test]
    fn test_dominant_studio_tie_keeps_first_to_reach_max() {
        let v = view(vec![
            record("A", "Bones", Some(7.0), 1),
            record("B", "Pierrot", Some(7.0), 1),
            record("C", "Pierrot", Some(7.0), 1),
            record("D", "Bones", Some(7.0), 1),
        ]);
        // Pierrot reaches 2 before Bones does.
        assert_eq!(v.dominant_studio(), Some("Pierrot"));
    }

    #[test]
    fn test_group_counts_descending_with_first_seen_ties() {
        let mut recs = vec![
            record("A", "Sunrise", Some(7.0), 1),
            record("B", "Bones", Some(7.0), 1),
            record("C", "Bones", Some(7.0), 1),
            record("D", "Madhouse", Some(7.0), 1),
            record("E", "Sunrise", Some(7.0), 1),
            record("F", "MAPPA", Some(7.0), 1),
        ];
        recs[5].status = "En cours".to_string();
        let v = view(recs);

        let studios: Vec<(String, usize)> = v
            .studio_counts(3)
            .into_iter()
            .map(|g| (g.key, g.count))
            .collect();
        assert_eq!(
            studios,
            vec![
                ("Sunrise".to_string(), 2),
                ("Bones".to_string(), 2),
                ("Madhouse".to_string(), 1),
            ]
        );

        let statuses = v.status_counts();
        assert_eq!(statuses[0], GroupCount { key: "Terminé".to_string(), count: 5 });
        assert_eq!(statuses[1], GroupCount { key: "En cours".to_string(), count: 1 });
    }

    #[test]
    fn test_sorted_by_rating_is_stable() {
        let v = view(vec![
            record("A", "X", Some(5.0), 1),
            record("B", "X", Some(9.0), 1),
            record("C", "X", Some(5.0), 1),
        ]);
        let order: Vec<&str> = v.sorted_by_rating().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        // Source order is untouched.
        assert_eq!(v.records()[0].title, "A");
    }

    #[test]
    fn test_rating_histogram_bins() {
        let v = view(vec![
            record("A", "X", Some(0.0), 1),
            record("B", "X", Some(4.99), 1),
            record("C", "X", Some(5.0), 1),
            record("D", "X", Some(10.0), 1),
            record("E", "X", None, 1),
        ]);
        let bins = v.rating_histogram(2);
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].lower, bins[0].upper, bins[0].count), (0.0, 5.0, 2));
        assert_eq!((bins[1].lower, bins[1].upper, bins[1].count), (5.0, 10.0, 2));
        assert_eq!(v.rating_histogram(0).len(), 1);
    }

    #[test]
    fn test_scatter_points_skip_unrated() {
        let v = view(vec![record("A", "X", Some(8.0), 24), record("B", "X", None, 12)]);
        let points = v.episode_rating_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].episodes, 24);
        assert_eq!(points[0].title, "A");
        assert_eq!(points[0].genre, "action");
    }
}
