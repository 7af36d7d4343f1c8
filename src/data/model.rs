use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column names (after header normalization)
// ---------------------------------------------------------------------------

pub const COL_TITLE: &str = "anime";
pub const COL_GENRE_TAGS: &str = "genre_tags";
pub const COL_PRIMARY_GENRE: &str = "genre_principal";
pub const COL_SOURCE: &str = "source";
pub const COL_STATUS: &str = "status";
pub const COL_STUDIO: &str = "studio";
pub const COL_PUBLISH_DATE: &str = "date_pub";
pub const COL_OVERALL_RATING: &str = "note_globale";
pub const COL_BEST_EPISODE_RATING: &str = "note_meilleur_ep";
pub const COL_WORST_EPISODE_RATING: &str = "note_pire_ep";
pub const COL_EPISODE_COUNT: &str = "nb_episodes";
pub const COL_IMAGE_URL: &str = "image_url";
pub const COL_DESCRIPTION: &str = "comm_saison_1";
pub const COL_BEST_EPISODE_TITLE: &str = "meilleur_ep_titre";

/// Genre used when a record has no genre tags at all.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Inclusive bounds every rating is clamped into.
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

// ---------------------------------------------------------------------------
// AnimeRecord – one normalized row
// ---------------------------------------------------------------------------

/// A single anime title after normalization.
///
/// Every field is validated at load time: ratings are within
/// [`RATING_MIN`]..=[`RATING_MAX`] or `None`, `genre_tags` is never absent
/// and `primary_genre` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeRecord {
    /// Trimmed, uppercased title. Unique within an [`AnimeTable`].
    pub title: String,
    /// Lowercase genre tags in source order.
    pub genre_tags: Vec<String>,
    /// First genre tag, or [`UNKNOWN_GENRE`].
    pub primary_genre: String,
    pub studio: String,
    pub status: String,
    pub source: String,
    pub overall_rating: Option<f64>,
    pub best_episode_rating: Option<f64>,
    pub worst_episode_rating: Option<f64>,
    pub publish_date: Option<NaiveDate>,
    pub episode_count: u32,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub best_episode_title: Option<String>,
}

// ---------------------------------------------------------------------------
// LoadReport – what the normalizer had to repair
// ---------------------------------------------------------------------------

/// Counters for the lossy transforms applied while building a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub untitled_dropped: usize,
    pub unparsed_dates: usize,
    pub unparsed_ratings: usize,
    pub clamped_ratings: usize,
}

// ---------------------------------------------------------------------------
// AnimeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The normalized dataset with pre-computed selection values.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct AnimeTable {
    /// Records in source order, duplicates removed.
    pub records: Vec<AnimeRecord>,
    /// Sorted unique studios.
    pub studios: Vec<String>,
    /// Sorted unique primary genres.
    pub primary_genres: Vec<String>,
    /// Unique statuses in first-seen order.
    pub statuses: Vec<String>,
    pub report: LoadReport,
}

impl AnimeTable {
    /// Build selection indices from normalized records.
    pub fn from_records(records: Vec<AnimeRecord>, report: LoadReport) -> Self {
        let studios: BTreeSet<String> = records.iter().map(|r| r.studio.clone()).collect();
        let genres: BTreeSet<String> = records.iter().map(|r| r.primary_genre.clone()).collect();

        let mut statuses: Vec<String> = Vec::new();
        for rec in &records {
            if !statuses.contains(&rec.status) {
                statuses.push(rec.status.clone());
            }
        }

        AnimeTable {
            records,
            studios: studios.into_iter().collect(),
            primary_genres: genres.into_iter().collect(),
            statuses,
            report,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Titles in alphabetical order, for the detail-lookup menu.
    pub fn sorted_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self.records.iter().map(|r| r.title.as_str()).collect();
        titles.sort_unstable();
        titles
    }

    /// Look up a record by its (uppercase) title.
    pub fn find_by_title(&self, title: &str) -> Option<&AnimeRecord> {
        self.records.iter().find(|r| r.title == title)
    }
}
