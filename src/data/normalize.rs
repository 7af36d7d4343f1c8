use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::model::*;

// ---------------------------------------------------------------------------
// RawTable – loosely typed rows straight from a reader
// ---------------------------------------------------------------------------

/// Text cells as produced by any of the format readers. `None` is a null cell.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header names, already passed through [`normalize_header`].
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a table, normalizing every header name.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RawTable {
            headers: headers.into_iter().map(|h| normalize_header(h.as_ref())).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Trim, lowercase and replace spaces with underscores.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Positions of the known columns inside a [`RawTable`].
struct Columns {
    title: usize,
    genre_tags: Option<usize>,
    source: Option<usize>,
    status: Option<usize>,
    studio: Option<usize>,
    publish_date: Option<usize>,
    overall_rating: Option<usize>,
    best_episode_rating: Option<usize>,
    worst_episode_rating: Option<usize>,
    episode_count: Option<usize>,
    image_url: Option<usize>,
    description: Option<usize>,
    best_episode_title: Option<usize>,
}

impl Columns {
    fn resolve(raw: &RawTable) -> Option<Self> {
        let optional = |name: &str| {
            let idx = raw.column(name);
            if idx.is_none() {
                log::warn!("Column '{name}' not found, using defaults");
            }
            idx
        };
        Some(Columns {
            title: raw.column(COL_TITLE)?,
            genre_tags: optional(COL_GENRE_TAGS),
            source: optional(COL_SOURCE),
            status: optional(COL_STATUS),
            studio: optional(COL_STUDIO),
            publish_date: optional(COL_PUBLISH_DATE),
            overall_rating: optional(COL_OVERALL_RATING),
            best_episode_rating: optional(COL_BEST_EPISODE_RATING),
            worst_episode_rating: optional(COL_WORST_EPISODE_RATING),
            episode_count: optional(COL_EPISODE_COUNT),
            image_url: raw.column(COL_IMAGE_URL),
            description: raw.column(COL_DESCRIPTION),
            best_episode_title: raw.column(COL_BEST_EPISODE_TITLE),
        })
    }
}

fn cell(row: &[Option<String>], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).and_then(|c| c.as_deref())
}

fn trimmed(row: &[Option<String>], idx: Option<usize>) -> String {
    cell(row, idx).map(str::trim).unwrap_or_default().to_string()
}

fn optional_text(row: &[Option<String>], idx: Option<usize>) -> Option<String> {
    cell(row, idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Turn raw rows into an [`AnimeTable`].
///
/// Returns `None` when the table has no title column. Every per-field
/// failure is recovered in place and counted in the [`LoadReport`].
pub fn build_table(raw: &RawTable) -> Option<AnimeTable> {
    let cols = Columns::resolve(raw)?;
    let mut report = LoadReport {
        rows_read: raw.rows.len(),
        ..LoadReport::default()
    };

    let mut seen: HashSet<String> = HashSet::with_capacity(raw.rows.len());
    let mut records = Vec::with_capacity(raw.rows.len());

    for (row_no, row) in raw.rows.iter().enumerate() {
        let title = normalize_title(cell(row, Some(cols.title)).unwrap_or(""));
        if title.is_empty() {
            log::debug!("Row {row_no}: empty title, dropped");
            report.untitled_dropped += 1;
            continue;
        }
        if !seen.insert(title.clone()) {
            log::debug!("Row {row_no}: duplicate title '{title}', dropped");
            report.duplicates_dropped += 1;
            continue;
        }

        let publish_date = match cell(row, cols.publish_date).map(str::trim) {
            Some(raw_date) if !raw_date.is_empty() => {
                let parsed = parse_date(raw_date);
                if parsed.is_none() {
                    log::debug!("Row {row_no}: unparseable date '{raw_date}'");
                    report.unparsed_dates += 1;
                }
                parsed
            }
            _ => None,
        };

        let mut rating = |idx: Option<usize>| match cell(row, idx).map(str::trim) {
            Some(raw_rating) if !raw_rating.is_empty() => match parse_rating(raw_rating) {
                Some(value) => {
                    let clamped = clamp_rating(value);
                    if clamped != value {
                        log::debug!("Row {row_no}: rating {value} clamped to {clamped}");
                        report.clamped_ratings += 1;
                    }
                    Some(clamped)
                }
                None => {
                    log::debug!("Row {row_no}: unparseable rating '{raw_rating}'");
                    report.unparsed_ratings += 1;
                    None
                }
            },
            _ => None,
        };
        let overall_rating = rating(cols.overall_rating);
        let best_episode_rating = rating(cols.best_episode_rating);
        let worst_episode_rating = rating(cols.worst_episode_rating);

        let genre_tags = split_genres(cell(row, cols.genre_tags).unwrap_or(""));
        let primary_genre = primary_genre(&genre_tags);

        records.push(AnimeRecord {
            title,
            genre_tags,
            primary_genre,
            studio: trimmed(row, cols.studio),
            status: trimmed(row, cols.status),
            source: trimmed(row, cols.source),
            overall_rating,
            best_episode_rating,
            worst_episode_rating,
            publish_date,
            episode_count: parse_episode_count(cell(row, cols.episode_count).unwrap_or("")),
            image_url: optional_text(row, cols.image_url),
            description: optional_text(row, cols.description),
            best_episode_title: optional_text(row, cols.best_episode_title),
        });
    }

    Some(AnimeTable::from_records(records, report))
}

// ---------------------------------------------------------------------------
// Field normalizers
// ---------------------------------------------------------------------------

pub fn normalize_title(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Lowercase, strip spaces and split on `/`. Empty pieces are dropped.
pub fn split_genres(raw: &str) -> Vec<String> {
    let compact: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    compact
        .split('/')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn primary_genre(tags: &[String]) -> String {
    tags.first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
}

/// Parse a rating, accepting a decimal comma. Non-finite values are rejected.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

pub fn clamp_rating(value: f64) -> f64 {
    value.clamp(RATING_MIN, RATING_MAX)
}

/// Episode counts are non-negative integers; anything else becomes 0.
pub fn parse_episode_count(raw: &str) -> u32 {
    match raw.trim().replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a publication date from the formats commonly found in exports.
///
/// Month-first wins over day-first when both would match. `%Y` accepts any
/// digit count, so a parse landing before year 1000 came from a short year
/// field ("10/03/02") and is rejected.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_date_any_year(raw.trim()).filter(|date| date.year() >= 1000)
}

fn parse_date_any_year(raw: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // Partial dates: "2019-04" and "2019".
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 {
        if let Ok(year) = raw.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}
