use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::{RATING_MAX, RATING_MIN};

/// Name of the optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "anime-dashboard.json";

/// Environment variable overriding [`DashboardConfig::data_path`].
pub const DATA_PATH_ENV: &str = "ANIME_DASHBOARD_DATA";

// ── DashboardConfig ───────────────────────────────────────────────────────────

/// Dashboard settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at start-up.
    pub data_path: PathBuf,
    /// Initial position of the minimum rating slider.
    pub default_min_rating: f64,
    /// How many studios (alphabetically) are preselected at start-up.
    pub default_studio_count: usize,
    /// Bars in the studio chart.
    pub top_studios: usize,
    pub histogram_bins: usize,
    /// Ratings at or above this are highlighted in the detail view.
    pub highlight_rating: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("animes.csv"),
            default_min_rating: 7.0,
            default_studio_count: 5,
            top_studios: 10,
            histogram_bins: 20,
            highlight_rating: 8.5,
        }
    }
}

impl DashboardConfig {
    /// Load from [`CONFIG_FILE`] and apply the environment override.
    pub fn load() -> Self {
        let mut config = Self::load_from(Path::new(CONFIG_FILE));
        if let Some(path) = std::env::var_os(DATA_PATH_ENV) {
            config.data_path = PathBuf::from(path);
        }
        config
    }

    /// Load from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.default_min_rating = if self.default_min_rating.is_finite() {
            self.default_min_rating.clamp(RATING_MIN, RATING_MAX)
        } else {
            Self::default().default_min_rating
        };
        self.highlight_rating = if self.highlight_rating.is_finite() {
            self.highlight_rating.clamp(RATING_MIN, RATING_MAX)
        } else {
            Self::default().highlight_rating
        };
        self.histogram_bins = self.histogram_bins.max(1);
        self.top_studios = self.top_studios.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig::load_from(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "data_path": "data/list.csv", "top_studios": 5 }"#).unwrap();

        let config = DashboardConfig::load_from(&path);
        assert_eq!(config.data_path, PathBuf::from("data/list.csv"));
        assert_eq!(config.top_studios, 5);
        assert_eq!(config.default_min_rating, 7.0);
        assert_eq!(config.histogram_bins, 20);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(DashboardConfig::load_from(&path), DashboardConfig::default());
    }

    #[test]
    fn test_values_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "default_min_rating": 42.0, "histogram_bins": 0 }"#).unwrap();

        let config = DashboardConfig::load_from(&path);
        assert_eq!(config.default_min_rating, 10.0);
        assert_eq!(config.histogram_bins, 1);
    }

    #[test]
    fn test_highlight_rating_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "highlight_rating": 15.0 }"#).unwrap();
        assert_eq!(DashboardConfig::load_from(&path).highlight_rating, 10.0);

        std::fs::write(&path, r#"{ "highlight_rating": -2.5 }"#).unwrap();
        assert_eq!(DashboardConfig::load_from(&path).highlight_rating, 0.0);

        let config = DashboardConfig {
            highlight_rating: f64::NAN,
            ..DashboardConfig::default()
        }
        .sanitized();
        assert_eq!(config.highlight_rating, 8.5);
    }
}
