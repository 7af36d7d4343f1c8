use std::path::{Path, PathBuf};
use std::sync::Arc;

use anime_dashboard::config::DashboardConfig;
use anime_dashboard::data::aggregate::FilteredView;
use anime_dashboard::data::cache::TableCache;
use anime_dashboard::data::filter::{Criteria, Selection, filter};
use anime_dashboard::data::model::AnimeTable;

use crate::color::ColorMap;

/// Which dimension a filter widget edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Studio,
    Genre,
    Status,
}

/// Tabs of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Ratings,
    StudiosAndStatus,
    Data,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Source currently shown.
    pub data_path: PathBuf,

    cache: TableCache,

    /// Loaded table (None until a load succeeds).
    pub table: Option<Arc<AnimeTable>>,

    /// Current filter selections.
    pub criteria: Criteria,

    /// Records passing `criteria` plus aggregates (cached).
    pub view: FilteredView,

    /// Colours for primary genres in the scatter plot.
    pub genre_colors: ColorMap,

    pub tab: Tab,

    /// Title picked in the encyclopedia section.
    pub selected_title: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            data_path: config.data_path.clone(),
            config,
            cache: TableCache::new(),
            table: None,
            criteria: Criteria::default(),
            view: FilteredView::default(),
            genre_colors: ColorMap::default(),
            tab: Tab::default(),
            selected_title: None,
            status_message: None,
        };
        let path = state.data_path.clone();
        state.open(&path);
        state
    }

    /// Load `path` through the cache and reset filters when the table changed.
    pub fn open(&mut self, path: &Path) {
        self.data_path = path.to_path_buf();
        match self.cache.get_or_load(path) {
            Ok(table) => {
                let unchanged = self
                    .table
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &table));
                if !unchanged {
                    self.set_table(table);
                }
                self.status_message = None;
            }
            Err(e) => {
                // Downstream renders a "no data" state rather than stale rows.
                self.table = None;
                self.view = FilteredView::default();
                self.selected_title = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Force a reload of the current source.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        let path = self.data_path.clone();
        self.open(&path);
    }

    /// Ingest a newly loaded table, initialise filters and colours.
    fn set_table(&mut self, table: Arc<AnimeTable>) {
        self.criteria = Criteria::initial(
            &table,
            self.config.default_studio_count,
            self.config.default_min_rating,
        );
        self.genre_colors = ColorMap::new(&table.primary_genres);
        self.selected_title = table.sorted_titles().first().map(|t| t.to_string());
        self.table = Some(table);
        self.refilter();
    }

    /// Recompute `view` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.view = filter(table, &self.criteria);
        }
    }

    fn selection_mut(&mut self, dim: Dimension) -> &mut Selection {
        match dim {
            Dimension::Studio => &mut self.criteria.studios,
            Dimension::Genre => &mut self.criteria.genres,
            Dimension::Status => &mut self.criteria.statuses,
        }
    }

    pub fn selection(&self, dim: Dimension) -> &Selection {
        match dim {
            Dimension::Studio => &self.criteria.studios,
            Dimension::Genre => &self.criteria.genres,
            Dimension::Status => &self.criteria.statuses,
        }
    }

    /// All values of a dimension, as offered by the filter widgets.
    pub fn universe(&self, dim: Dimension) -> Vec<String> {
        let Some(table) = &self.table else {
            return Vec::new();
        };
        match dim {
            Dimension::Studio => table.studios.clone(),
            Dimension::Genre => table.primary_genres.clone(),
            Dimension::Status => table.statuses.clone(),
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let universe = self.universe(dim);
        self.selection_mut(dim).toggle(value, &universe);
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        *self.selection_mut(dim) = Selection::All;
        self.refilter();
    }

    /// Deselect all values. An empty selection filters nothing out.
    pub fn select_none(&mut self, dim: Dimension) {
        *self.selection_mut(dim) = Selection::only(Vec::<String>::new());
        self.refilter();
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.criteria.min_rating = min_rating;
        self.refilter();
    }
}
