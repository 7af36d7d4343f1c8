//! Loading, normalization, filtering and aggregation for the anime dataset
//! explorer. The egui front-end in `main.rs` is a thin consumer of this crate.

pub mod config;
pub mod data;

pub use data::aggregate::FilteredView;
pub use data::cache::TableCache;
pub use data::filter::{Criteria, Selection, filter};
pub use data::loader::{LoadError, load_file};
pub use data::model::{AnimeRecord, AnimeTable};
