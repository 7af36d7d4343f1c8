//! Rendering only. Every number drawn here comes from the engine's
//! `FilteredView` or the loaded `AnimeTable`.

pub mod detail;
pub mod panels;
pub mod plot;
pub mod table;
