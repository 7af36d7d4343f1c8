/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → RawTable (text cells, normalized headers)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  clean + dedupe → AnimeTable (immutable, cached)
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply Criteria → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs + chart series          export → .csv
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
