/// Data layer: core types, loading, location index, and view building.
///
/// Architecture:
/// ```text
///  .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + normalise → RecordSet
///   └──────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌───────────┐     ┌──────────┐
///   │ locations  │     │   view    │  (RecordSet, Selection) → View
///   └───────────┘     └──────────┘
///   sorted, distinct    series, overlay, bounded rows
/// ```

pub mod loader;
pub mod locations;
pub mod model;
pub mod view;
