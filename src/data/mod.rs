/// Data layer: core types, loading, aggregation and text corpora.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, check header → ReviewTable
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ ReviewTable  │  immutable Vec<ReviewRecord> + schema
///   └─────────────┘
///     │        │          │
///     ▼        ▼          ▼
///  filter   aggregate   corpus
///  (rows)   (counts, %) (text blobs, term frequencies)
/// ```

pub mod aggregate;
pub mod corpus;
pub mod filter;
pub mod loader;
pub mod model;
