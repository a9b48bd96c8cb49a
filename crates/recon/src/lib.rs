//! `goldmerge-recon`: fuzzy entity reconciliation across ordered sources.
//!
//! Pure engine crate: receives pre-loaded tables and stop words, returns a
//! deduplicated golden table plus per-round reports. No CLI or file IO.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod source;
pub mod stopwords;

pub use config::{MergeConfig, MergeParams};
pub use engine::{merge, merge_with_scorer, run};
pub use error::{ErrorKind, ReconError};
pub use matcher::{Scorer, TokenSortRatio};
pub use model::{GoldenResult, GoldenTable, KeySpec, Record};
pub use source::{load_csv_source, write_csv, SourceTable};
pub use stopwords::StopWordSet;
