use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::MergeParams;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Key spec + records
// ---------------------------------------------------------------------------

/// Ordered list of field names that make up the comparison key.
///
/// Order drives how the normalized key string is built; uniqueness of a
/// record only depends on the tuple of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeySpec {
    fields: Vec<String>,
}

impl KeySpec {
    pub fn new<I, S>(fields: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ReconError::EmptyKeySpec);
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(ReconError::DuplicateKeyField(field.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A row reduced to its key-field values, aligned with the [`KeySpec`].
///
/// `None` marks a missing value (blank cell or absent column in a short row).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Record {
    pub values: Vec<Option<String>>,
}

impl Record {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Build a record where every value is present.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    /// True when no key value is missing. Incomplete records never take part
    /// in similarity matching.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            match value {
                Some(v) => write!(f, "{v}")?,
                None => write!(f, "<missing>")?,
            }
        }
        Ok(())
    }
}

/// Keep the first occurrence of every raw key tuple, preserving order.
pub fn dedup_records(records: &[Record]) -> Vec<Record> {
    let mut seen: HashSet<&Record> = HashSet::with_capacity(records.len());
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record) {
            out.push(record.clone());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// One ranked candidate for a query: position in the pool, its normalized
/// key, and the similarity score (0-100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub index: usize,
    pub key: String,
    pub score: u8,
}

// ---------------------------------------------------------------------------
// Golden table
// ---------------------------------------------------------------------------

/// Accumulated entity set, unique by raw key tuple, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenTable {
    key: KeySpec,
    records: Vec<Record>,
    #[serde(skip)]
    seen: HashSet<Record>,
}

impl GoldenTable {
    pub fn new(key: KeySpec) -> Self {
        Self {
            key,
            records: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn from_records<I>(key: KeySpec, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut table = Self::new(key);
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Add a record unless its key tuple is already present. Returns whether
    /// the record was new.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.seen.contains(&record) {
            return false;
        }
        self.seen.insert(record.clone());
        self.records.push(record);
        true
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.seen.contains(record)
    }

    pub fn key_spec(&self) -> &KeySpec {
        &self.key
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PartialEq for GoldenTable {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.records == other.records
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// A key field is blank. The record is kept but never matched.
    MissingKeyValue {
        source: String,
        row: usize,
        field: String,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKeyValue { source, row, field } => write!(
                f,
                "source '{source}', row {row}: key field '{field}' is empty; record will not be matched"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Round + run reports
// ---------------------------------------------------------------------------

/// A right record joined onto a left record through the match string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub left: Record,
    pub right: Record,
    pub score: u8,
}

/// What happened when one source was folded into the golden table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundReport {
    pub source: String,
    pub left_records: usize,
    pub right_records: usize,
    pub linked: usize,
    pub novel: usize,
    /// Linked right records that no left match string equals. They are
    /// dropped from the golden table.
    pub unabsorbed: usize,
    pub missing_key: usize,
    pub golden_records: usize,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub sources: usize,
    pub input_records: usize,
    pub golden_records: usize,
    pub linked: usize,
    pub novel: usize,
    pub unabsorbed: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub key: KeySpec,
    pub threshold: u8,
    pub limit: usize,
    pub engine_version: String,
    pub run_at: String,
}

impl MergeMeta {
    pub fn new(key: &KeySpec, params: &MergeParams) -> Self {
        Self {
            name: None,
            key: key.clone(),
            threshold: params.threshold,
            limit: params.limit,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GoldenResult {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    pub golden: GoldenTable,
    pub rounds: Vec<RoundReport>,
    pub warnings: Vec<DataQualityWarning>,
}
