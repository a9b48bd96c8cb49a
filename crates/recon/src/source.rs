use crate::error::ReconError;
use crate::model::{DataQualityWarning, GoldenTable, KeySpec, Record};

/// An input table as loaded: named columns, string cells.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A source reduced to its key columns.
#[derive(Debug, Clone)]
pub struct Projection {
    pub records: Vec<Record>,
    pub warnings: Vec<DataQualityWarning>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Check that every key field is a column of this table.
    pub fn check_schema(&self, key: &KeySpec) -> Result<Vec<usize>, ReconError> {
        key.fields()
            .iter()
            .map(|field| {
                self.columns.iter().position(|c| c == field).ok_or_else(|| {
                    ReconError::MissingColumn {
                        source: self.name.clone(),
                        column: field.clone(),
                    }
                })
            })
            .collect()
    }

    /// Keep only the key columns. Blank cells become missing values and are
    /// reported as warnings; all other columns are dropped.
    pub fn project(&self, key: &KeySpec) -> Result<Projection, ReconError> {
        let indices = self.check_schema(key)?;
        let mut records = Vec::with_capacity(self.rows.len());
        let mut warnings = Vec::new();

        for (row_idx, row) in self.rows.iter().enumerate() {
            let values: Vec<Option<String>> = indices
                .iter()
                .zip(key.fields())
                .map(|(&i, field)| {
                    let cell = row.get(i).filter(|s| !s.trim().is_empty());
                    if cell.is_none() {
                        warnings.push(DataQualityWarning::MissingKeyValue {
                            source: self.name.clone(),
                            // 1-based, header excluded
                            row: row_idx + 1,
                            field: field.clone(),
                        });
                    }
                    cell.map(|s| s.to_string())
                })
                .collect();
            records.push(Record::new(values));
        }

        for warning in &warnings {
            log::warn!("{warning}");
        }

        Ok(Projection { records, warnings })
    }
}

/// Parse CSV text with a header row into a [`SourceTable`].
pub fn load_csv_source(name: &str, csv_data: &str) -> Result<SourceTable, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let csv_err = |e: csv::Error| ReconError::Csv {
        source: name.into(),
        message: e.to_string(),
    };

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }

    log::debug!("loaded source '{name}': {} column(s), {} row(s)", columns.len(), rows.len());

    Ok(SourceTable::new(name, columns, rows))
}

/// Render the golden table as CSV: key columns only, missing values empty.
pub fn write_csv(golden: &GoldenTable) -> Result<String, ReconError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let io_err = |e: csv::Error| ReconError::Io(e.to_string());

    writer
        .write_record(golden.key_spec().fields())
        .map_err(io_err)?;
    for record in golden.records() {
        writer
            .write_record(record.values.iter().map(|v| v.as_deref().unwrap_or("")))
            .map_err(io_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLEGES: &str = "\
id,name,city
1,Springfield College,Springfield
2,Shelbyville Tech,Shelbyville
3,,Ogdenville
";

    #[test]
    fn load_csv_basic() {
        let table = load_csv_source("data_1", COLLEGES).unwrap();
        assert_eq!(table.columns, vec!["id", "name", "city"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1][1], "Shelbyville Tech");
    }

    #[test]
    fn project_drops_payload_and_flags_blank_keys() {
        let table = load_csv_source("data_1", COLLEGES).unwrap();
        let key = KeySpec::new(["name"]).unwrap();
        let proj = table.project(&key).unwrap();
        assert_eq!(proj.records.len(), 3);
        assert_eq!(proj.records[0], Record::from_values(["Springfield College"]));
        assert_eq!(proj.records[2], Record::new(vec![None]));
        assert_eq!(
            proj.warnings,
            vec![DataQualityWarning::MissingKeyValue {
                source: "data_1".into(),
                row: 3,
                field: "name".into(),
            }]
        );
    }

    #[test]
    fn project_follows_key_order() {
        let table = load_csv_source("data_1", COLLEGES).unwrap();
        let key = KeySpec::new(["city", "name"]).unwrap();
        let proj = table.project(&key).unwrap();
        assert_eq!(
            proj.records[0],
            Record::from_values(["Springfield", "Springfield College"])
        );
    }

    #[test]
    fn missing_key_column_is_schema_error() {
        let table = load_csv_source("data_2", "id,title\n1,Acme\n").unwrap();
        let key = KeySpec::new(["name"]).unwrap();
        let err = table.project(&key).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingColumn { ref source, ref column } if source == "data_2" && column == "name"
        ));
    }

    #[test]
    fn short_rows_count_as_missing() {
        let table = load_csv_source("s", "name,city\nAcme\n").unwrap();
        let key = KeySpec::new(["name", "city"]).unwrap();
        let proj = table.project(&key).unwrap();
        assert_eq!(proj.records[0], Record::new(vec![Some("Acme".into()), None]));
        assert_eq!(proj.warnings.len(), 1);
    }

    #[test]
    fn key_cells_kept_raw() {
        let table = load_csv_source("s", "name\nAcme\n\" Acme\"\n\"   \"\n").unwrap();
        let key = KeySpec::new(["name"]).unwrap();
        let proj = table.project(&key).unwrap();
        assert_eq!(
            proj.records,
            vec![
                Record::from_values(["Acme"]),
                Record::from_values([" Acme"]),
                Record::new(vec![None]),
            ]
        );
        // Distinct raw tuples survive dedup.
        assert_eq!(crate::model::dedup_records(&proj.records).len(), 3);
        assert_eq!(proj.warnings.len(), 1);
    }

    #[test]
    fn write_csv_round_trip_shape() {
        let key = KeySpec::new(["name", "city"]).unwrap();
        let golden = GoldenTable::from_records(
            key,
            vec![
                Record::from_values(["Acme, Inc", "Paris"]),
                Record::new(vec![Some("Zephyr".into()), None]),
            ],
        );
        let out = write_csv(&golden).unwrap();
        assert_eq!(out, "name,city\n\"Acme, Inc\",Paris\nZephyr,\n");
    }
}
