use std::collections::HashSet;
use std::path::PathBuf;

use proptest::prelude::*;

use goldmerge_recon::config::{MergeConfig, MergeParams};
use goldmerge_recon::engine::{merge, run};
use goldmerge_recon::model::{DataQualityWarning, GoldenResult, KeySpec, Record};
use goldmerge_recon::source::{load_csv_source, write_csv, SourceTable};
use goldmerge_recon::stopwords::StopWordSet;
use goldmerge_recon::{ErrorKind, ReconError};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_sources(config: &MergeConfig) -> Vec<SourceTable> {
    config
        .sources
        .iter()
        .map(|s| load_csv_source(&s.name, &read_fixture(&s.file)).unwrap())
        .collect()
}

fn load_and_run(config_toml: &str) -> Result<GoldenResult, ReconError> {
    let config = MergeConfig::from_toml(config_toml)?;
    let stop_words = match &config.stop_words {
        Some(file) => StopWordSet::from_json(&read_fixture(file))?,
        None => StopWordSet::empty(),
    };
    run(&config, &load_sources(&config), &stop_words)
}

fn first_values(result: &GoldenResult) -> Vec<Option<String>> {
    result
        .golden
        .records()
        .iter()
        .map(|r| r.values[0].clone())
        .collect()
}

// -------------------------------------------------------------------------
// Fixture runs
// -------------------------------------------------------------------------

#[test]
fn colleges_three_sources() {
    let result = load_and_run(&read_fixture("colleges.merge.toml")).unwrap();

    assert_eq!(
        first_values(&result),
        vec![
            Some("The University of Springfield".to_string()),
            Some("Shelbyville Tech".to_string()),
            Some("Capital City College".to_string()),
            Some("Ogdenville Institute".to_string()),
            Some("North Haverbrook University".to_string()),
            None,
        ]
    );

    assert_eq!(result.meta.name.as_deref(), Some("Colleges"));
    assert_eq!(result.rounds.len(), 2);

    let r1 = &result.rounds[0];
    assert_eq!(r1.source, "data_2");
    assert_eq!(r1.left_records, 3);
    assert_eq!(r1.right_records, 3);
    assert_eq!(r1.linked, 2);
    assert_eq!(r1.novel, 1);
    assert_eq!(r1.unabsorbed, 0);

    let r2 = &result.rounds[1];
    assert_eq!(r2.source, "data_3");
    assert_eq!(r2.left_records, 4);
    assert_eq!(r2.linked, 2);
    assert_eq!(r2.novel, 2);
    assert_eq!(r2.missing_key, 1);

    assert_eq!(result.summary.sources, 3);
    assert_eq!(result.summary.input_records, 12);
    assert_eq!(result.summary.golden_records, 6);
    assert_eq!(
        result.warnings,
        vec![DataQualityWarning::MissingKeyValue {
            source: "data_3".into(),
            row: 4,
            field: "name".into(),
        }]
    );
}

#[test]
fn strict_threshold_keeps_typos_apart() {
    let toml = read_fixture("colleges.merge.toml").replace("threshold = 80", "threshold = 100");
    let result = load_and_run(&toml).unwrap();
    assert_eq!(result.golden.len(), 8);
    let names = first_values(&result);
    assert!(names.contains(&Some("Shelbyvile Tech".to_string())));
    assert!(names.contains(&Some("Capitol City College".to_string())));
    // Same normalized key still links at 100.
    assert!(!names.contains(&Some("University of Springfield.".to_string())));
    assert!(!names.contains(&Some("OGDENVILLE INSTITUTE".to_string())));
}

#[test]
fn golden_csv_output_has_key_columns_only() {
    let result = load_and_run(&read_fixture("colleges.merge.toml")).unwrap();
    let csv = write_csv(&result.golden).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("name"));
    assert_eq!(lines.next(), Some("The University of Springfield"));
    assert_eq!(csv.lines().count(), 7);
    assert!(!csv.contains("enrollment"));
}

#[test]
fn report_serializes_to_json() {
    let result = load_and_run(&read_fixture("colleges.merge.toml")).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["key"], serde_json::json!(["name"]));
    assert_eq!(json["meta"]["threshold"], 80);
    assert_eq!(json["summary"]["golden_records"], 6);
    assert_eq!(json["golden"]["records"][5], serde_json::json!([null]));
    assert_eq!(json["warnings"][0]["kind"], "missing_key_value");
    assert_eq!(json["rounds"][0]["links"][0]["score"], 100);
}

#[test]
fn key_column_missing_from_later_source() {
    let toml = read_fixture("colleges.merge.toml").replace("key = [\"name\"]", "key = [\"name\", \"state\"]");
    let err = load_and_run(&toml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.to_string().contains("data_2"));
    assert!(err.to_string().contains("state"));
}

#[test]
fn malformed_stop_words_is_configuration_error() {
    let err = StopWordSet::from_json(r#"{"word": []}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn config_cases() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn arb_name() -> impl Strategy<Value = String> {
    // Small alphabet so near-duplicates are common.
    prop_oneof![
        r"[ab]{1,4}",
        r"[ab]{1,3} [ab.]{1,3}",
        Just(String::new()),
    ]
}

fn arb_sources() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(proptest::collection::vec(arb_name(), 0..8), 1..5)
}

fn to_tables(sources: &[Vec<String>]) -> Vec<SourceTable> {
    sources
        .iter()
        .enumerate()
        .map(|(i, names)| {
            SourceTable::new(
                format!("s{i}"),
                vec!["name".into()],
                names.iter().map(|n| vec![n.clone()]).collect(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(config_cases())]

    #[test]
    fn golden_never_has_duplicate_keys(sources in arb_sources(), threshold in 0u8..=100, limit in 1usize..3) {
        let key = KeySpec::new(["name"]).unwrap();
        let result = merge(&to_tables(&sources), &key, MergeParams { threshold, limit }, &StopWordSet::empty()).unwrap();
        let unique: HashSet<&Record> = result.golden.records().iter().collect();
        prop_assert_eq!(unique.len(), result.golden.len());
    }

    #[test]
    fn first_source_entities_survive(sources in arb_sources(), threshold in 0u8..=100) {
        let key = KeySpec::new(["name"]).unwrap();
        let tables = to_tables(&sources);
        let result = merge(&tables, &key, MergeParams { threshold, limit: 1 }, &StopWordSet::empty()).unwrap();
        let first = tables[0].project(&key).unwrap();
        for record in &first.records {
            prop_assert!(result.golden.contains(record), "lost {record}");
        }
    }

    #[test]
    fn golden_records_come_from_inputs(sources in arb_sources()) {
        let key = KeySpec::new(["name"]).unwrap();
        let tables = to_tables(&sources);
        let result = merge(&tables, &key, MergeParams::default(), &StopWordSet::empty()).unwrap();
        let inputs: HashSet<Record> = tables
            .iter()
            .flat_map(|t| t.project(&key).unwrap().records)
            .collect();
        for record in result.golden.records() {
            prop_assert!(inputs.contains(record));
        }
    }
}
