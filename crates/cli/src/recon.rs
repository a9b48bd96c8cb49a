//! `goldmerge run | merge | validate`: golden-source merging over CSV files.

use std::path::{Path, PathBuf};

use goldmerge_recon::config::{MergeConfig, MergeParams};
use goldmerge_recon::source::{load_csv_source, write_csv, SourceTable};
use goldmerge_recon::{GoldenResult, KeySpec, ReconError, StopWordSet};

use crate::exit_codes::{recon_exit_code, EXIT_INPUT, EXIT_USAGE};
use crate::CliError;

fn recon_err(err: ReconError) -> CliError {
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint: None }
}

fn input_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INPUT, message: msg.into(), hint: None }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| input_err(format!("cannot read {}: {e}", path.display())))
}

/// Write every output or none: on failure, files already written by this
/// call are removed again.
fn write_files(files: &[(PathBuf, &str)]) -> Result<(), CliError> {
    for (i, (path, contents)) in files.iter().enumerate() {
        if let Err(e) = std::fs::write(path, contents) {
            for (written, _) in &files[..i] {
                if let Err(rm) = std::fs::remove_file(written) {
                    log::warn!("cannot remove partial output {}: {rm}", written.display());
                }
            }
            return Err(input_err(format!("cannot write {}: {e}", path.display())));
        }
    }
    for (path, _) in files {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

/// Load the stop-word resource. Any failure here is a configuration error.
fn load_stop_words(path: Option<&Path>) -> Result<StopWordSet, CliError> {
    let Some(path) = path else {
        log::info!("no stop-word resource configured; normalizing without stop words");
        return Ok(StopWordSet::empty());
    };
    let data = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read stop words {}: {e}", path.display()),
        hint: Some("expected a JSON file shaped like {\"words\": [\"the\", ...]}".into()),
    })?;
    let set = StopWordSet::from_json(&data).map_err(recon_err)?;
    log::info!("loaded {} stop word(s) from {}", set.len(), path.display());
    Ok(set)
}

fn load_source(name: &str, path: &Path) -> Result<SourceTable, CliError> {
    let data = read_file(path)?;
    load_csv_source(name, &data).map_err(recon_err)
}

fn print_summary(label: &str, result: &GoldenResult) {
    let s = &result.summary;
    eprintln!(
        "{label}: {} source(s), {} input record(s) -> {} golden ({} linked, {} novel, {} unabsorbed, {} warning(s))",
        s.sources, s.input_records, s.golden_records, s.linked, s.novel, s.unabsorbed, s.warnings,
    );
}

fn report_json(result: &GoldenResult) -> Result<String, CliError> {
    serde_json::to_string_pretty(result)
        .map_err(|e| input_err(format!("JSON serialization error: {e}")))
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config_str = read_file(&config_path)?;
    let config = MergeConfig::from_toml(&config_str).map_err(recon_err)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let stop_words_path = config.stop_words.as_ref().map(|p| base_dir.join(p));
    let stop_words = load_stop_words(stop_words_path.as_deref())?;

    let mut sources = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        sources.push(load_source(&source.name, &base_dir.join(&source.file))?);
    }

    let result = goldmerge_recon::run(&config, &sources, &stop_words).map_err(recon_err)?;

    // Both outputs are rendered before either is written.
    let csv = write_csv(&result.golden).map_err(recon_err)?;
    let report_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    let json_str = if json_output || report_path.is_some() {
        Some(report_json(&result)?)
    } else {
        None
    };

    let mut files = Vec::new();
    if let Some(ref path) = config.output.csv {
        files.push((base_dir.join(path), csv.as_str()));
    }
    if let (Some(path), Some(json_str)) = (&report_path, &json_str) {
        files.push((path.clone(), json_str.as_str()));
    }
    write_files(&files)?;

    if config.output.csv.is_none() && !json_output {
        print!("{csv}");
    }
    if let (true, Some(json_str)) = (json_output, &json_str) {
        println!("{json_str}");
    }

    if !quiet {
        print_summary(&config.name, &result);
    }
    Ok(())
}

// ============================================================================
// merge (ad-hoc, no config file)
// ============================================================================

pub struct MergeArgs {
    pub files: Vec<PathBuf>,
    pub key: Vec<String>,
    pub threshold: u8,
    pub limit: usize,
    pub stop_words: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub quiet: bool,
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let key = KeySpec::new(args.key).map_err(recon_err)?;
    let params = MergeParams { threshold: args.threshold, limit: args.limit };
    params.validate().map_err(recon_err)?;
    if args.files.is_empty() {
        return Err(recon_err(ReconError::EmptySources));
    }

    let stop_words = load_stop_words(args.stop_words.as_deref())?;

    let mut sources = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        sources.push(load_source(&name, path)?);
    }

    let result = goldmerge_recon::merge(&sources, &key, params, &stop_words).map_err(recon_err)?;

    let csv = write_csv(&result.golden).map_err(recon_err)?;
    let json_str = match args.report {
        Some(_) => Some(report_json(&result)?),
        None => None,
    };

    let mut files = Vec::new();
    if let Some(ref path) = args.output {
        files.push((path.clone(), csv.as_str()));
    }
    if let (Some(path), Some(json_str)) = (&args.report, &json_str) {
        files.push((path.clone(), json_str.as_str()));
    }
    write_files(&files)?;

    if args.output.is_none() {
        print!("{csv}");
    }

    if !args.quiet {
        print_summary("merge", &result);
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = read_file(&config_path)?;
    let config = MergeConfig::from_toml(&config_str).map_err(recon_err)?;
    eprintln!(
        "valid: '{}' keyed on [{}] with {} source(s), threshold {}, limit {}",
        config.name,
        config.key.join(", "),
        config.sources.len(),
        config.threshold,
        config.limit,
    );
    Ok(())
}
