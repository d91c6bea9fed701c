//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::backend::{GenerateResult, Generator, GeneratorConfig, PackageNamespaces};
use crate::ir::Program;

use super::{Cli, CliError, CliResult, ExitCode};

/// Maximum input file size (100 MB)
const MAX_INPUT_SIZE: u64 = 100 * 1024 * 1024;

/// Generate the program named on the command line.
///
/// Exits with failure when generation reported an error-severity diagnostic; the output is still written.
pub fn generate_program(cli: &Cli) -> CliResult<ExitCode> {
    let program: Program = read_json(&cli.program)?;
    let namespaces: PackageNamespaces = match &cli.namespaces {
        Some(path) => read_json(path)?,
        None => PackageNamespaces::new(),
    };
    let mut config: GeneratorConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(class_name) = &cli.class_name {
        config = config.with_class_name(class_name.as_str());
    }

    let result = Generator::new(config)
        .generate(&program, &namespaces)
        .map_err(|e| CliError::failure(format!("{:?}", miette::Report::new(e))))?;

    report(&result);
    match &cli.out_dir {
        Some(dir) => write_files(dir, &result)?,
        None => print_files(&result),
    }

    Ok(if result.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn report(result: &GenerateResult) {
    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }
    for unsupported in &result.unsupported {
        match &unsupported.span {
            Some(span) => eprintln!("unsupported: {} ({span})", unsupported.reason),
            None => eprintln!("unsupported: {}", unsupported.reason),
        }
    }
}

fn print_files(result: &GenerateResult) {
    for source in result.files.values() {
        print!("{}", String::from_utf8_lossy(source));
    }
}

fn write_files(dir: &Path, result: &GenerateResult) -> CliResult<()> {
    validate_output_dir(dir)?;
    fs::create_dir_all(dir)
        .map_err(|e| CliError::failure(format!("Cannot create output directory '{}': {}", dir.display(), e)))?;
    for (name, source) in &result.files {
        let path = dir.join(name);
        fs::write(&path, source).map_err(|e| CliError::failure(format!("Cannot write '{}': {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "wrote generated file");
    }
    Ok(())
}

/// Validate that an output directory path is safe.
///
/// Rejects paths containing `..` components.
fn validate_output_dir(path: &Path) -> CliResult<()> {
    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(CliError::failure(format!(
            "Output directory '{}' contains path traversal (..)",
            path.display()
        )));
    }
    if path.is_absolute() {
        tracing::warn!("Using absolute output path: {}", path.display());
    }
    Ok(())
}

/// Read and deserialize a JSON input file.
///
/// ## Errors
///
/// Returns an error if the file cannot be read, exceeds `MAX_INPUT_SIZE` (100 MB), or is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;
    if metadata.len() > MAX_INPUT_SIZE {
        return Err(CliError::failure(format!(
            "Input file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_INPUT_SIZE
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Cannot read file '{}': {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| CliError::failure(format!("Invalid JSON in '{}': {}", path.display(), e)))
}
