// Pipeline commands: run, merge, normalize

use std::path::{Path, PathBuf};

use bomcheck_io::xlsx::{self, MERGED_SHEET};
use bomcheck_recon::model::{ConsolidationReport, NamedTable, ReconSummary};
use bomcheck_recon::{assemble, consolidate, reconcile, KeyNormalizer};

use crate::exit_codes::{EXIT_DISCREPANCIES, EXIT_USAGE};
use crate::{settings, CliError};

pub const MISSING_INPUT_WARNING: &str = "warning: Please upload all required files";

pub struct RunOptions {
    pub bom: Vec<PathBuf>,
    pub authority: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
    pub fail_on_mismatch: bool,
    pub no_merged_sheet: bool,
}

fn load_boms(paths: &[PathBuf]) -> Result<Vec<NamedTable>, CliError> {
    paths
        .iter()
        .map(|path| bomcheck_io::load_bom(path).map_err(CliError::file))
        .collect()
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(opts: RunOptions) -> Result<(), CliError> {
    // Nothing is read until both inputs are present
    let authority_path = match opts.authority {
        Some(path) if !opts.bom.is_empty() => path,
        _ => {
            eprintln!("{}", MISSING_INPUT_WARNING);
            return Err(CliError { code: EXIT_USAGE, message: String::new(), hint: None });
        }
    };

    let mut config = settings::load(opts.config.as_deref())?;
    if let Some(dir) = &opts.out_dir {
        config.output.dir = dir.display().to_string();
    }
    if opts.no_merged_sheet {
        config.output.include_merged_sheet = false;
    }

    let sources = load_boms(&opts.bom)?;
    let consolidated = consolidate(&sources, &config.bom).map_err(CliError::recon)?;

    let authority = bomcheck_io::load_authority(&authority_path, &config.authority).map_err(CliError::file)?;
    let (reconciled, summary) =
        reconcile(&authority, &consolidated, &config.authority, &config.reference).map_err(CliError::recon)?;
    let result = assemble(consolidated, reconciled, summary);

    let out_dir = PathBuf::from(&config.output.dir);
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {}", out_dir.display(), e)))?;
    let output = out_dir.join(config.output.file_name(chrono::Local::now().naive_local()));

    let merged = config.output.include_merged_sheet.then_some(&result.merged);
    let stats = xlsx::export_result(&result.reconciled.to_table(), merged, &output).map_err(CliError::file)?;
    log::debug!(
        "exported {} sheet(s), {} row(s) in {}ms",
        stats.sheets_exported,
        stats.rows_exported,
        stats.export_duration_ms
    );

    print_consolidation(&result.consolidation);
    print_summary(&result.summary);
    eprintln!("wrote {}", output.display());

    if opts.json {
        print_json(&result, &output)?;
    }

    if opts.fail_on_mismatch && result.summary.has_discrepancies() {
        return Err(CliError {
            code: EXIT_DISCREPANCIES,
            message: format!(
                "{} missing at BMW, {} part mismatch(es), {} AI mismatch(es)",
                result.summary.missing_bmw, result.summary.part_mismatches, result.summary.ai_mismatches
            ),
            hint: Some(format!("see the flag columns in {}", output.display())),
        });
    }
    Ok(())
}

fn print_json(result: &bomcheck_recon::ReconResult, output: &Path) -> Result<(), CliError> {
    let mut doc = serde_json::to_value(result).map_err(|e| CliError::eval(e.to_string()))?;
    if let serde_json::Value::Object(map) = &mut doc {
        map.insert("output".to_string(), serde_json::Value::String(output.display().to_string()));
    }
    let text = serde_json::to_string_pretty(&doc).map_err(|e| CliError::eval(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn print_consolidation(report: &ConsolidationReport) {
    eprintln!(
        "merged {} of {} BOM file(s), {} row(s)",
        report.sources_used, report.sources_total, report.rows
    );
    for skipped in &report.skipped {
        eprintln!("  skipped {}: no {} column", skipped.name, skipped.missing.join(" / "));
    }
}

fn print_summary(summary: &ReconSummary) {
    eprintln!(
        "validated {} part(s): {} matched, {} unmatched",
        summary.output_rows, summary.matched, summary.unmatched
    );
    eprintln!(
        "  {} missing at BMW, {} part mismatch(es), {} AI mismatch(es)",
        summary.missing_bmw, summary.part_mismatches, summary.ai_mismatches
    );
    if !summary.missing_reference_columns.is_empty() {
        eprintln!(
            "  merged BOM has no {} column(s); treated as empty",
            summary.missing_reference_columns.join(", ")
        );
    }
}

// ============================================================================
// merge
// ============================================================================

pub fn cmd_merge(bom: Vec<PathBuf>, output: PathBuf, config: Option<PathBuf>) -> Result<(), CliError> {
    if bom.is_empty() {
        return Err(CliError::args("no BOM files given").with_hint("bomcheck merge --bom GA_1.xlsx --output merged.xlsx"));
    }
    let config = settings::load(config.as_deref())?;
    let sources = load_boms(&bom)?;
    let consolidated = consolidate(&sources, &config.bom).map_err(CliError::recon)?;

    xlsx::export_table(&consolidated.table, MERGED_SHEET, &output).map_err(CliError::file)?;
    print_consolidation(&consolidated.report);
    eprintln!("wrote {}", output.display());
    Ok(())
}

// ============================================================================
// normalize
// ============================================================================

pub fn cmd_normalize(parts: Vec<String>) -> Result<(), CliError> {
    let normalizer = KeyNormalizer::new();
    for part in &parts {
        println!("{}", normalizer.normalize(Some(part.as_str())));
    }
    Ok(())
}
