use crate::classify::classify;
use crate::config::{AuthorityConfig, ReconConfig, ReferenceConfig};
use crate::consolidate::consolidate;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::matcher::{extract_authority, extract_reference, left_join};
use crate::model::{
    ConsolidatedTable, NamedTable, ReconMeta, ReconResult, ReconSummary, ReconciledTable, Table,
};
use crate::normalize::KeyNormalizer;

/// Reconcile the consolidated BOM (left) against the structure report (right).
///
/// Every deduplicated BOM part appears exactly once in the result, in BOM order.
pub fn reconcile(
    authority: &Table,
    reference: &ConsolidatedTable,
    authority_config: &AuthorityConfig,
    reference_config: &ReferenceConfig,
) -> Result<(ReconciledTable, ReconSummary), ReconError> {
    let normalizer = KeyNormalizer::new();

    let auth = extract_authority(authority, authority_config, &normalizer)?;
    let (refs, missing_columns) = extract_reference(&reference.table, reference_config, &normalizer);

    let records: Vec<_> = left_join(refs.records.clone(), &auth.records)
        .into_iter()
        .map(|(r, a)| classify(r, a))
        .collect();

    let summary = compute_summary(&refs, &auth, &records, missing_columns);
    log::info!(
        "reconciled {} part(s): {} matched, {} missing at BMW, {} part mismatch(es), {} AI mismatch(es)",
        summary.output_rows,
        summary.matched,
        summary.missing_bmw,
        summary.part_mismatches,
        summary.ai_mismatches,
    );

    Ok((ReconciledTable { records }, summary))
}

/// Package a finished reconciliation with its consolidation report.
pub fn assemble(consolidated: ConsolidatedTable, reconciled: ReconciledTable, summary: ReconSummary) -> ReconResult {
    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Local::now().to_rfc3339(),
        },
        consolidation: consolidated.report,
        summary,
        merged: consolidated.table,
        reconciled,
    }
}

/// Run the whole pipeline: consolidate the BOM exports, then reconcile the
/// result against the structure report. Fails before reconciliation when no
/// BOM rows survive consolidation.
pub fn run(config: &ReconConfig, sources: &[NamedTable], authority: &Table) -> Result<ReconResult, ReconError> {
    let consolidated = consolidate(sources, &config.bom)?;
    let (reconciled, summary) = reconcile(authority, &consolidated, &config.authority, &config.reference)?;
    Ok(assemble(consolidated, reconciled, summary))
}
