use crate::matcher::Extracted;
use crate::model::{AuthorityRecord, ReconSummary, ReconciledRecord, ReferenceRecord, ValidationStatus};

/// Compute summary statistics from the join inputs and the classified rows.
pub fn compute_summary(
    reference: &Extracted<ReferenceRecord>,
    authority: &Extracted<AuthorityRecord>,
    records: &[ReconciledRecord],
    missing_reference_columns: Vec<String>,
) -> ReconSummary {
    let mut summary = ReconSummary {
        reference_rows_in: reference.rows_in,
        reference_blank_keys: reference.blank_keys,
        reference_duplicates: reference.duplicates,
        authority_rows_in: authority.rows_in,
        authority_blank_keys: authority.blank_keys,
        authority_duplicates: authority.duplicates,
        output_rows: records.len(),
        missing_reference_columns,
        ..Default::default()
    };

    for r in records {
        if r.authority.is_some() {
            summary.matched += 1;
        } else {
            summary.unmatched += 1;
        }
        if r.validation_status == ValidationStatus::MissingBmw {
            summary.missing_bmw += 1;
        }
        if r.part_comparison.is_mismatch() {
            summary.part_mismatches += 1;
        }
        if r.ai_comparison.is_mismatch() {
            summary.ai_mismatches += 1;
        }
    }

    summary
}
