use crate::model::{AuthorityRecord, Comparison, ReconciledRecord, ReferenceRecord, ValidationStatus};

/// Both sides present and textually different.
fn compare(left: Option<&str>, right: Option<&str>) -> Comparison {
    match (left, right) {
        (Some(l), Some(r)) if l != r => Comparison::Mismatch,
        _ => Comparison::Clear,
    }
}

/// Part flagged as needed at BMW but no structure-report row carries a part number for it.
pub fn validation_status(reference: &ReferenceRecord, authority: Option<&AuthorityRecord>) -> ValidationStatus {
    let needed = reference
        .needed_at_bmw
        .as_deref()
        .is_some_and(|v| v.eq_ignore_ascii_case("YES"));
    let authority_part = authority.and_then(|a| a.material.as_deref());
    if needed && authority_part.is_none() {
        ValidationStatus::MissingBmw
    } else {
        ValidationStatus::Clear
    }
}

pub fn part_comparison(reference: &ReferenceRecord, authority: Option<&AuthorityRecord>) -> Comparison {
    compare(
        reference.bmw_part.as_deref(),
        authority.and_then(|a| a.material.as_deref()),
    )
}

pub fn ai_comparison(reference: &ReferenceRecord, authority: Option<&AuthorityRecord>) -> Comparison {
    compare(
        reference.ai_index.as_deref(),
        authority.and_then(|a| a.part_version.as_deref()),
    )
}

/// Derive all three flags for one joined row. Each depends only on that row.
pub fn classify(reference: ReferenceRecord, authority: Option<AuthorityRecord>) -> ReconciledRecord {
    let auth = authority.as_ref();
    ReconciledRecord {
        validation_status: validation_status(&reference, auth),
        part_comparison: part_comparison(&reference, auth),
        ai_comparison: ai_comparison(&reference, auth),
        reference,
        authority,
    }
}
