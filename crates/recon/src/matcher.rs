use std::collections::{HashMap, HashSet};

use crate::config::{AuthorityConfig, ReferenceConfig};
use crate::error::ReconError;
use crate::model::{is_blank, AuthorityRecord, Cell, ReferenceRecord, Table};
use crate::normalize::KeyNormalizer;

/// Records extracted from one side of the join, plus what was dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub rows_in: usize,
    pub blank_keys: usize,
    pub duplicates: usize,
}

/// Keep the first record per key, in original order. Returns the number dropped.
fn dedup_first<T>(records: &mut Vec<T>, key: impl Fn(&T) -> &str) -> usize {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    records.retain(|r| seen.insert(key(r).to_string()));
    before - records.len()
}

fn pick(row: &[Cell], col: Option<usize>) -> Cell {
    col.and_then(|c| row.get(c).cloned().flatten())
}

/// Select the material / third-party / part-version columns from the structure
/// report, drop rows without a third-party number, normalize and deduplicate.
///
/// The header is matched after trimming whitespace from column names. A
/// missing column is fatal.
pub fn extract_authority(
    table: &Table,
    config: &AuthorityConfig,
    normalizer: &KeyNormalizer,
) -> Result<Extracted<AuthorityRecord>, ReconError> {
    let locate = |name: &str| {
        table
            .position_trimmed(name)
            .ok_or_else(|| ReconError::MalformedAuthority { column: name.trim().to_string() })
    };
    let material = locate(&config.material)?;
    let third_party = locate(&config.third_party)?;
    let part_version = locate(&config.part_version)?;

    let mut blank_keys = 0;
    let mut records = Vec::with_capacity(table.len());
    for row in &table.rows {
        if is_blank(&row[third_party]) {
            blank_keys += 1;
            continue;
        }
        records.push(AuthorityRecord {
            key: normalizer.normalize(row[third_party].as_deref()),
            material: row[material].clone(),
            part_version: row[part_version].clone(),
        });
    }
    let duplicates = dedup_first(&mut records, |r| &r.key);

    log::debug!(
        "authority: {} row(s), {} without part number, {} duplicate key(s)",
        table.len(),
        blank_keys,
        duplicates
    );
    Ok(Extracted { records, rows_in: table.len(), blank_keys, duplicates })
}

/// Select the validation columns from the consolidated BOM. Absent columns
/// read as null and are reported by name; rows without a component number are
/// dropped.
pub fn extract_reference(
    table: &Table,
    config: &ReferenceConfig,
    normalizer: &KeyNormalizer,
) -> (Extracted<ReferenceRecord>, Vec<String>) {
    let mut missing = Vec::new();
    let mut locate = |name: &str| {
        let col = table.position_trimmed(name);
        if col.is_none() {
            missing.push(name.trim().to_string());
        }
        col
    };
    let component = locate(&config.component);
    let bmw_part = locate(&config.bmw_part);
    let needed = locate(&config.needed);
    let ai_index = locate(&config.ai_index);
    let description = locate(&config.description);

    if !missing.is_empty() {
        log::warn!("consolidated BOM has no column(s): {}", missing.join(", "));
    }

    let mut blank_keys = 0;
    let mut records = Vec::with_capacity(table.len());
    for row in &table.rows {
        let raw = pick(row, component);
        if is_blank(&raw) {
            blank_keys += 1;
            continue;
        }
        records.push(ReferenceRecord {
            key: normalizer.normalize(raw.as_deref()),
            bmw_part: pick(row, bmw_part),
            needed_at_bmw: pick(row, needed),
            ai_index: pick(row, ai_index),
            description: pick(row, description),
        });
    }
    let duplicates = dedup_first(&mut records, |r| &r.key);

    log::debug!(
        "reference: {} row(s), {} without component, {} duplicate key(s)",
        table.len(),
        blank_keys,
        duplicates
    );
    (
        Extracted { records, rows_in: table.len(), blank_keys, duplicates },
        missing,
    )
}

/// Left join: every reference record exactly once, in order, with the
/// authority record sharing its key (if any).
pub fn left_join(
    reference: Vec<ReferenceRecord>,
    authority: &[AuthorityRecord],
) -> Vec<(ReferenceRecord, Option<AuthorityRecord>)> {
    let index: HashMap<&str, &AuthorityRecord> =
        authority.iter().map(|a| (a.key.as_str(), a)).collect();
    reference
        .into_iter()
        .map(|r| {
            let matched = index.get(r.key.as_str()).map(|a| (*a).clone());
            (r, matched)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
        Table::with_rows(
            columns.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        )
    }

    fn authority_table(rows: &[&[Option<&str>]]) -> Table {
        table(&[" Material", "3rd Party Company No. ", "part version (AI)", "Other"], rows)
    }

    #[test]
    fn authority_drops_blank_and_duplicate_keys() {
        let t = authority_table(&[
            &[Some("100"), Some("(R1) p1-a"), Some("A1"), None],
            &[Some("101"), None, Some("A2"), None],
            &[Some("102"), Some(" "), Some("A3"), None],
            &[Some("103"), Some("P1_B"), Some("A4"), None],
            &[Some("104"), Some("P2"), None, None],
        ]);
        let out = extract_authority(&t, &AuthorityConfig::default(), &KeyNormalizer::new()).unwrap();
        assert_eq!(out.rows_in, 5);
        assert_eq!(out.blank_keys, 2);
        assert_eq!(out.duplicates, 1);
        let keys: Vec<&str> = out.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["P1", "P2"]);
        assert_eq!(out.records[0].material.as_deref(), Some("100"));
    }

    #[test]
    fn authority_missing_column_is_fatal() {
        let t = table(&["Material", "part version (AI)"], &[]);
        let err = extract_authority(&t, &AuthorityConfig::default(), &KeyNormalizer::new()).unwrap_err();
        match err {
            ReconError::MalformedAuthority { column } => assert_eq!(column, "3rd Party Company No."),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reference_tolerates_missing_columns() {
        let t = table(&["Component", "Description"], &[&[Some("x-1"), Some("Bolt")]]);
        let (out, missing) = extract_reference(&t, &ReferenceConfig::default(), &KeyNormalizer::new());
        assert_eq!(missing, vec!["BMW part no.", "Part No. needed at BMW", "BMW AI index"]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].key, "X");
        assert_eq!(out.records[0].bmw_part, None);
        assert_eq!(out.records[0].description.as_deref(), Some("Bolt"));
    }

    #[test]
    fn reference_without_component_column_is_empty() {
        let t = table(&["Description"], &[&[Some("Bolt")]]);
        let (out, missing) = extract_reference(&t, &ReferenceConfig::default(), &KeyNormalizer::new());
        assert!(missing.contains(&"Component".to_string()));
        assert!(out.records.is_empty());
        assert_eq!(out.blank_keys, 1);
    }

    #[test]
    fn reference_keeps_first_duplicate() {
        let t = table(
            &["Component", "BMW part no."],
            &[&[Some("p1"), Some("first")], &[Some("P1-2"), Some("second")], &[Some("P3"), None]],
        );
        let (out, _) = extract_reference(&t, &ReferenceConfig::default(), &KeyNormalizer::new());
        assert_eq!(out.duplicates, 1);
        assert_eq!(out.records[0].bmw_part.as_deref(), Some("first"));
        assert_eq!(out.records[1].key, "P3");
    }

    #[test]
    fn left_join_preserves_order_and_totality() {
        let reference = vec!["C", "A", "B"]
            .into_iter()
            .map(|k| ReferenceRecord {
                key: k.into(),
                bmw_part: None,
                needed_at_bmw: None,
                ai_index: None,
                description: None,
            })
            .collect();
        let authority = vec![AuthorityRecord { key: "A".into(), material: Some("9".into()), part_version: None }];
        let joined = left_join(reference, &authority);
        let keys: Vec<&str> = joined.iter().map(|(r, _)| r.key.as_str()).collect();
        assert_eq!(keys, vec!["C", "A", "B"]);
        assert!(joined[0].1.is_none());
        assert_eq!(joined[1].1.as_ref().unwrap().material.as_deref(), Some("9"));
        assert!(joined[2].1.is_none());
    }
}
