use crate::config::BomConfig;
use crate::error::ReconError;
use crate::model::{
    dedupe_headers, Cell, ConsolidatedTable, ConsolidationReport, NamedTable, SkippedSource, Table,
};

/// Canonical field names used in skip diagnostics.
pub const LEVEL_FIELD: &str = "LevelCode";
pub const DESCRIPTION_FIELD: &str = "Description";

/// `ABC_BOM_01.xlsx` → `ABC_BOM`. Without an underscore the whole stem is kept.
pub fn source_id(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    };
    match stem.rfind('_') {
        Some(cut) => stem[..cut].to_string(),
        None => stem.to_string(),
    }
}

/// Forward-fill the group label: a sentinel row opens a group named by its
/// description; every other row inherits the label of the nearest preceding
/// sentinel row (or null before the first one).
pub fn group_labels(table: &Table, level_col: usize, desc_col: usize, sentinel: &str) -> Vec<Cell> {
    let mut current: Cell = None;
    table
        .rows
        .iter()
        .map(|row| {
            let level = row[level_col].as_deref().map(str::trim).unwrap_or("");
            if level == sentinel {
                current = row[desc_col].clone();
            }
            current.clone()
        })
        .collect()
}

/// Stack every usable source into one table, tagging rows with their source id
/// and group label. Sources missing an aliased column are skipped and recorded.
pub fn consolidate(sources: &[NamedTable], config: &BomConfig) -> Result<ConsolidatedTable, ReconError> {
    let sentinel = config.top_level_sentinel.trim();
    let mut report = ConsolidationReport {
        sources_total: sources.len(),
        ..Default::default()
    };

    let mut columns: Vec<String> = vec![config.source_column.clone(), config.group_column.clone()];
    let mut parts: Vec<(&NamedTable, String, Vec<Cell>, Vec<usize>, usize)> = Vec::new();

    for source in sources {
        let level_col = source.table.position_any_ci(&config.level_aliases);
        let desc_col = source.table.position_any_ci(&config.description_aliases);

        let (level_col, desc_col) = match (level_col, desc_col) {
            (Some(l), Some(d)) => (l, d),
            (l, d) => {
                let mut missing = Vec::new();
                if l.is_none() {
                    missing.push(LEVEL_FIELD.to_string());
                }
                if d.is_none() {
                    missing.push(DESCRIPTION_FIELD.to_string());
                }
                log::warn!("skipping BOM '{}': no {} column", source.name, missing.join(" or "));
                report.skipped.push(SkippedSource { name: source.name.clone(), missing });
                continue;
            }
        };

        // Map this source's columns into the union header (first-seen order).
        // Repeated names within one source keep separate columns.
        let mapping: Vec<usize> = dedupe_headers(source.table.columns.clone())
            .into_iter()
            .map(|name| match columns.iter().skip(2).position(|c| *c == name) {
                Some(i) => i + 2,
                None => {
                    columns.push(name);
                    columns.len() - 1
                }
            })
            .collect();

        let labels = group_labels(&source.table, level_col, desc_col, sentinel);
        log::debug!(
            "BOM '{}': {} rows, level column '{}', description column '{}'",
            source.name,
            source.table.len(),
            source.table.columns[level_col],
            source.table.columns[desc_col],
        );
        parts.push((source, source_id(&source.name), labels, mapping, level_col));
        report.sources_used += 1;
    }

    let mut table = Table::new(columns);
    for (source, id, labels, mapping, level_col) in parts {
        for (row, label) in source.table.rows.iter().zip(labels) {
            let mut out: Vec<Cell> = vec![None; table.columns.len()];
            out[ConsolidatedTable::SOURCE_COL] = Some(id.clone());
            out[ConsolidatedTable::GROUP_COL] = label;
            for (col, (value, &target)) in row.iter().zip(&mapping).enumerate() {
                out[target] = if col == level_col {
                    value.as_deref().map(|v| v.trim().to_string())
                } else {
                    value.clone()
                };
            }
            table.push_row(out);
        }
    }

    report.rows = table.len();
    if table.is_empty() {
        return Err(ReconError::EmptyInput {
            sources: report.sources_total,
            skipped: report.skipped.len(),
        });
    }

    log::info!(
        "consolidated {} row(s) from {}/{} BOM file(s)",
        report.rows,
        report.sources_used,
        report.sources_total
    );
    Ok(ConsolidatedTable { table, report })
}
