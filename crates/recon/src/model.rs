use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// A single spreadsheet cell. `None` is a null (empty) cell.
pub type Cell = Option<String>;

/// True for null cells and cells holding only whitespace.
pub fn is_blank(cell: &Cell) -> bool {
    cell.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Make header names unique: a repeated `Qty` becomes `Qty.1`, `Qty.2`, ...
/// skipping any suffixed name the header already uses.
pub fn dedupe_headers(columns: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(columns.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .map(|name| {
            if taken.insert(name.clone()) {
                return name;
            }
            let n = suffixes.entry(name.clone()).or_insert(0);
            loop {
                *n += 1;
                let candidate = format!("{}.{}", name, n);
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Header + rows, every row exactly `columns.len()` cells wide.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build a table, padding short rows with nulls and cutting long ones.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column lookup ignoring surrounding whitespace on both sides.
    pub fn position_trimmed(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.columns.iter().position(|c| c.trim() == name)
    }

    /// First column whose lowercased name is in `aliases` (compared lowercased).
    pub fn position_any_ci(&self, aliases: &[String]) -> Option<usize> {
        self.columns.iter().position(|c| {
            let lower = c.to_lowercase();
            aliases.iter().any(|a| a.to_lowercase() == lower)
        })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// One per-source input: the uploaded file name plus its first sheet.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self { name: name.into(), table }
    }
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

/// A source left out of consolidation because an aliased column was not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub name: String,
    /// Canonical names of the fields that could not be located.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    pub sources_total: usize,
    pub sources_used: usize,
    pub skipped: Vec<SkippedSource>,
    pub rows: usize,
}

/// All usable sources stacked into one table.
///
/// Column 0 is the source id, column 1 the group label, followed by the
/// union of every source's columns in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedTable {
    pub table: Table,
    pub report: ConsolidationReport,
}

impl ConsolidatedTable {
    pub const SOURCE_COL: usize = 0;
    pub const GROUP_COL: usize = 1;

    pub fn source_id(&self, row: usize) -> Option<&str> {
        self.table.cell(row, Self::SOURCE_COL)
    }

    pub fn group_label(&self, row: usize) -> Option<&str> {
        self.table.cell(row, Self::GROUP_COL)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A row of the OEM structure report, keyed by its normalized third-party number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorityRecord {
    pub key: String,
    pub material: Cell,
    pub part_version: Cell,
}

/// A consolidated BOM row reduced to the validation fields, keyed by its
/// normalized component number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRecord {
    pub key: String,
    pub bmw_part: Cell,
    pub needed_at_bmw: Cell,
    pub ai_index: Cell,
    pub description: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationStatus {
    #[serde(rename = "")]
    Clear,
    #[serde(rename = "Missing BMW")]
    MissingBmw,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "",
            Self::MissingBmw => "Missing BMW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = "")]
    Clear,
    Mismatch,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "",
            Self::Mismatch => "Mismatch",
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub reference: ReferenceRecord,
    pub authority: Option<AuthorityRecord>,
    pub validation_status: ValidationStatus,
    pub part_comparison: Comparison,
    pub ai_comparison: Comparison,
}

/// Header of the result sheet, in output order.
pub const RESULT_COLUMNS: [&str; 11] = [
    "TVS_Part",
    "BMW_Part_TVS",
    "Needed at BMW",
    "TVS_AI",
    "Description",
    "BMW_Part",
    "BMW_TVS_Part",
    "BMW_AI",
    "Validation_Status",
    "Comparison",
    "AI_Comparison",
];

/// Indices of the three flag columns within [`RESULT_COLUMNS`].
pub const FLAG_COLUMNS: [usize; 3] = [8, 9, 10];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciledTable {
    pub records: Vec<ReconciledRecord>,
}

impl ReconciledTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flatten into the result-sheet layout. Empty flags become empty strings,
    /// absent authority fields stay null.
    pub fn to_table(&self) -> Table {
        let columns = RESULT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = self
            .records
            .iter()
            .map(|r| {
                let auth = r.authority.as_ref();
                vec![
                    Some(r.reference.key.clone()),
                    r.reference.bmw_part.clone(),
                    r.reference.needed_at_bmw.clone(),
                    r.reference.ai_index.clone(),
                    r.reference.description.clone(),
                    auth.and_then(|a| a.material.clone()),
                    auth.map(|a| a.key.clone()),
                    auth.and_then(|a| a.part_version.clone()),
                    Some(r.validation_status.as_str().to_string()),
                    Some(r.part_comparison.as_str().to_string()),
                    Some(r.ai_comparison.as_str().to_string()),
                ]
            })
            .collect();
        Table::with_rows(columns, rows)
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Drop counts and flag tallies for one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub reference_rows_in: usize,
    pub reference_blank_keys: usize,
    pub reference_duplicates: usize,
    pub authority_rows_in: usize,
    pub authority_blank_keys: usize,
    pub authority_duplicates: usize,
    pub output_rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub missing_bmw: usize,
    pub part_mismatches: usize,
    pub ai_mismatches: usize,
    /// Validation columns absent from the consolidated BOM, treated as all-null.
    pub missing_reference_columns: Vec<String>,
}

impl ReconSummary {
    pub fn has_discrepancies(&self) -> bool {
        self.missing_bmw > 0 || self.part_mismatches > 0 || self.ai_mismatches > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub consolidation: ConsolidationReport,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub merged: Table,
    #[serde(skip)]
    pub reconciled: ReconciledTable,
}
