use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {}: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("{}: no sheet named '{sheet}' (found: {})", path.display(), available.join(", "))]
    SheetNotFound { path: PathBuf, sheet: String, available: Vec<String> },
    #[error("{}: sheet '{sheet}' has no header at row {row}", path.display())]
    HeaderRowMissing { path: PathBuf, sheet: String, row: u32 },
    #[error("{}: {message}", path.display())]
    Csv { path: PathBuf, message: String },
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("{}: unsupported file type (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)", path.display())]
    UnsupportedFormat { path: PathBuf },
}
