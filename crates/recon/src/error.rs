use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty alias set, zero header row, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Consolidation produced no rows: every source was skipped, or none were given.
    #[error("no BOM rows to reconcile: {sources} source(s) supplied, {skipped} skipped")]
    EmptyInput { sources: usize, skipped: usize },
    /// Authority sheet lacks a required column.
    #[error("authority table: missing column '{column}'")]
    MalformedAuthority { column: String },
}
