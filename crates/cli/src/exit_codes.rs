//! CLI Exit Code Registry
//!
//! Single source of truth for `bomcheck` exit codes. Scripts and CI jobs
//! branch on these, so existing values never change meaning.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage error, including missing required input files      |
//! | 3    | No BOM rows survived consolidation                       |
//! | 4    | Structure report unusable (sheet, header or column)      |
//! | 5    | File could not be read or written                        |
//! | 6    | Invalid configuration                                    |
//! | 7    | Discrepancies found (only with `--fail-on-mismatch`)     |

use bomcheck_io::IoError;
use bomcheck_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, or `--bom` / `--authority` not supplied.
pub const EXIT_USAGE: u8 = 2;

/// Every BOM source was skipped or empty.
pub const EXIT_EMPTY_INPUT: u8 = 3;

/// Structure report sheet missing, header row missing, or a required column absent.
pub const EXIT_MALFORMED_AUTHORITY: u8 = 4;

/// Read or write failure on an input or output file.
pub const EXIT_IO: u8 = 5;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 6;

/// Reconciliation raised at least one flag and `--fail-on-mismatch` was set.
pub const EXIT_DISCREPANCIES: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::EmptyInput { .. } => EXIT_EMPTY_INPUT,
        ReconError::MalformedAuthority { .. } => EXIT_MALFORMED_AUTHORITY,
    }
}

/// Map a file IO error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::SheetNotFound { .. } | IoError::HeaderRowMissing { .. } => EXIT_MALFORMED_AUTHORITY,
        IoError::UnsupportedFormat { .. } => EXIT_USAGE,
        IoError::Open { .. } | IoError::Csv { .. } | IoError::Write { .. } => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_unique() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_EMPTY_INPUT,
            EXIT_MALFORMED_AUTHORITY,
            EXIT_IO,
            EXIT_CONFIG,
            EXIT_DISCREPANCIES,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in codes {
            assert!(seen.insert(code), "duplicate exit code {}", code);
        }
    }

    #[test]
    fn engine_errors_map() {
        assert_eq!(recon_exit_code(&ReconError::EmptyInput { sources: 2, skipped: 2 }), EXIT_EMPTY_INPUT);
        assert_eq!(
            recon_exit_code(&ReconError::MalformedAuthority { column: "Material".into() }),
            EXIT_MALFORMED_AUTHORITY
        );
        assert_eq!(recon_exit_code(&ReconError::ConfigValidation("x".into())), EXIT_CONFIG);
    }

    #[test]
    fn io_errors_map() {
        let missing_sheet = IoError::SheetNotFound {
            path: PathBuf::from("report.xlsx"),
            sheet: "Structure Report".into(),
            available: vec!["Sheet1".into()],
        };
        assert_eq!(io_exit_code(&missing_sheet), EXIT_MALFORMED_AUTHORITY);
        let open = IoError::Open { path: PathBuf::from("a.xlsx"), message: "nope".into() };
        assert_eq!(io_exit_code(&open), EXIT_IO);
    }
}
