// File I/O: BOM exports and structure reports in, result workbooks out

pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::Path;

use bomcheck_recon::config::AuthorityConfig;
use bomcheck_recon::model::{NamedTable, Table};

pub use error::IoError;

/// Supported input formats, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Excel,
    Csv,
}

impl InputFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Excel),
            "csv" | "txt" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Load one per-assembly BOM export. The table is named after the file
/// (not the full path), which drives the source id.
pub fn load_bom(path: &Path) -> Result<NamedTable, IoError> {
    let table = match InputFormat::from_extension(path) {
        Some(InputFormat::Excel) => xlsx::import_first_sheet(path)?,
        Some(InputFormat::Csv) => csv::import(path)?,
        None => return Err(IoError::UnsupportedFormat { path: path.to_path_buf() }),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::debug!("loaded {}: {} row(s), {} column(s)", name, table.len(), table.columns.len());
    Ok(NamedTable::new(name, table))
}

/// Load the OEM structure report sheet with its configured header offset.
pub fn load_authority(path: &Path, config: &AuthorityConfig) -> Result<Table, IoError> {
    match InputFormat::from_extension(path) {
        Some(InputFormat::Excel) => xlsx::import_sheet(path, &config.sheet, config.header_row),
        _ => Err(IoError::UnsupportedFormat { path: path.to_path_buf() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats() {
        assert_eq!(InputFormat::from_extension(Path::new("a/B_1.XLSX")), Some(InputFormat::Excel));
        assert_eq!(InputFormat::from_extension(Path::new("b.xlsm")), Some(InputFormat::Excel));
        assert_eq!(InputFormat::from_extension(Path::new("c.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_extension(Path::new("d.pdf")), None);
        assert_eq!(InputFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn bom_is_named_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GA_ENGINE_01.csv");
        std::fs::write(&path, "DGLVL,OJTXP\n.1,Engine\n").unwrap();
        let bom = load_bom(&path).unwrap();
        assert_eq!(bom.name, "GA_ENGINE_01.csv");
        assert_eq!(bom.table.len(), 1);
    }

    #[test]
    fn unsupported_authority_format() {
        let err = load_authority(Path::new("report.csv"), &AuthorityConfig::default()).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }
}
