// CSV/TSV import for BOM exports saved as delimited text

use std::io::Read;
use std::path::Path;

use bomcheck_recon::model::{dedupe_headers, Cell, Table};

use crate::error::IoError;

/// Read a delimited file: first record is the header, empty fields are null.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter).map_err(|message| IoError::Csv {
        path: path.to_path_buf(),
        message,
    })
}

// SAP-style BOM exports are usually `;` or tab separated
const DELIMITERS: [u8; 4] = [b';', b'\t', b',', b'|'];
const SNIFF_RECORDS: usize = 10;

/// Field count of each of the first few records when split on `delimiter`.
fn record_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

/// Pick the delimiter that splits the header into the most columns, preferring
/// one every sampled record agrees with. Falls back to comma when nothing
/// splits the header.
fn sniff_delimiter(content: &str) -> u8 {
    DELIMITERS
        .iter()
        .rev()
        .filter_map(|&delimiter| {
            let widths = record_widths(content, delimiter);
            let header = *widths.first()?;
            if header < 2 {
                return None;
            }
            let consistent = widths.iter().all(|&w| w == header);
            Some((consistent, header, delimiter))
        })
        .max_by_key(|&(consistent, width, _)| (consistent, width))
        .map_or(b',', |(_, _, delimiter)| delimiter)
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let open_err = |e: std::io::Error| IoError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(open_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(open_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| e.to_string())?,
        None => return Ok(Table::default()),
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(i, name)| crate::xlsx::header_name(name, i))
        .collect();
    let columns = dedupe_headers(columns);

    let mut table = Table::new(columns);
    for record in records {
        let record = record.map_err(|e| e.to_string())?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| if field.is_empty() { None } else { Some(field.to_string()) })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}
