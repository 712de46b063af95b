use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::input::InputError;
use crate::input::table::{CellValue, Table, column_name};

pub fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>, InputError> {
    let file = File::open(path)?;
    if is_gz(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads a header-first delimited file. Ragged rows are padded with blanks;
/// fields beyond the header width are ignored.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, InputError> {
    let reader = open_maybe_gz(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| InputError::Parse(format!("{}: {e}", path.display())))?
        .iter()
        .enumerate()
        .map(|(idx, raw)| column_name(raw, idx))
        .collect();
    if header.is_empty() {
        return Err(InputError::Parse(format!(
            "{}: header line is empty",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for (line_no, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            InputError::Parse(format!("{}: record {}: {e}", path.display(), line_no + 1))
        })?;
        if record.len() > header.len() {
            debug!(
                "record {} of {} has {} fields, header has {}",
                line_no + 1,
                path.display(),
                record.len(),
                header.len()
            );
        }
        rows.push(record.iter().map(CellValue::parse).collect());
    }

    Ok(Table::from_rows(header, rows))
}
