use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

pub mod delimited;
pub mod table;
pub mod workbook;

pub use table::{CellValue, Column, Table};

use delimited::{is_gz, read_delimited};
use workbook::read_workbook;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Tsv,
    Csv,
    Workbook,
}

pub fn detect_format(path: &Path) -> Result<TableFormat, InputError> {
    let gz = is_gz(path);
    let inner = if gz {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    let ext = inner
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let format = match ext.as_str() {
        "tsv" | "txt" | "tab" => TableFormat::Tsv,
        "csv" => TableFormat::Csv,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => TableFormat::Workbook,
        _ => {
            return Err(InputError::InvalidInput(format!(
                "unsupported table format: {}",
                path.display()
            )));
        }
    };
    if gz && format == TableFormat::Workbook {
        return Err(InputError::InvalidInput(format!(
            "compressed workbooks are not supported: {}",
            path.display()
        )));
    }
    Ok(format)
}

pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingInput(path.display().to_string()));
    }
    let format = detect_format(path)?;
    if sheet.is_some() && format != TableFormat::Workbook {
        warn!(
            "sheet selector ignored for delimited file {}",
            path.display()
        );
    }

    let table = match format {
        TableFormat::Tsv => read_delimited(path, b'\t')?,
        TableFormat::Csv => read_delimited(path, b',')?,
        TableFormat::Workbook => read_workbook(path, sheet)?,
    };

    info!(
        "loaded table {}: {} columns x {} rows",
        path.display(),
        table.n_columns(),
        table.n_rows()
    );
    Ok(table)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
