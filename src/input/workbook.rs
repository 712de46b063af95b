use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};

use crate::input::InputError;
use crate::input::table::{CellValue, Table, column_name};

/// Loads one worksheet; the first row is the header. Without a sheet name the
/// first sheet is used.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, InputError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| InputError::Parse(format!("{}: {e}", path.display())))?;

    let names: Vec<String> = workbook.sheet_names().to_owned();
    if names.is_empty() {
        return Err(InputError::InvalidInput(format!(
            "{} contains no sheets",
            path.display()
        )));
    }
    let idx = match sheet {
        Some(wanted) => names.iter().position(|n| n == wanted).ok_or_else(|| {
            InputError::MissingInput(format!(
                "sheet '{}' not found in {} (available: {})",
                wanted,
                path.display(),
                names.join(", ")
            ))
        })?,
        None => 0,
    };

    let range = workbook
        .worksheet_range_at(idx)
        .ok_or_else(|| {
            InputError::MissingInput(format!("sheet '{}' in {}", names[idx], path.display()))
        })?
        .map_err(|e| InputError::Parse(format!("{} [{}]: {e}", path.display(), names[idx])))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(first) => first
            .iter()
            .enumerate()
            .map(|(i, cell)| column_name(&cell_value(cell).as_text().unwrap_or_default(), i))
            .collect(),
        None => return Ok(Table::default()),
    };
    let body = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(Table::from_rows(header, body))
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) if f.is_finite() => CellValue::Number(*f),
        DataType::Float(f) => CellValue::Text(f.to_string()),
        DataType::String(s) => CellValue::parse(s),
        DataType::Bool(b) => CellValue::Text(b.to_string()),
        DataType::Empty => CellValue::Blank,
        other => CellValue::Text(format!("{other:?}")),
    }
}
