#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_missing_marker(trimmed) {
            return CellValue::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => CellValue::Number(v),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form of the cell; numbers are rendered without a trailing `.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Blank => None,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            CellValue::Number(v) => Some(format_number(*v)),
        }
    }
}

fn is_missing_marker(s: &str) -> bool {
    s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("n/a")
}

pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

pub fn column_name(raw: &str, idx: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// At least one number and no text cells.
    pub fn is_numeric(&self) -> bool {
        let mut any_number = false;
        for cell in &self.cells {
            match cell {
                CellValue::Number(_) => any_number = true,
                CellValue::Text(_) => return false,
                CellValue::Blank => {}
            }
        }
        any_number
    }

    pub fn has_numbers(&self) -> bool {
        self.cells.iter().any(|c| c.as_number().is_some())
    }

    /// More text cells than numbers; identifier columns look like this.
    pub fn is_mostly_text(&self) -> bool {
        let (mut text, mut numbers) = (0usize, 0usize);
        for cell in &self.cells {
            match cell {
                CellValue::Text(_) => text += 1,
                CellValue::Number(_) => numbers += 1,
                CellValue::Blank => {}
            }
        }
        text > numbers
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// Ordered named columns, the only shape the annotation core reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Transposes row-major records into columns, padding short rows with blanks.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = header
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut row = row.into_iter();
            for column in columns.iter_mut() {
                column.cells.push(row.next().unwrap_or(CellValue::Blank));
            }
        }
        Self::new(columns)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    pub fn every_nth_column(&self, stride: usize) -> Table {
        let stride = stride.max(1);
        Table::new(self.columns.iter().step_by(stride).cloned().collect())
    }

    /// Drops columns up to and including the first all-numeric column and
    /// truncates the rest to that column's leading run of non-blank rows.
    /// Tables without a numeric column are returned unchanged.
    pub fn trim_leading_index(&self) -> Table {
        let Some(start) = self.columns.iter().position(Column::is_numeric) else {
            return self.clone();
        };
        let index = &self.columns[start];
        let length = index
            .cells
            .iter()
            .position(CellValue::is_blank)
            .unwrap_or(index.cells.len());
        let columns = self.columns[start + 1..]
            .iter()
            .map(|c| Column::new(c.name.clone(), c.cells.iter().take(length).cloned().collect()))
            .collect();
        Table::new(columns)
    }
}
