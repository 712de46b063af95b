use super::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_annotator_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(path: &Path, contents: &str) {
    let mut f = BufWriter::new(File::create(path).unwrap());
    f.write_all(contents.as_bytes()).unwrap();
}

fn xlsx_cell(col: usize, row: usize, cell: &str) -> String {
    let r = format!("{}{}", (b'A' + col as u8) as char, row + 1);
    match cell.parse::<f64>() {
        Ok(_) => format!("<c r=\"{r}\"><v>{cell}</v></c>"),
        Err(_) if cell.is_empty() => String::new(),
        Err(_) => format!("<c r=\"{r}\" t=\"inlineStr\"><is><t>{cell}</t></is></c>"),
    }
}

/// Minimal workbook, one worksheet per `(name, rows)`; numeric-looking cells
/// are stored as numbers, the rest as inline strings.
fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let opts = SimpleFileOptions::default();

    let mut content_types = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    );
    let mut rels = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    );
    let mut book = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets>",
    );

    for (i, (name, rows)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{n}.xml\" \
             ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
        ));
        rels.push_str(&format!(
            "<Relationship Id=\"rId{n}\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" \
             Target=\"worksheets/sheet{n}.xml\"/>"
        ));
        book.push_str(&format!("<sheet name=\"{name}\" sheetId=\"{n}\" r:id=\"rId{n}\"/>"));

        let mut sheet = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>",
        );
        for (r, row) in rows.iter().enumerate() {
            sheet.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, cell) in row.iter().enumerate() {
                sheet.push_str(&xlsx_cell(c, r, cell));
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");
        zip.start_file(format!("xl/worksheets/sheet{n}.xml"), opts).unwrap();
        zip.write_all(sheet.as_bytes()).unwrap();
    }
    content_types.push_str("</Types>");
    rels.push_str("</Relationships>");
    book.push_str("</sheets></workbook>");

    zip.start_file("[Content_Types].xml", opts).unwrap();
    zip.write_all(content_types.as_bytes()).unwrap();
    zip.start_file("_rels/.rels", opts).unwrap();
    zip.write_all(
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
          <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
          <Relationship Id=\"rId1\" \
          Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
          Target=\"xl/workbook.xml\"/></Relationships>",
    )
    .unwrap();
    zip.start_file("xl/workbook.xml", opts).unwrap();
    zip.write_all(book.as_bytes()).unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn annotation_workbook(path: &Path) {
    write_xlsx(
        path,
        &[
            (
                "Reference",
                vec![
                    vec!["T cell", "T cell order", "B cell", "B cell order"],
                    vec!["CD3E", "x", "MS4A1", "y"],
                    vec!["", "", "CD79A", ""],
                ],
            ),
            (
                "Sample",
                vec![vec!["gene", "s1"], vec!["CD3E", "4"], vec!["MS4A1", "0.5"]],
            ),
        ],
    );
}

#[test]
fn test_cell_value_parse() {
    assert_eq!(CellValue::parse("  "), CellValue::Blank);
    assert_eq!(CellValue::parse("NA"), CellValue::Blank);
    assert_eq!(CellValue::parse("nan"), CellValue::Blank);
    assert_eq!(CellValue::parse("2.5"), CellValue::Number(2.5));
    assert_eq!(CellValue::parse(" CD3E "), CellValue::Text("CD3E".to_string()));
    assert_eq!(CellValue::Number(3.0).as_text(), Some("3".to_string()));
    assert_eq!(CellValue::Number(0.25).as_text(), Some("0.25".to_string()));
}

#[test]
fn test_load_tsv_ragged_rows() {
    let dir = make_temp_dir();
    let path = dir.join("sample.tsv");
    write_file(&path, "gene\ts1\ts2\nCD3E\t1\t2\nMS4A1\t4\n");

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.n_columns(), 3);
    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.columns[0].name, "gene");
    assert_eq!(table.columns[1].cells, vec![CellValue::Number(1.0), CellValue::Number(4.0)]);
    assert_eq!(table.columns[2].cells, vec![CellValue::Number(2.0), CellValue::Blank]);
}

#[test]
fn test_load_csv_quoted_and_blank_header() {
    let dir = make_temp_dir();
    let path = dir.join("reference.csv");
    write_file(&path, "\"T cell\",,B cell\nCD3E,,MS4A1\n\"CD3D\",,\n");

    let table = load_table(&path, None).unwrap();
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["T cell", "column_2", "B cell"]);
    assert_eq!(table.columns[0].cells[1], CellValue::Text("CD3D".to_string()));
    assert!(table.columns[1].is_empty());
}

#[test]
fn test_load_gzipped_tsv() {
    let dir = make_temp_dir();
    let path = dir.join("sample.tsv.gz");
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(b"gene\ts1\nCD3E\t7\n").unwrap();
    enc.finish().unwrap();

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.columns[1].cells, vec![CellValue::Number(7.0)]);
}

#[test]
fn test_detect_format() {
    assert_eq!(detect_format(Path::new("a.tsv")).unwrap(), TableFormat::Tsv);
    assert_eq!(detect_format(Path::new("a.TXT")).unwrap(), TableFormat::Tsv);
    assert_eq!(detect_format(Path::new("a.csv.gz")).unwrap(), TableFormat::Csv);
    assert_eq!(detect_format(Path::new("a.xlsx")).unwrap(), TableFormat::Workbook);
    assert!(matches!(
        detect_format(Path::new("a.xlsx.gz")),
        Err(InputError::InvalidInput(_))
    ));
    assert!(matches!(
        detect_format(Path::new("a.json")),
        Err(InputError::InvalidInput(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = make_temp_dir();
    let err = load_table(&dir.join("absent.tsv"), None).unwrap_err();
    assert!(matches!(err, InputError::MissingInput(_)));
}

#[test]
fn test_every_nth_column() {
    let table = Table::new(vec![
        Column::new("T", vec![]),
        Column::new("T order", vec![]),
        Column::new("B", vec![]),
        Column::new("B order", vec![]),
    ]);
    let names: Vec<String> = table
        .every_nth_column(2)
        .columns
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["T", "B"]);
    assert_eq!(table.every_nth_column(0).n_columns(), 4);
}

#[test]
fn test_trim_leading_index() {
    let table = Table::new(vec![
        Column::new("label", vec![CellValue::Text("x".into()), CellValue::Blank, CellValue::Blank]),
        Column::new(
            "idx",
            vec![CellValue::Number(0.0), CellValue::Number(1.0), CellValue::Blank],
        ),
        Column::new(
            "c0",
            vec![
                CellValue::Text("CD3E".into()),
                CellValue::Text("CD3D".into()),
                CellValue::Text("notes".into()),
            ],
        ),
    ]);
    let trimmed = table.trim_leading_index();
    assert_eq!(trimmed.n_columns(), 1);
    assert_eq!(trimmed.columns[0].name, "c0");
    assert_eq!(trimmed.columns[0].cells.len(), 2);

    let no_index = Table::new(vec![Column::new("c0", vec![CellValue::Text("A".into())])]);
    assert_eq!(no_index.trim_leading_index(), no_index);
}

#[test]
fn test_load_workbook_sheet_by_name() {
    let dir = make_temp_dir();
    let path = dir.join("annotation.xlsx");
    annotation_workbook(&path);

    let table = load_table(&path, Some("Sample")).unwrap();
    assert_eq!(table.n_columns(), 2);
    assert_eq!(table.columns[0].name, "gene");
    assert_eq!(
        table.columns[0].cells,
        vec![
            CellValue::Text("CD3E".to_string()),
            CellValue::Text("MS4A1".to_string())
        ]
    );
    assert_eq!(
        table.columns[1].cells,
        vec![CellValue::Number(4.0), CellValue::Number(0.5)]
    );
}

#[test]
fn test_load_workbook_defaults_to_first_sheet() {
    let dir = make_temp_dir();
    let path = dir.join("annotation.xlsx");
    annotation_workbook(&path);

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.n_columns(), 4);
    assert_eq!(table.columns[2].name, "B cell");
    assert_eq!(table.columns[2].cells[1], CellValue::Text("CD79A".to_string()));
    assert!(table.columns[0].cells[1].is_blank());
    let strided = table.every_nth_column(2);
    let names: Vec<&str> = strided
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["T cell", "B cell"]);
}

#[test]
fn test_load_workbook_unknown_sheet_lists_available() {
    let dir = make_temp_dir();
    let path = dir.join("annotation.xlsx");
    annotation_workbook(&path);

    let err = load_table(&path, Some("Markers")).unwrap_err();
    let InputError::MissingInput(msg) = &err else {
        panic!("expected MissingInput, got {err:?}");
    };
    assert!(msg.contains("'Markers'"));
    assert!(msg.contains("available: Reference, Sample"));
}
