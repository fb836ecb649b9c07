//! Spreadsheet input via `calamine`.
//!
//! A sheet becomes the same [`Table`] a CSV does. Grid rows are absolute
//! sheet rows, so preamble skipping also counts blank rows above the first
//! used cell.

use crate::error::IngestError;
use crate::ingest::Table;
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::fs::File;
use std::path::Path;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Input format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Workbook,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        let is_workbook = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)));
        if is_workbook {
            Self::Workbook
        } else {
            Self::Csv
        }
    }
}

/// Which sheet to read and how.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetOptions<'a> {
    /// Sheet name; the first sheet when `None`. Ignored for CSV.
    pub sheet: Option<&'a str>,
    /// Preamble rows above the header.
    pub skip_rows: usize,
    /// Use the formula text of `HYPERLINK(...)` cells instead of their label.
    pub hyperlink_formulas: bool,
}

/// Read a CSV or workbook file into a [`Table`], by extension.
pub fn read_table_file(path: &Path, options: &SheetOptions<'_>, name: &str) -> Result<Table, IngestError> {
    match FileFormat::from_path(path) {
        FileFormat::Csv => Table::read(File::open(path)?, options.skip_rows, name),
        FileFormat::Workbook => read_sheet(path, options, name),
    }
}

/// Read one worksheet into a [`Table`].
pub fn read_sheet(path: &Path, options: &SheetOptions<'_>, name: &str) -> Result<Table, IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let sheet = match options.sheet {
        Some(sheet) if names.iter().any(|n| n == sheet) => sheet.to_string(),
        Some(sheet) => {
            return Err(IngestError::MissingSheet {
                workbook: path.display().to_string(),
                sheet: sheet.to_string(),
            })
        }
        None => names.into_iter().next().ok_or_else(|| IngestError::Empty {
            dataset: name.to_string(),
        })?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let mut grid = grid_from_range(&range);
    if options.hyperlink_formulas {
        let formulas = workbook.worksheet_formula(&sheet)?;
        overlay_hyperlinks(&mut grid, &formulas);
    }
    Table::from_grid(grid, options.skip_rows, name)
}

fn grid_from_range(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let mut grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_text));
        grid.push(cells);
    }
    grid
}

fn overlay_hyperlinks(grid: &mut Vec<Vec<String>>, formulas: &Range<String>) {
    let Some((start_row, start_col)) = formulas.start() else {
        return;
    };
    for (row, col, formula) in formulas.used_cells() {
        if !formula.to_ascii_uppercase().contains("HYPERLINK(") {
            continue;
        }
        let (row, col) = (start_row as usize + row, start_col as usize + col);
        if grid.len() <= row {
            grid.resize(row + 1, Vec::new());
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = formula.clone();
    }
}

/// Cell value as the text a CSV export would carry.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Whole numbers print without a trailing ".0".
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Write a workbook of string, number and formula cells for tests.
#[cfg(test)]
pub(crate) fn write_test_workbook(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if value.is_empty() {
                    continue;
                }
                if value.starts_with('=') {
                    sheet.write_formula(r, c, *value).unwrap();
                } else if let Ok(n) = value.parse::<f64>() {
                    sheet.write_number(r, c, n).unwrap();
                } else {
                    sheet.write_string(r, c, *value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), FileFormat::Workbook);
        assert_eq!(FileFormat::from_path(Path::new("a.XLSX")), FileFormat::Workbook);
        assert_eq!(FileFormat::from_path(Path::new("a.xls")), FileFormat::Workbook);
        assert_eq!(FileFormat::from_path(Path::new("a.csv")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("export")), FileFormat::Csv);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(1000.0)), "1000");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::String("Wired".into())), "Wired");
        assert_eq!(
            cell_text(&Data::DateTimeIso("2025-06-03T10:00:00".into())),
            "2025-06-03T10:00:00"
        );
    }

    #[test]
    fn test_read_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_test_workbook(
            &path,
            &[
                ("Notes", vec![vec!["ignore me"]]),
                ("Data", vec![vec!["Name", " Reach "], vec!["Wired", "1000"]]),
            ],
        );

        let options = SheetOptions {
            sheet: Some("Data"),
            ..SheetOptions::default()
        };
        let table = read_table_file(&path, &options, "data").unwrap();
        assert_eq!(table.headers, vec!["Name", "Reach"]);
        assert_eq!(table.cell(&table.rows[0], "Reach"), "1000");

        let first = read_table_file(&path, &SheetOptions::default(), "data").unwrap();
        assert_eq!(first.headers, vec!["ignore me"]);
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_test_workbook(&path, &[("Data", vec![vec!["Name"]])]);

        let options = SheetOptions {
            sheet: Some("Journalist Check"),
            ..SheetOptions::default()
        };
        let err = read_sheet(&path, &options, "journalists").unwrap_err();
        assert!(matches!(err, IngestError::MissingSheet { ref sheet, .. } if sheet == "Journalist Check"));
    }

    #[test]
    fn test_preamble_counts_leading_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cision.xlsx");
        write_test_workbook(
            &path,
            &[(
                "Sheet1",
                vec![vec![], vec![], vec![], vec!["Title", "Link"], vec!["Review", "x"]],
            )],
        );

        let options = SheetOptions {
            skip_rows: 3,
            ..SheetOptions::default()
        };
        let table = read_sheet(&path, &options, "Cision").unwrap();
        assert_eq!(table.headers, vec!["Title", "Link"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_hyperlink_formula_text_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.xlsx");
        write_test_workbook(
            &path,
            &[(
                "Sheet1",
                vec![vec!["Link"], vec![r#"=HYPERLINK("https://wired.com/review", "Review")"#]],
            )],
        );

        let options = SheetOptions {
            hyperlink_formulas: true,
            ..SheetOptions::default()
        };
        let table = read_sheet(&path, &options, "Cision").unwrap();
        let cell = table.cell(&table.rows[0], "Link");
        assert!(cell.contains("https://wired.com/review"), "got {cell}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table_file(&dir.path().join("nope.csv"), &SheetOptions::default(), "x").unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
