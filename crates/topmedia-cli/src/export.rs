//! Flagged-row export in the deliverable column order.

use crate::ingest::PASS_THROUGH_COLUMNS;
use std::io::Write;
use topmedia::MediaRow;

pub const OUTPUT_COLUMNS: &[&str] = &[
    "CreatedTime",
    "Source",
    "Publication Name",
    "Group",
    "Outlet",
    "Media Title",
    "Permalink",
    "?",
    "Campaign",
    "Phase",
    "Products",
    "PreOrder",
    "Journalist",
    "Sentiment",
    "Country",
    "Total News Media Potential Reach",
    "Web shares overall",
    "EMV",
    "ExUS Author",
    "Suppress Reasons",
    "Source Platform",
];

const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Export options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Write permalinks as bare URLs instead of spreadsheet link formulas.
    pub plain_links: bool,
}

fn permalink_cell(url: &str, options: ExportOptions) -> String {
    if url.is_empty() || options.plain_links {
        url.to_string()
    } else {
        let escaped = url.replace('"', "\"\"");
        format!("=HYPERLINK(\"{escaped}\", \"{escaped}\")")
    }
}

fn record(row: &MediaRow, options: ExportOptions) -> Vec<String> {
    let extra = |name: &str| row.extra.get(name).cloned().unwrap_or_default();

    let mut cells = vec![
        row.created_time
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        row.source_type.clone(),
        row.publication_name.clone(),
        row.group.clone(),
        row.outlet.clone(),
        row.media_title.clone(),
        permalink_cell(&row.resolved_permalink, options),
        if row.suppress_flag { "R".into() } else { String::new() },
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        row.journalist.clone(),
        row.sentiment.clone(),
    ];
    cells.extend(PASS_THROUGH_COLUMNS.iter().map(|&c| extra(c)));
    cells.push(if row.is_exus_author { "Yes".into() } else { String::new() });
    cells.push(row.reasons_display());
    cells.push(row.source_platform.to_string());
    cells
}

/// Write rows with a header line. Returns the number of data rows.
pub fn write_rows<W: Write>(writer: W, rows: &[MediaRow], options: ExportOptions) -> csv::Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        out.write_record(record(row, options))?;
    }
    out.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use topmedia::{SourcePlatform, SuppressReason};

    fn flagged_row() -> MediaRow {
        let mut row = MediaRow::new(SourcePlatform::Cision)
            .with_publication("Wired")
            .with_permalink("https://wired.com/a")
            .with_journalist("Ann Poe");
        row.created_time = NaiveDate::from_ymd_opt(2025, 6, 4);
        row.resolved_permalink = "https://wired.com/a".into();
        row.group = "Tech".into();
        row.outlet = "Wired".into();
        row.is_exus_author = true;
        row.suppress_flag = true;
        row.suppress_reasons = vec![SuppressReason::DuplicateUrl, SuppressReason::ExUsAuthor];
        row.extra.insert("EMV".into(), "120".into());
        row
    }

    fn export(rows: &[MediaRow], options: ExportOptions) -> Vec<Vec<String>> {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows, options).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(buf.as_slice());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    fn col(name: &str) -> usize {
        OUTPUT_COLUMNS.iter().position(|c| *c == name).unwrap()
    }

    #[test]
    fn test_header_and_cells() {
        let records = export(&[flagged_row()], ExportOptions::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], OUTPUT_COLUMNS);

        let row = &records[1];
        assert_eq!(row.len(), OUTPUT_COLUMNS.len());
        assert_eq!(row[col("CreatedTime")], "6/4/2025");
        assert_eq!(
            row[col("Permalink")],
            r#"=HYPERLINK("https://wired.com/a", "https://wired.com/a")"#
        );
        assert_eq!(row[col("?")], "R");
        assert_eq!(row[col("ExUS Author")], "Yes");
        assert_eq!(row[col("EMV")], "120");
        assert_eq!(row[col("Campaign")], "");
        assert_eq!(row[col("Source Platform")], "Cision");
        assert_eq!(row[col("Suppress Reasons")], flagged_row().reasons_display());
    }

    #[test]
    fn test_plain_links_and_blanks() {
        let mut row = flagged_row();
        row.created_time = None;
        row.suppress_flag = false;
        row.is_exus_author = false;
        row.suppress_reasons.clear();

        let records = export(&[row], ExportOptions { plain_links: true });
        let cells = &records[1];
        assert_eq!(cells[col("Permalink")], "https://wired.com/a");
        assert_eq!(cells[col("CreatedTime")], "");
        assert_eq!(cells[col("?")], "");
        assert_eq!(cells[col("ExUS Author")], "");
        assert_eq!(cells[col("Suppress Reasons")], "");
    }

    #[test]
    fn test_blank_permalink_has_no_formula() {
        let mut row = flagged_row();
        row.resolved_permalink.clear();
        let records = export(&[row], ExportOptions::default());
        assert_eq!(records[1][col("Permalink")], "");
    }
}
