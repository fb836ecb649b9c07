//! Vendor export ingestion (CSV or workbook) and column mapping.
//!
//! Each vendor has a [`VendorLayout`]: how many preamble rows to skip, which
//! headers to rename onto the common schema, how permalinks are encoded and
//! whether blank rows are dropped. Headers are trimmed; when a name appears
//! twice the first column wins.

use crate::error::IngestError;
use crate::workbook::{self, SheetOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use topmedia::{MediaRow, SourcePlatform};

static HYPERLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)HYPERLINK\(\s*"([^"]+)""#).unwrap());

pub const COL_CREATED_TIME: &str = "CreatedTime";
pub const COL_SOURCE: &str = "Source";
pub const COL_PUBLICATION: &str = "Publication Name";
pub const COL_MEDIA_TITLE: &str = "Media Title";
pub const COL_PERMALINK: &str = "Permalink";
pub const COL_JOURNALIST: &str = "Journalist";
pub const COL_SENTIMENT: &str = "Sentiment";

/// Vendor columns carried into the export when present.
pub const PASS_THROUGH_COLUMNS: &[&str] = &[
    "Country",
    "Total News Media Potential Reach",
    "Web shares overall",
    "EMV",
];

/// Date layouts seen in vendor exports, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%d-%b-%Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d-%b-%Y", "%b %d, %Y", "%d %b %Y"];

/// How one vendor's export maps onto the common schema.
#[derive(Debug, Clone, Copy)]
pub struct VendorLayout {
    pub platform: SourcePlatform,
    /// Preamble rows above the header.
    pub skip_rows: usize,
    /// `(vendor header, common header)` pairs.
    pub renames: &'static [(&'static str, &'static str)],
    /// Headers discarded before mapping.
    pub dropped: &'static [&'static str],
    /// Permalink cells may hold `=HYPERLINK("url", "label")` formulas.
    pub formula_links: bool,
    /// Rows with every cell blank are discarded before the empty check.
    pub drop_blank_rows: bool,
}

pub const SPRINKLR: VendorLayout = VendorLayout {
    platform: SourcePlatform::Sprinklr,
    skip_rows: 0,
    renames: &[("Resolved_URL", COL_PERMALINK)],
    dropped: &["Conversation Stream"],
    formula_links: false,
    drop_blank_rows: false,
};

pub const CISION: VendorLayout = VendorLayout {
    platform: SourcePlatform::Cision,
    skip_rows: 3,
    renames: &[
        ("Date", COL_CREATED_TIME),
        ("Media Type", COL_SOURCE),
        ("Media Outlet", COL_PUBLICATION),
        ("Title", COL_MEDIA_TITLE),
        ("Link", COL_PERMALINK),
        ("Author", COL_JOURNALIST),
    ],
    dropped: &[],
    formula_links: true,
    drop_blank_rows: true,
};

impl VendorLayout {
    pub fn for_platform(platform: SourcePlatform) -> &'static VendorLayout {
        match platform {
            SourcePlatform::Sprinklr => &SPRINKLR,
            SourcePlatform::Cision => &CISION,
        }
    }

    fn common_name<'a>(&self, header: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|(from, _)| *from == header)
            .map(|(_, to)| *to)
            .unwrap_or(header)
    }
}

/// A sheet body with trimmed headers and first-occurrence column lookup.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Read a CSV, skipping `skip_rows` preamble rows before the header.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read<R: Read>(reader: R, skip_rows: usize, name: &str) -> Result<Self, IngestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.byte_records() {
            grid.push(record?.iter().map(decode).collect());
        }
        Self::from_grid(grid, skip_rows, name)
    }

    /// Build a table from raw rows: `skip_rows` preamble rows, then the header.
    pub fn from_grid(grid: Vec<Vec<String>>, skip_rows: usize, name: &str) -> Result<Self, IngestError> {
        let mut rows = grid.into_iter().skip(skip_rows);
        let header = rows.next().ok_or_else(|| IngestError::MissingHeader {
            dataset: name.to_string(),
            skipped: skip_rows,
        })?;
        let headers = header
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Ok(Self::from_parts(headers, rows.collect()))
    }

    pub fn from_parts(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.clone()).or_insert(i);
        }
        Self {
            headers,
            rows,
            index,
        }
    }

    pub fn drop_blank_rows(&mut self) {
        self.rows.retain(|row| !is_blank_row(row));
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Cell by column name; blank when the column or cell is absent.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.column(name)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Apply a layout's drops and renames. First occurrence of a name wins.
    fn mapped(self, layout: &VendorLayout) -> Self {
        let headers = self
            .headers
            .iter()
            .map(|h| {
                if layout.dropped.contains(&h.as_str()) {
                    String::new()
                } else {
                    layout.common_name(h).to_string()
                }
            })
            .collect();
        let mut mapped = Self::from_parts(headers, self.rows);
        mapped.index.remove("");
        mapped
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub fn is_blank_row(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

/// Read one vendor CSV export into rows in file order.
pub fn read_vendor<R: Read>(reader: R, layout: &VendorLayout) -> Result<Vec<MediaRow>, IngestError> {
    let table = Table::read(reader, layout.skip_rows, &layout.platform.to_string())?;
    rows_from_table(table, layout)
}

/// Read one vendor export from disk: a workbook's first sheet for
/// spreadsheet extensions, CSV otherwise.
pub fn read_vendor_file(path: &Path, layout: &VendorLayout) -> Result<Vec<MediaRow>, IngestError> {
    let options = SheetOptions {
        sheet: None,
        skip_rows: layout.skip_rows,
        hyperlink_formulas: layout.formula_links,
    };
    let table = workbook::read_table_file(path, &options, &layout.platform.to_string())?;
    rows_from_table(table, layout)
}

fn rows_from_table(mut table: Table, layout: &VendorLayout) -> Result<Vec<MediaRow>, IngestError> {
    if layout.drop_blank_rows {
        table.drop_blank_rows();
    }
    let table = table.mapped(layout);
    if table.rows.is_empty() {
        return Err(IngestError::Empty {
            dataset: layout.platform.to_string(),
        });
    }

    let rows = table
        .rows
        .iter()
        .map(|cells| to_media_row(&table, cells, layout))
        .collect();
    Ok(rows)
}

fn to_media_row(table: &Table, cells: &[String], layout: &VendorLayout) -> MediaRow {
    let permalink = table.cell(cells, COL_PERMALINK);
    let permalink = if layout.formula_links {
        extract_hyperlink(permalink)
    } else {
        permalink.trim().to_string()
    };

    let mut row = MediaRow::new(layout.platform)
        .with_publication(table.cell(cells, COL_PUBLICATION).trim())
        .with_permalink(&permalink)
        .with_journalist(table.cell(cells, COL_JOURNALIST));
    row.created_time = parse_created_time(table.cell(cells, COL_CREATED_TIME));
    row.source_type = table.cell(cells, COL_SOURCE).to_string();
    row.media_title = table.cell(cells, COL_MEDIA_TITLE).to_string();
    row.sentiment = table.cell(cells, COL_SENTIMENT).to_string();

    for column in PASS_THROUGH_COLUMNS {
        let value = table.cell(cells, column);
        if !value.is_empty() {
            row.extra.insert(column.to_string(), value.to_string());
        }
    }
    row
}

/// URL inside a `HYPERLINK("url", ...)` formula, or the trimmed cell.
pub fn extract_hyperlink(cell: &str) -> String {
    HYPERLINK_RE
        .captures(cell)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| cell.trim().to_string())
}

/// Parse a vendor timestamp to its calendar date. Unknown layouts give `None`.
pub fn parse_created_time(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        })
}
