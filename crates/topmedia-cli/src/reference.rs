//! Reference table loading: the outlet map and the journalist list.
//!
//! Both tables come either as standalone files or as two named sheets of
//! the master reference workbook.

use crate::error::IngestError;
use crate::ingest::{is_blank_row, Table};
use crate::workbook::{self, SheetOptions};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use topmedia::{AuthorExclusionSet, AuthorRecord, OutletMap, OutletRecord, ReferenceData, Rules};

pub const OUTLET_SHEET: &str = "Detailed List for Msmt";
pub const JOURNALIST_SHEET: &str = "Journalist Check";

const OUTLETS: &str = "outlet reference";
const JOURNALISTS: &str = "journalist reference";

pub const OUTLET_GROUP: &str = "Vertical (FOR VLOOKUP)";
pub const OUTLET_NAME: &str = "Outlet Name";
pub const OUTLET_SEARCHED_NAME: &str = "Outlet Name From Searches";
pub const OUTLET_URL: &str = "URL";

pub const JOURNALIST_PUBLICATION: &str = "Publication";
pub const JOURNALIST_NAME: &str = "Name";
pub const JOURNALIST_GEO: &str = "Geo";

fn require(table: &Table, name: &str, columns: &[&str]) -> Result<(), IngestError> {
    for column in columns {
        if table.column(column).is_none() {
            return Err(IngestError::MissingColumn {
                table: name.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Outlet rows in sheet order, skipping blank rows.
pub fn outlets_from_table(table: &Table) -> Result<Vec<OutletRecord>, IngestError> {
    require(table, OUTLETS, &[OUTLET_GROUP, OUTLET_NAME])?;

    Ok(table
        .rows
        .iter()
        .filter(|row| !is_blank_row(row))
        .map(|row| OutletRecord {
            group: table.cell(row, OUTLET_GROUP).trim().to_string(),
            outlet_name: table.cell(row, OUTLET_NAME).trim().to_string(),
            searched_name: table.cell(row, OUTLET_SEARCHED_NAME).trim().to_string(),
            url: table.cell(row, OUTLET_URL).trim().to_string(),
        })
        .collect())
}

/// Journalist rows in sheet order, skipping blank rows.
pub fn journalists_from_table(table: &Table) -> Result<Vec<AuthorRecord>, IngestError> {
    require(
        table,
        JOURNALISTS,
        &[JOURNALIST_PUBLICATION, JOURNALIST_NAME, JOURNALIST_GEO],
    )?;

    Ok(table
        .rows
        .iter()
        .filter(|row| !is_blank_row(row))
        .map(|row| AuthorRecord {
            publication: table.cell(row, JOURNALIST_PUBLICATION).to_string(),
            name: table.cell(row, JOURNALIST_NAME).to_string(),
            geo: table.cell(row, JOURNALIST_GEO).to_string(),
        })
        .collect())
}

/// Read outlet reference rows from CSV.
pub fn read_outlets<R: Read>(reader: R) -> Result<Vec<OutletRecord>, IngestError> {
    outlets_from_table(&Table::read(reader, 0, OUTLETS)?)
}

/// Read journalist reference rows from CSV.
pub fn read_journalists<R: Read>(reader: R) -> Result<Vec<AuthorRecord>, IngestError> {
    journalists_from_table(&Table::read(reader, 0, JOURNALISTS)?)
}

/// Outlet map from a standalone CSV or single-sheet workbook.
pub fn load_outlets(path: &Path) -> Result<OutletMap> {
    let table = workbook::read_table_file(path, &SheetOptions::default(), OUTLETS)
        .with_context(|| format!("Failed to read outlet reference {}", path.display()))?;
    let records = outlets_from_table(&table)
        .with_context(|| format!("Failed to read outlet reference {}", path.display()))?;
    Ok(OutletMap::from_records(records))
}

/// Load both reference tables from standalone files.
pub fn load(outlets: &Path, journalists: &Path, rules: &Rules) -> Result<ReferenceData> {
    let outlet_map = load_outlets(outlets)?;

    let table = workbook::read_table_file(journalists, &SheetOptions::default(), JOURNALISTS)
        .with_context(|| format!("Failed to read journalist reference {}", journalists.display()))?;
    let author_records = journalists_from_table(&table)
        .with_context(|| format!("Failed to read journalist reference {}", journalists.display()))?;

    Ok(ReferenceData::new(
        outlet_map,
        AuthorExclusionSet::from_records(author_records, &rules.exclusion_geo),
    ))
}

fn named_sheet(name: &str) -> SheetOptions<'_> {
    SheetOptions {
        sheet: Some(name),
        ..SheetOptions::default()
    }
}

/// Load both reference tables from the sheets of one master workbook.
pub fn load_workbook(path: &Path, rules: &Rules) -> Result<ReferenceData> {
    let context = || format!("Failed to read reference workbook {}", path.display());

    let outlets = workbook::read_sheet(path, &named_sheet(OUTLET_SHEET), OUTLETS).with_context(context)?;
    let outlet_records = outlets_from_table(&outlets).with_context(context)?;

    let journalists =
        workbook::read_sheet(path, &named_sheet(JOURNALIST_SHEET), JOURNALISTS).with_context(context)?;
    let author_records = journalists_from_table(&journalists).with_context(context)?;

    Ok(ReferenceData::new(
        OutletMap::from_records(outlet_records),
        AuthorExclusionSet::from_records(author_records, &rules.exclusion_geo),
    ))
}
