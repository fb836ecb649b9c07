//! Top Media Combiner command-line front end: vendor export ingestion (CSV or
//! workbook), reference table loading, export and the `topmedia` subcommands.

pub mod commands;
pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod progress;
pub mod reference;
pub mod workbook;
