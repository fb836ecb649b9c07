//! `topmedia combine`: merge both vendor exports, classify, flag and export.

use crate::commands::ResolveArgs;
use crate::export::{self, ExportOptions};
use crate::ingest::{self, VendorLayout};
use crate::output::{self, Styled};
use crate::progress;
use crate::reference;
use anyhow::{Context, Result};
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use topmedia::{MediaRow, Pipeline, ReferenceData, RunSummary, Rules, SourcePlatform, SuppressReason};
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct CombineArgs {
    /// Sprinklr export (CSV or XLSX)
    #[arg(long)]
    pub sprinklr: PathBuf,

    /// Cision export (CSV or XLSX, three preamble rows)
    #[arg(long)]
    pub cision: PathBuf,

    /// Master reference workbook with "Detailed List for Msmt" and
    /// "Journalist Check" sheets
    #[arg(
        long,
        conflicts_with_all = ["outlets", "journalists"],
        required_unless_present_all = ["outlets", "journalists"]
    )]
    pub reference: Option<PathBuf>,

    /// Outlet reference table (CSV or XLSX)
    #[arg(long, requires = "journalists")]
    pub outlets: Option<PathBuf>,

    /// Journalist reference table (CSV or XLSX)
    #[arg(long, requires = "outlets")]
    pub journalists: Option<PathBuf>,

    /// Output file
    #[arg(long, short, default_value = "topmedia_combined.csv")]
    pub out: PathBuf,

    /// Write permalinks as bare URLs instead of HYPERLINK formulas
    #[arg(long)]
    pub plain_links: bool,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

fn read_export(path: &Path, layout: &VendorLayout) -> Result<Vec<MediaRow>> {
    ingest::read_vendor_file(path, layout)
        .with_context(|| format!("Failed to read {} export {}", layout.platform, path.display()))
}

fn load_reference(args: &CombineArgs, rules: &Rules) -> Result<ReferenceData> {
    match (&args.reference, &args.outlets, &args.journalists) {
        (Some(workbook), _, _) => reference::load_workbook(workbook, rules),
        (None, Some(outlets), Some(journalists)) => reference::load(outlets, journalists, rules),
        _ => anyhow::bail!("Pass --reference, or both --outlets and --journalists"),
    }
}

/// Run the combine command.
pub async fn run(args: &CombineArgs) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();
    let hidden = output::is_quiet() || output::is_json();

    if !hidden {
        output::print_header(&s);
    }

    let spinner = progress::create_spinner("Loading inputs", hidden);
    let rules = args.resolve.load_rules()?;
    let reference = load_reference(args, &rules)?;

    let mut rows = read_export(&args.sprinklr, VendorLayout::for_platform(SourcePlatform::Sprinklr))?;
    let sprinklr_rows = rows.len();
    rows.extend(read_export(&args.cision, VendorLayout::for_platform(SourcePlatform::Cision))?);
    let cision_rows = rows.len() - sprinklr_rows;
    progress::set_step_done(
        &spinner,
        "Inputs",
        &format!("{sprinklr_rows} Sprinklr + {cision_rows} Cision rows"),
    );
    info!(
        sprinklr = sprinklr_rows,
        cision = cision_rows,
        outlet_keys = reference.outlets.len(),
        excluded_authors = reference.exclusions.len(),
        "inputs loaded"
    );

    let resolver = args.resolve.resolver()?;
    let resolver_name = resolver.name();
    let total = rows.len();
    let bar = progress::create_row_progress(total, hidden);
    let mut pipeline = Pipeline::new(resolver, &rules, &reference);
    let rows = pipeline
        .process_with_progress(rows, |done, total| progress::set_rows_done(&bar, done, total))
        .await;
    progress::finish_rows(&bar, total);

    let file = File::create(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    let options = ExportOptions {
        plain_links: args.plain_links,
    };
    export::write_rows(file, &rows, options)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let summary = RunSummary::from_rows(&rows);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "output": args.out.display().to_string(),
            "resolver": resolver_name,
            "summary": summary,
            "duration_ms": start.elapsed().as_millis() as u64,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        print_summary(&s, &summary, &args.out, start.elapsed().as_secs());
        if output::is_verbose() {
            print_suppressed(&s, &rows);
        }
    }

    Ok(())
}

fn print_summary(s: &Styled, summary: &RunSummary, out: &Path, elapsed_secs: u64) {
    eprintln!();
    output::print_section(s, "Rows");
    for (platform, count) in &summary.by_platform {
        output::print_check(s.info_sym(), platform, &count.to_string());
    }
    output::print_check(s.ok_sym(), "Kept", &summary.kept().to_string());
    output::print_check(
        if summary.suppressed > 0 { s.warn_sym() } else { s.ok_sym() },
        "Suppressed",
        &format!(
            "{} ({}%)",
            summary.suppressed,
            output::percent(summary.suppressed, summary.rows)
        ),
    );
    for reason in SuppressReason::ALL {
        let count = summary.count(reason);
        if count > 0 {
            output::print_detail(&s.dim(&format!("{reason}: {count}")));
        }
    }
    if summary.unmapped > 0 {
        output::print_check(s.warn_sym(), "Unmapped", &s.yellow(&summary.unmapped.to_string()));
    }
    if summary.exus_authors > 0 {
        output::print_check(s.info_sym(), "ExUS authors", &summary.exus_authors.to_string());
    }

    eprintln!();
    output::print_section(s, "Resolution");
    for (kind, count) in &summary.resolutions {
        let symbol = if kind == "fallback" { s.fail_sym() } else { s.ok_sym() };
        output::print_check(symbol, kind, &count.to_string());
    }

    output::print_status(
        s,
        &s.green("done"),
        &format!("{} in {}", out.display(), output::format_duration(elapsed_secs)),
    );
}

fn print_suppressed(s: &Styled, rows: &[MediaRow]) {
    eprintln!();
    output::print_section(s, "Suppressed rows");
    for row in rows.iter().filter(|r| r.suppress_flag) {
        output::print_check(s.warn_sym(), &row.publication_name, &row.resolved_permalink);
        output::print_detail(&s.dim(&row.reasons_display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        combine: CombineArgs,
    }

    const SPRINKLR: &str = "\
CreatedTime,Source,Publication Name,Media Title,Permalink,Journalist,Sentiment
2025-06-03,News,Wired,Launch,https://wired.com/a,Ann Poe,Positive
2025-06-03,News,MSN,Syndicated,https://www.msn.com/en-gb/news/x,,Neutral
";

    const CISION: &str = "\
Cision export
Generated
,
Date,Media Type,Media Outlet,Title,Link,Author,Sentiment
04-Jun-2025 09:15 AM,Online,Wired,Launch again,\"=HYPERLINK(\"\"https://wired.com/a\"\", \"\"x\"\")\",Sam Lee,Positive
";

    const OUTLETS: &str = "Vertical (FOR VLOOKUP),Outlet Name\nTech,Wired\n";
    const JOURNALISTS: &str = "Publication,Name,Geo\nWired,Ann Poe,EXUS\n";

    #[tokio::test]
    async fn test_combine_offline() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            path.display().to_string()
        };
        let sprinklr = write("sprinklr.csv", SPRINKLR);
        let cision = write("cision.csv", CISION);
        let outlets = write("outlets.csv", OUTLETS);
        let journalists = write("journalists.csv", JOURNALISTS);
        let out = dir.path().join("out.csv");

        let args = Harness::parse_from([
            "t",
            "--sprinklr",
            sprinklr.as_str(),
            "--cision",
            cision.as_str(),
            "--outlets",
            outlets.as_str(),
            "--journalists",
            journalists.as_str(),
            "--out",
            out.to_str().unwrap(),
            "--no-resolve",
            "--plain-links",
        ])
        .combine;

        run(&args).await.unwrap();

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);

        let headers = reader.headers().unwrap().clone();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();

        // Excluded-region author on the first row.
        assert_eq!(&rows[0][col("ExUS Author")], "Yes");
        assert_eq!(&rows[0][col("Group")], "Tech");
        assert_eq!(&rows[0][col("?")], "R");

        // Non-US aggregator edition.
        assert_eq!(&rows[1][col("Outlet")], "REMOVE");
        assert_eq!(&rows[1][col("?")], "R");

        // Same article from the second vendor is a duplicate.
        assert_eq!(&rows[2][col("Source Platform")], "Cision");
        assert_eq!(&rows[2][col("Permalink")], "https://wired.com/a");
        assert!(rows[2][col("Suppress Reasons")].contains(SuppressReason::DuplicateUrl.label()));
    }

    #[tokio::test]
    async fn test_combine_workbooks() {
        use crate::workbook::write_test_workbook;

        let dir = tempfile::tempdir().unwrap();
        let sprinklr = dir.path().join("sprinklr.xlsx");
        let cision = dir.path().join("cision.xlsx");
        let master = dir.path().join("master.xlsx");
        let out = dir.path().join("out.csv");

        write_test_workbook(
            &sprinklr,
            &[(
                "Sheet1",
                vec![
                    vec!["CreatedTime", "Publication Name", "Permalink", "Journalist"],
                    vec!["2025-06-03", "Wired", "https://wired.com/a", "Ann Poe"],
                    vec!["2025-06-03", "TechRadar", "https://www.techradar.com/how-to/fix-x", ""],
                ],
            )],
        );
        write_test_workbook(
            &cision,
            &[(
                "Sheet1",
                vec![
                    vec!["Cision export"],
                    vec!["Generated"],
                    vec![],
                    vec!["Date", "Media Outlet", "Link", "Author"],
                    vec!["04-Jun-2025 09:15 AM", "Wired", r#"=HYPERLINK("https://wired.com/a", "x")"#, "Sam Lee"],
                ],
            )],
        );
        write_test_workbook(
            &master,
            &[
                (
                    reference::OUTLET_SHEET,
                    vec![
                        vec!["Vertical (FOR VLOOKUP)", "Outlet Name"],
                        vec!["Tech", "Wired"],
                        vec!["Tech", "TechRadar"],
                    ],
                ),
                (
                    reference::JOURNALIST_SHEET,
                    vec![vec!["Publication", "Name", "Geo"], vec!["Wired", "Ann Poe", "EXUS"]],
                ),
            ],
        );

        let args = Harness::parse_from([
            "t",
            "--sprinklr",
            sprinklr.to_str().unwrap(),
            "--cision",
            cision.to_str().unwrap(),
            "--reference",
            master.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--no-resolve",
            "--plain-links",
        ])
        .combine;

        run(&args).await.unwrap();

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);

        let headers = reader.headers().unwrap().clone();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();

        assert_eq!(&rows[0][col("ExUS Author")], "Yes");
        // A how-to section is not a locale.
        assert_eq!(&rows[1][col("Group")], "Tech");
        assert_eq!(&rows[1][col("?")], "");
        assert_eq!(&rows[2][col("Permalink")], "https://wired.com/a");
        assert!(rows[2][col("Suppress Reasons")].contains(SuppressReason::DuplicateUrl.label()));
    }

    #[test]
    fn test_reference_source_is_required() {
        let base = ["t", "--sprinklr", "s.csv", "--cision", "c.csv"];
        assert!(Harness::try_parse_from(base).is_err());

        let mut with_outlets_only = base.to_vec();
        with_outlets_only.extend(["--outlets", "o.csv"]);
        assert!(Harness::try_parse_from(with_outlets_only).is_err());

        let mut with_both = base.to_vec();
        with_both.extend(["--reference", "m.xlsx", "--outlets", "o.csv", "--journalists", "j.csv"]);
        assert!(Harness::try_parse_from(with_both).is_err());

        let mut with_workbook = base.to_vec();
        with_workbook.extend(["--reference", "m.xlsx"]);
        let args = Harness::try_parse_from(with_workbook).unwrap().combine;
        assert_eq!(args.reference, Some(PathBuf::from("m.xlsx")));
        assert!(args.outlets.is_none());
    }

    #[tokio::test]
    async fn test_combine_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv").display().to_string();
        let args = Harness::parse_from([
            "t",
            "--sprinklr",
            missing.as_str(),
            "--cision",
            missing.as_str(),
            "--outlets",
            missing.as_str(),
            "--journalists",
            missing.as_str(),
            "--no-resolve",
        ])
        .combine;

        assert!(run(&args).await.is_err());
    }
}
