//! `topmedia inspect <url>`: resolve and classify a single link.

use crate::commands::ResolveArgs;
use crate::output::{self, Styled};
use crate::reference;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use topmedia::locale::LocaleVerdict;
use topmedia::outlet::AggregatorVerdict;
use topmedia::pipeline::Inspection;
use topmedia::{AuthorExclusionSet, Pipeline, ReferenceData, Resolution};

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Link to inspect
    pub url: String,

    /// Publication name used for the reference lookup
    #[arg(long, default_value = "")]
    pub publication: String,

    /// Outlet reference table (CSV or XLSX)
    #[arg(long)]
    pub outlets: Option<PathBuf>,

    /// Master reference workbook, used instead of --outlets
    #[arg(long, conflicts_with = "outlets")]
    pub reference: Option<PathBuf>,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

/// Run the inspect command.
pub async fn run(args: &InspectArgs) -> Result<()> {
    let rules = args.resolve.load_rules()?;
    let reference = match (&args.reference, &args.outlets) {
        (Some(workbook), _) => reference::load_workbook(workbook, &rules)?,
        (None, Some(path)) => ReferenceData::new(reference::load_outlets(path)?, AuthorExclusionSet::default()),
        (None, None) => ReferenceData::default(),
    };

    let mut pipeline = Pipeline::new(args.resolve.resolver()?, &rules, &reference);
    let inspection = pipeline.inspect(&args.url, &args.publication).await;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&inspection)?);
        return Ok(());
    }
    if !output::is_quiet() {
        print_inspection(&Styled::new(), &inspection);
    }
    Ok(())
}

fn print_inspection(s: &Styled, inspection: &Inspection) {
    output::print_section(s, "Resolution");
    output::print_check(s.info_sym(), "Input", &inspection.raw_url);
    let symbol = match &inspection.resolution {
        Resolution::Fallback { .. } => s.fail_sym(),
        _ => s.ok_sym(),
    };
    output::print_check(symbol, "Resolved", &inspection.resolved_url);
    output::print_detail(&s.dim(inspection.resolution.kind()));
    if let Resolution::Fallback { reason } = &inspection.resolution {
        output::print_detail(&s.red(reason));
    }

    eprintln!();
    output::print_section(s, "Classification");
    match &inspection.locale {
        LocaleVerdict::Us => output::print_check(s.ok_sym(), "Locale", "US"),
        LocaleVerdict::SubdomainToken { token } => output::print_check(
            s.warn_sym(),
            "Locale",
            &s.yellow(&format!("non-US (subdomain '{token}')")),
        ),
        LocaleVerdict::PathSegment { segment } => output::print_check(
            s.warn_sym(),
            "Locale",
            &s.yellow(&format!("non-US (path '{segment}')")),
        ),
    }

    match &inspection.aggregator {
        None => output::print_check(s.info_sym(), "Aggregator", "no"),
        Some(AggregatorVerdict::Keep { locale }) => {
            output::print_check(s.ok_sym(), "Aggregator", &format!("kept ({locale})"))
        }
        Some(AggregatorVerdict::Exclude { locale }) => output::print_check(
            s.warn_sym(),
            "Aggregator",
            &s.yellow(&format!(
                "excluded ({})",
                locale.as_deref().unwrap_or("no locale")
            )),
        ),
    }

    let assignment = &inspection.assignment;
    if assignment.is_unmapped() {
        output::print_check(s.warn_sym(), "Assignment", &s.yellow("unmapped"));
    } else {
        output::print_check(
            s.ok_sym(),
            "Assignment",
            &format!("{} / {}", assignment.group, assignment.outlet),
        );
    }
    output::print_detail(&s.dim(&format!("{:?}", inspection.mapping_source).to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        inspect: InspectArgs,
    }

    #[tokio::test]
    async fn test_inspect_offline_with_outlets() {
        let dir = tempfile::tempdir().unwrap();
        let outlets = dir.path().join("outlets.csv");
        std::fs::write(&outlets, "Vertical (FOR VLOOKUP),Outlet Name\nTech,Wired\n").unwrap();

        let args = Harness::parse_from([
            "t",
            "https://www.wired.com/story/x",
            "--publication",
            "Wired",
            "--outlets",
            outlets.to_str().unwrap(),
            "--no-resolve",
        ])
        .inspect;

        assert_eq!(args.publication, "Wired");
        run(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_inspect_with_reference_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let master = dir.path().join("master.xlsx");
        crate::workbook::write_test_workbook(
            &master,
            &[
                (
                    reference::OUTLET_SHEET,
                    vec![vec!["Vertical (FOR VLOOKUP)", "Outlet Name"], vec!["Tech", "Wired"]],
                ),
                (reference::JOURNALIST_SHEET, vec![vec!["Publication", "Name", "Geo"]]),
            ],
        );

        let args = Harness::parse_from([
            "t",
            "https://www.wired.com/story/x",
            "--reference",
            master.to_str().unwrap(),
            "--no-resolve",
        ])
        .inspect;
        run(&args).await.unwrap();

        let both = Harness::try_parse_from([
            "t",
            "https://example.com",
            "--reference",
            "m.xlsx",
            "--outlets",
            "o.csv",
        ]);
        assert!(both.is_err());
    }

    #[tokio::test]
    async fn test_inspect_missing_outlets_file() {
        let args = Harness::parse_from([
            "t",
            "https://example.com",
            "--outlets",
            "/nonexistent/outlets.csv",
            "--no-resolve",
        ])
        .inspect;

        let err = run(&args).await.unwrap_err();
        assert!(err.to_string().contains("outlet reference"));
    }
}
