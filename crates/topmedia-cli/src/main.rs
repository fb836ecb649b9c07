use clap::{Parser, Subcommand};
use std::process::ExitCode;
use topmedia_cli::commands::combine::CombineArgs;
use topmedia_cli::commands::inspect::InspectArgs;
use topmedia_cli::commands::rules_cmd::RulesArgs;
use topmedia_cli::commands::{combine, inspect, rules_cmd};
use topmedia_cli::logging::{self, LogFormat};
use topmedia_cli::output;

#[derive(Parser)]
#[command(name = "topmedia")]
#[command(about = "Combine media-monitoring exports into one reviewed, flagged sheet")]
#[command(version)]
struct Cli {
    /// Machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress and summary output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show per-row detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge both vendor exports, resolve links, classify and flag rows
    Combine(CombineArgs),

    /// Resolve and classify a single link
    Inspect(InspectArgs),

    /// Print the effective rules document
    Rules(RulesArgs),
}

fn export_output_flags(cli: &Cli) {
    let flags = [
        (cli.json, output::ENV_JSON),
        (cli.quiet, output::ENV_QUIET),
        (cli.verbose, output::ENV_VERBOSE),
        (cli.no_color, output::ENV_NO_COLOR),
    ];
    for (set, var) in flags {
        if set {
            std::env::set_var(var, "1");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    export_output_flags(&cli);
    logging::init(cli.log_format);

    let result = match &cli.command {
        Commands::Combine(args) => combine::run(args).await,
        Commands::Inspect(args) => inspect::run(args).await,
        Commands::Rules(args) => rules_cmd::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
