use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use xmi2hpo::fetch::OboSource;
use xmi2hpo::{Config, HpoTermId, OBO_URL, TABLE_FILENAME};

/// Map HPO terms to xmi files from cTAKES
#[derive(Debug, Parser)]
#[command(name = "xmi2hpo", version, about)]
struct Cli {
    /// Local path to the folder with the patient xmi files
    #[arg(short, long, alias = "input_path")]
    input_path: PathBuf,

    /// Local path to the folder to store the results
    #[arg(short, long, alias = "output_path")]
    output_path: PathBuf,

    /// Use a local hp.obo file instead of downloading it
    #[arg(long, conflicts_with = "obo_url")]
    obo: Option<PathBuf>,

    /// URL of the hp.obo file
    #[arg(long, default_value = OBO_URL)]
    obo_url: String,

    /// Location of the HPO - UMLS lookup table
    #[arg(long, default_value = TABLE_FILENAME)]
    table: PathBuf,

    /// Load an existing lookup table instead of rebuilding it
    #[arg(long)]
    reuse_table: bool,

    /// Root term of the HPO category to map to
    #[arg(long, default_value = "HP:0000118", value_parser = parse_term_id)]
    root: HpoTermId,

    /// Only map to the root term itself, not its descendants
    #[arg(long)]
    root_only: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new(&self.input_path, &self.output_path);
        config.obo = match &self.obo {
            Some(path) => OboSource::File(path.clone()),
            None => OboSource::Url(self.obo_url.clone()),
        };
        config.table = self.table.clone();
        config.reuse_table = self.reuse_table;
        config.root = self.root;
        config.include_descendants = !self.root_only;
        config
    }
}

fn parse_term_id(s: &str) -> Result<HpoTermId, String> {
    HpoTermId::try_from(s).map_err(|err| err.to_string())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("xmi2hpo error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = cli.config();
    let summary = config.run().with_context(|| {
        format!(
            "failed to map {} to {}",
            config.input_path.display(),
            config.output_path.display()
        )
    })?;

    tracing::info!(
        "Wrote {} result files to {}",
        summary.files,
        config.output_path.display()
    );
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("XMI2HPO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
