//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic; flags given here
//! override the values loaded from the config file.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use vgreport_common::{PathSubstitution, ReportConfig};

/// Build an HTML report from Valgrind XML output
#[derive(Parser, Debug)]
#[command(name = "vgreport")]
#[command(about = "Turn Valgrind XML output into a browsable source report", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Valgrind XML file name
    pub input: PathBuf,

    /// Source directory the report is built against (default ".")
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Report directory (default "html")
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print a per-file summary to stdout
    #[arg(long)]
    pub summary: bool,

    /// Group the summary by line and error kind instead of listing each error
    #[arg(long, requires = "summary")]
    pub by_kind: bool,

    /// Number of code lines to display before the error line
    #[arg(long, value_name = "N")]
    pub lines_before: Option<usize>,

    /// Number of code lines to display after the error line
    #[arg(long, value_name = "N")]
    pub lines_after: Option<usize>,

    /// Rewrite frame paths starting with FROM to start with TO (repeatable)
    #[arg(long = "substitute-path", value_name = "FROM:TO", value_parser = parse_substitution)]
    pub substitute_path: Vec<PathSubstitution>,

    /// Print the total number of errors
    #[arg(long)]
    pub number_of_errors: bool,

    /// Exit with status 1 when any error was reported
    #[arg(long)]
    pub abort_on_errors: bool,

    /// Also write report.json with the full page data
    #[arg(long)]
    pub json: bool,

    /// Config file (default: ./vgreport.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_substitution(value: &str) -> Result<PathSubstitution, String> {
    PathSubstitution::parse(value).ok_or_else(|| format!("expected FROM:TO, got {:?}", value))
}

impl Cli {
    /// Overlay command-line flags on a loaded config.
    pub fn merge(&self, mut config: ReportConfig) -> ReportConfig {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(n) = self.lines_before {
            config.lines_before = n;
        }
        if let Some(n) = self.lines_after {
            config.lines_after = n;
        }
        if self.json {
            config.json = true;
        }
        // Command-line rules are tried before the ones from the file
        if !self.substitute_path.is_empty() {
            let mut rules = self.substitute_path.clone();
            rules.append(&mut config.substitute_path);
            config.substitute_path = rules;
        }
        config
    }
}
