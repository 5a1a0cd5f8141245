use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Alchemflow Developers",
    version,
    about = "alchemflow - generate substituted geometries, collect ORCA results and screen porphyrin substitution patterns with an alchemical Taylor model.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a workflow configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S predict.max-charge=3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write one XYZ geometry per single and double substitution of a reference structure.
    Generate(GenerateArgs),
    /// Parse ORCA .out/.hess pairs into a training-set CSV.
    Collect(CollectArgs),
    /// List or count the symmetry-unique, charge-bounded substitution patterns.
    Enumerate(EnumerateArgs),
    /// Fit the Taylor model to a training set and score every candidate pattern.
    Predict(PredictArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Path to the reference structure (.xyz).
    #[arg(short, long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Directory that receives the substituted geometries.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Element to substitute, as a symbol ('C') or atomic number (6).
    #[arg(short, long, value_name = "ELEMENT")]
    pub element: Option<String>,

    /// Total charge of the reference molecule.
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub charge: Option<i32>,
}

/// Arguments for the `collect` subcommand.
#[derive(Args, Debug, Default)]
pub struct CollectArgs {
    /// Directory containing the ORCA .out and .hess files.
    #[arg(short, long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Path of the training-set CSV to write.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `enumerate` subcommand.
#[derive(Args, Debug, Default)]
pub struct EnumerateArgs {
    /// Keep patterns whose total charge lies in [-MAX, MAX].
    #[arg(short, long, value_name = "MAX", allow_negative_numbers = true)]
    pub max_charge: Option<i32>,

    /// Only print the number of patterns.
    #[arg(long)]
    pub count_only: bool,

    /// Write the patterns to a CSV file instead of standard output.
    #[arg(short, long, value_name = "PATH", conflicts_with = "count_only")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Path to the training-set CSV produced by `collect`.
    #[arg(short, long, value_name = "PATH")]
    pub training_set: Option<PathBuf>,

    /// Keep candidates whose total charge lies in [-MAX, MAX].
    #[arg(short, long, value_name = "MAX", allow_negative_numbers = true)]
    pub max_charge: Option<i32>,

    /// Maximum total degree of the Taylor expansion.
    #[arg(long, value_name = "INT")]
    pub order: Option<usize>,

    /// Directory that receives out_<count>.csv.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
