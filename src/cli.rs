use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "layout-enrich",
    version,
    about = "Enrich simulation results with building layout attributes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite parenthesis-delimited lists as square-bracket lists.
    Normalize(NormalizeArgs),
    /// Strip filename decorations from the source-file column.
    Clean(CleanArgs),
    /// Join simulation records with the layout table.
    Enrich(EnrichArgs),
    /// Run normalize, clean and enrich back to back.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    #[arg(long, default_value = "feed.csv")]
    pub input_path: PathBuf,

    #[arg(long, default_value = "feed2.csv")]
    pub output_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[arg(long, default_value = "feed2.csv")]
    pub input_path: PathBuf,

    #[arg(long, default_value = "cleaned_output.csv")]
    pub output_path: PathBuf,

    #[command(flatten)]
    pub cleaning: CleaningOptions,
}

#[derive(Args, Debug, Clone)]
pub struct CleaningOptions {
    #[arg(long, default_value = "SourceFile")]
    pub source_column: String,

    #[arg(long, default_value = "simulation_results_")]
    pub strip_prefix: String,

    #[arg(long, default_value = ".csv")]
    pub strip_extension: String,
}

#[derive(Args, Debug, Clone)]
pub struct EnrichArgs {
    #[arg(long, default_value = "cleaned_output.csv")]
    pub input_path: PathBuf,

    #[arg(long, default_value = "processed_scenarios.csv")]
    pub layout_path: PathBuf,

    #[arg(long, default_value = "updated_simulation_results.csv")]
    pub output_path: PathBuf,

    #[command(flatten)]
    pub join: JoinOptions,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct JoinOptions {
    #[arg(long, default_value = "SourceFile")]
    pub source_column: String,

    #[arg(long, value_enum, default_value_t = AliasCollisionPolicy::LastWins)]
    pub on_alias_collision: AliasCollisionPolicy,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    #[arg(long, default_value = "feed.csv")]
    pub input_path: PathBuf,

    #[arg(long, default_value = "processed_scenarios.csv")]
    pub layout_path: PathBuf,

    #[arg(long, default_value = "updated_simulation_results.csv")]
    pub output_path: PathBuf,

    #[arg(long, default_value = "simulation_results_")]
    pub strip_prefix: String,

    #[arg(long, default_value = ".csv")]
    pub strip_extension: String,

    #[command(flatten)]
    pub join: JoinOptions,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum AliasCollisionPolicy {
    LastWins,
    Reject,
}

impl AliasCollisionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last-wins",
            Self::Reject => "reject",
        }
    }
}
