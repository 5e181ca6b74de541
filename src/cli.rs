use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::io::output;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary on the terminal
    Terminal,
    /// Machine-readable JSON
    Json,
    /// Markdown assessment report
    Markdown,
}

impl From<OutputFormat> for output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => output::OutputFormat::Terminal,
            OutputFormat::Json => output::OutputFormat::Json,
            OutputFormat::Markdown => output::OutputFormat::Markdown,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cobmap")]
#[command(about = "COBOL migration complexity and legacy asset analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze legacy assets and score migration difficulty
    Analyze {
        /// File or directory to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to cobmap.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show only the N most difficult programs
        #[arg(long = "top", visible_alias = "head")]
        top: Option<usize>,

        /// Increase verbosity level (can be repeated: -v, -vv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
