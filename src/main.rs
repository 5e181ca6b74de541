use anyhow::Result;
use clap::Parser;
use cobmap::cli::{Cli, Commands};
use cobmap::commands::{analyze_project, init_config, AnalyzeConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            top,
            verbosity,
        } => {
            init_logging(verbosity);
            analyze_project(AnalyzeConfig {
                path,
                format: format.into(),
                output,
                config_file: config,
                top,
            })
        }
        Commands::Init { force } => {
            init_logging(0);
            init_config(force)
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
