use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{format_error_with_suggestions, CliError};

#[derive(Parser)]
#[command(name = "brickmap")]
#[command(about = "Brickmap - stylized brick and density map tiles")]
#[command(version)]
#[command(long_about = "
Brickmap reduces map tiles to coarse grids of palette-snapped bricks, and
renders point layers as block density tiles using adaptive quadrant queries.

Examples:
  brickmap bricks --input tile.png --output bricks.png --block-size 16
  brickmap density --points points.json --bounds 0,0,256,256 --output density.png
  brickmap config --example > brickmap.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reduce a source tile to coloured bricks
    Bricks {
        /// Source tile image (PNG)
        #[arg(short, long, required = true)]
        input: PathBuf,

        /// Output tile (PNG)
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// Brick edge length in pixels
        #[arg(long)]
        block_size: Option<u32>,

        /// Decal image drawn over every brick
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Aggregate a point layer into a density tile
    Density {
        /// JSON array of {"id", "x", "y"} points
        #[arg(long, required = true)]
        points: PathBuf,

        /// Tile extent as xmin,ymin,xmax,ymax
        #[arg(long, required = true, allow_hyphen_values = true)]
        bounds: String,

        /// Output tile (PNG)
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// Density block edge length in pixels
        #[arg(long)]
        block_size: Option<u32>,

        /// Maximum features returned per query
        #[arg(long)]
        transfer_limit: Option<usize>,

        /// Maximum quadrant subdivision depth
        #[arg(long)]
        max_depth: Option<u32>,

        /// Render even if some quadrants were still truncated at the depth limit
        #[arg(long)]
        allow_partial: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print an example configuration instead
        #[arg(long)]
        example: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread count")?;
    }

    match cli.command {
        Commands::Bricks {
            input,
            output,
            block_size,
            overlay,
        } => {
            commands::bricks::execute(&config, input, output, block_size, overlay)?;
        }

        Commands::Density {
            points,
            bounds,
            output,
            block_size,
            transfer_limit,
            max_depth,
            allow_partial,
        } => {
            commands::density::execute(
                &config,
                points,
                bounds,
                output,
                block_size,
                transfer_limit,
                max_depth,
                allow_partial,
            )?;
        }

        Commands::Config { example } => {
            let content = if example {
                Config::example_toml()?
            } else {
                config.to_toml()?
            };
            print!("{}", content);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => eprintln!("Error: {}", format_error_with_suggestions(cli_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_density_arguments() {
        let cli = Cli::parse_from([
            "brickmap",
            "density",
            "--points",
            "p.json",
            "--bounds",
            "-180,-90,180,90",
            "--output",
            "d.png",
            "--max-depth",
            "4",
            "--allow-partial",
        ]);
        match cli.command {
            Commands::Density { bounds, max_depth, allow_partial, transfer_limit, .. } => {
                assert_eq!(bounds, "-180,-90,180,90");
                assert_eq!(max_depth, Some(4));
                assert!(allow_partial);
                assert_eq!(transfer_limit, None);
            }
            _ => panic!("expected density command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["brickmap", "-vv", "config", "--example"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Config { example: true }));
    }
}
