//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Builds and checks the star-pentagon trajectory dataset
#[derive(Parser, Debug)]
#[command(name = "vertex-pursuit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./vertex-pursuit.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load, segment and join everything into the master dataset
    Build {
        /// Directory of SHSA_<participant>_<trial>.csv files
        #[arg(long)]
        trajectories: Option<PathBuf>,

        /// Consensus evaluation CSV
        #[arg(long)]
        evaluations: Option<PathBuf>,

        /// Master dataset CSV to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the run summary as JSON here
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Worker threads (0 = one per core)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Check raw trajectory files without building anything
    Validate {
        /// A raw file or a directory of them
        path: PathBuf,
    },

    /// Show the sub-trial boundaries of one raw file
    Segment {
        /// Raw trajectory file
        file: PathBuf,
    },

    /// Partition a master dataset into train/test by participant
    Split {
        /// Master dataset CSV
        master: PathBuf,

        /// Directory for train.csv and test.csv
        #[arg(long)]
        out_dir: PathBuf,

        /// Share of participants held out
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,

        /// Shuffle seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
