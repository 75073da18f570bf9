pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hssp",
    version,
    about = "Convert protein multiple sequence alignments into HSSP reports",
    long_about = "hssp rescans every row of a multiple sequence alignment against its reference \
                  sequence, keeps the homologues above the HSSP threshold curve and writes the \
                  per-residue alignment, profile, entropy and insertion tables of an HSSP file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = auto)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an alignment into an HSSP report
    Convert(commands::convert::ConvertArgs),

    /// Show the ranked hit table of an alignment without writing a report
    Hits(commands::hits::HitsArgs),

    /// Print or write the default configuration
    Config(commands::config::ConfigArgs),
}
