use std::path::PathBuf;

use clap::Parser;


/// Compute the E-value of a nucleotide alignment score using the Karlin-Altschul
/// parameters tabulated in BLAST's blast_stat.c
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// BLAST source file with the blastn_values tables, optionally gzipped
    #[arg(short = 'i', long, default_value = "blast_stat.c")]
    #[clap(help_heading = "Inputs")]
    pub blast_stat: PathBuf,

    /// List all scoring schemes found in the table and exit
    #[arg(long, conflicts_with = "dump_json")]
    #[clap(help_heading = "Outputs")]
    pub list: bool,

    /// Write the parsed table as JSON to standard output and exit
    #[arg(long)]
    #[clap(help_heading = "Outputs")]
    pub dump_json: bool,

    /// Reward for matching bases
    #[arg(short = 'r', long = "match", default_value = "5")]
    #[clap(help_heading = "Scoring scheme")]
    pub reward: i32,

    /// Penalty for mismatching bases
    #[arg(short = 'q', long = "mismatch", default_value = "4")]
    #[clap(help_heading = "Scoring scheme")]
    pub penalty: i32,

    /// Cost for opening a new gap
    #[arg(short = 'o', long, default_value = "8")]
    #[clap(help_heading = "Scoring scheme")]
    pub gap_open: i32,

    /// Cost for extending a gap
    #[arg(short = 'e', long, default_value = "6")]
    #[clap(help_heading = "Scoring scheme")]
    pub gap_extend: i32,

    /// Length of the query sequence
    #[arg(short = 'Q', long, default_value = "20000")]
    #[clap(help_heading = "Alignment")]
    pub query_length: u64,

    /// Length of the target sequence or database
    #[arg(short = 'T', long, default_value = "500000000")]
    #[clap(help_heading = "Alignment")]
    pub target_length: u64,

    /// Raw alignment score
    #[arg(short = 's', long = "score", default_value = "1400", allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment")]
    pub alignment_score: f64,
}
