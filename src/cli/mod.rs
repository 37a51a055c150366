//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::fetch::{DEFAULT_SIZE, DEFAULT_URL};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// Every option has a default, so running the binary with no arguments starts
/// the interactive prompt.
/// ```rust
/// # use clap::Parser;
/// let input = ["clinvar-study", "--size", "100", "--gene", "TP53", "--gene", "BRCA1"];
/// let args = clinvar_study::Cli::parse_from(input);
/// assert_eq!(args.size, 100);
/// assert_eq!(args.gene, ["TP53", "BRCA1"]);
/// serde_json::to_string_pretty(&args)?;
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", clap(name = "clinvar-study", author, version))]
#[cfg_attr(
    feature = "cli",
    clap(about = "Interactive ClinVar study: fetch clinical significance annotations for a gene and plot them.")
)]
pub struct Cli {
    /// Set the output [Verbosity] level.
    #[cfg_attr(feature = "cli", clap(short = 'v', long))]
    #[cfg_attr(feature = "cli", clap(value_enum, default_value_t = Verbosity::default()))]
    #[cfg_attr(feature = "cli", clap(hide_possible_values = false))]
    pub verbosity: Verbosity,

    /// Maximum number of variants to retrieve per gene.
    #[cfg_attr(feature = "cli", clap(short = 's', long, default_value_t = Cli::default().size))]
    pub size: usize,

    /// Output directory for reports.
    ///
    /// If the directory does not exist, it will be created.
    #[cfg_attr(feature = "cli", clap(short = 'o', long, default_value = "."))]
    pub output_dir: PathBuf,

    /// Base URL of the MyVariant.info API.
    #[cfg_attr(feature = "cli", clap(short = 'u', long, default_value_t = Cli::default().url))]
    pub url: String,

    /// Gene symbol to process without prompting, may be repeated.
    #[cfg_attr(feature = "cli", clap(short = 'g', long))]
    pub gene: Vec<String>,

    /// Also write the variant table as a TSV next to each report.
    #[cfg_attr(feature = "cli", clap(long))]
    pub table: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Cli {
            verbosity: Verbosity::default(),
            size: DEFAULT_SIZE,
            output_dir: PathBuf::from("."),
            url: DEFAULT_URL.to_string(),
            gene: Vec::new(),
            table: false,
        }
    }
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
