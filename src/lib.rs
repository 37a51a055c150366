//! `clinvar-study` explores the **clinical significance** of ClinVar variants in a gene.
//!
//! For each gene symbol, it:
//!
//! 1. Queries [MyVariant.info](https://myvariant.info) for variants annotated with the gene.
//! 1. Flattens the response into a [`VariantTable`], one row per variant.
//! 1. Prints a short preview of the table.
//! 1. Writes an interactive HTML report, `interactive_analysis_<GENE>.html`, with a bar chart of
//!    clinical significance counts next to a scatter of genomic positions.
//!
//! Genes are read from an interactive prompt until `exit`, or passed on the command line.

pub mod cli;
pub mod fetch;
pub mod render;
pub mod session;
pub mod utils;
pub mod variant;

#[doc(inline)]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::fetch::{MyVariant, VariantSource};
#[doc(inline)]
pub use crate::session::Session;
#[doc(inline)]
pub use crate::variant::VariantTable;
