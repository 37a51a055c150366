//! The [`VariantRow`] and [`VariantTable`] built from one query.

pub mod decode;

use crate::variant::decode::Hit;
use clinvar_table::Table;
use color_eyre::eyre::{Report, Result, WrapErr};
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

/// Sentinel for any field that was absent or could not be parsed.
pub const UNKNOWN: &str = "Unknown";

/// Column names of the [`VariantTable`], in display order.
pub const HEADERS: &[&str] = &["VariantID", "Gene", "Chromosome", "Position", "ClinicalSignificance"];

// ----------------------------------------------------------------------------
// Position

/// Genomic start position of a variant.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Position {
    Known(u64),
    #[default]
    Unknown,
}

impl Position {
    /// Returns the coordinate, if known.
    pub fn known(&self) -> Option<u64> {
        match self {
            Position::Known(pos) => Some(*pos),
            Position::Unknown => None,
        }
    }
}

impl From<Option<u64>> for Position {
    fn from(pos: Option<u64>) -> Self {
        pos.map(Position::Known).unwrap_or_default()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Position::Known(pos) => write!(f, "{pos}"),
            Position::Unknown => write!(f, "{UNKNOWN}"),
        }
    }
}

// ----------------------------------------------------------------------------
// Variant Row

/// One flattened variant record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VariantRow {
    /// Source-assigned identifier.
    pub id: String,
    /// Uppercased gene symbol.
    pub gene: String,
    /// Chromosome name or [`UNKNOWN`].
    pub chromosome: String,
    /// Genomic start position.
    pub position: Position,
    /// Clinical significance category or [`UNKNOWN`].
    pub significance: String,
}

impl VariantRow {
    /// Flatten a decoded [`Hit`] into a row.
    ///
    /// ```rust
    /// use clinvar_study::variant::{decode::Hit, Position, VariantRow};
    /// let hit = Hit::from_value(serde_json::json!({
    ///     "_id": "chr17:g.7577120C>T",
    ///     "clinvar": {"chrom": "17", "hg19": {"start": 7577120}, "rcv": [{"clinical_significance": "Pathogenic"}]}
    /// }));
    /// let row = VariantRow::from_hit(&hit, "TP53");
    /// assert_eq!(row.position, Position::Known(7577120));
    /// assert_eq!(row.significance, "Pathogenic");
    /// ```
    pub fn from_hit(hit: &Hit, gene: &str) -> VariantRow {
        let clinvar = hit.clinvar();
        VariantRow {
            id: hit.id.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            gene: gene.to_uppercase(),
            chromosome: clinvar.and_then(|c| c.chromosome()).unwrap_or_else(|| UNKNOWN.to_string()),
            position: clinvar.and_then(|c| c.position()).into(),
            significance: clinvar
                .and_then(|c| c.significance())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Row values in [`HEADERS`] order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.gene.clone(),
            self.chromosome.clone(),
            self.position.to_string(),
            self.significance.clone(),
        ]
    }
}

// ----------------------------------------------------------------------------
// Variant Table

/// Ordered collection of [`VariantRow`] from a single query, in response order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VariantTable {
    /// Uppercased gene symbol the table was fetched for.
    pub gene: String,
    pub rows: Vec<VariantRow>,
}

impl Display for VariantTable {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "gene: {}, variants: {}", self.gene, self.rows.len())
    }
}

impl VariantTable {
    /// Create an empty table for a gene.
    pub fn new(gene: &str) -> Self {
        VariantTable { gene: gene.to_uppercase(), rows: Vec::new() }
    }

    /// Build a table from decoded hits, preserving their order.
    pub fn from_hits<'h, I>(gene: &str, hits: I) -> Self
    where
        I: IntoIterator<Item = &'h Hit>,
    {
        let mut table = VariantTable::new(gene);
        table.rows = hits.into_iter().map(|hit| VariantRow::from_hit(hit, gene)).collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count rows per clinical significance category.
    ///
    /// Ordered by count (descending), ties by first appearance.
    ///
    /// ```rust
    /// use clinvar_study::variant::{Position, VariantRow, VariantTable};
    /// let row = |position, significance: &str| VariantRow {
    ///     id: String::new(), gene: "BRCA1".into(), chromosome: "17".into(),
    ///     position, significance: significance.into(),
    /// };
    /// let mut table = VariantTable::new("BRCA1");
    /// table.rows = vec![
    ///     row(Position::Known(100), "Pathogenic"),
    ///     row(Position::Unknown, "Benign"),
    ///     row(Position::Known(200), "Pathogenic"),
    /// ];
    /// let counts = table.significance_counts();
    /// assert_eq!(counts, [("Pathogenic".to_string(), 2), ("Benign".to_string(), 1)]);
    /// ```
    pub fn significance_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        self.rows.iter().for_each(|row| {
            match counts.iter_mut().find(|(category, _)| *category == row.significance) {
                Some((_, count)) => *count += 1,
                None => counts.push((row.significance.clone(), 1)),
            }
        });
        // stable sort keeps first appearance order for ties
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Rows with a known position, paired with their row index and coordinate.
    pub fn positioned(&self) -> Vec<(usize, u64, &VariantRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.position.known().map(|pos| (i, pos, row)))
            .collect_vec()
    }

    /// Convert to a generic [`Table`] of strings.
    pub fn to_table(&self) -> Table<String> {
        let mut table = Table::new();
        table.headers = HEADERS.iter().map(|h| h.to_string()).collect();
        table.rows = self.rows.iter().map(VariantRow::values).collect();
        table
    }

    /// Pretty table of the first `n` rows.
    pub fn preview(&self, n: usize) -> tabled::Table {
        self.to_table().head(n).to_tabled()
    }

    /// Write the table as a delimited file (delimiter from the extension).
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        info!("Writing variant table: {path:?}");
        self.to_table()
            .write(path, None)
            .wrap_err_with(|| format!("Failed to write variant table for {}: {path:?}", self.gene))
    }
}
