//! Render a [`VariantTable`] as a standalone interactive HTML report.
//!
//! The report holds two panels side by side:
//!
//! 1. A bar chart of clinical significance counts, over all rows.
//! 2. A scatter of genomic positions, over rows with a known position only.
//!
//! Everything is inline SVG and CSS, with hover text on every bar and marker,
//! so the file opens offline in any browser.

pub mod svg;

use crate::utils::{file_stem, write_atomic};
use crate::variant::VariantTable;
use chrono::Local;
use color_eyre::eyre::{eyre, Report, Result};
use indoc::formatdoc;
use log::info;
use std::fmt::{Debug, Write};
use std::path::{Path, PathBuf};
use svg::{escape, Frame};

/// Title of the bar panel.
pub const BAR_TITLE: &str = "Clinical Significance Distribution";
/// Title of the scatter panel.
pub const SCATTER_TITLE: &str = "Variant Positions on Chromosome";

const WIDTH: f64 = 1100.0;
const HEIGHT: f64 = 500.0;

const BAR_FRAME: Frame = Frame { left: 70.0, top: 80.0, width: 445.0, height: 320.0 };
const SCATTER_FRAME: Frame = Frame { left: 615.0, top: 80.0, width: 445.0, height: 320.0 };

// ----------------------------------------------------------------------------
// Figure

/// A positioned variant on the scatter panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    /// Genomic position.
    pub x: u64,
    pub id: String,
    pub significance: String,
    /// Hex fill colour.
    pub color: String,
}

/// Everything needed to draw the report, derived from one [`VariantTable`].
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub gene: String,
    /// `(category, count)` in display order.
    pub bars: Vec<(String, usize)>,
    pub markers: Vec<Marker>,
    /// Number of rows in the source table.
    pub variants: usize,
}

impl Figure {
    /// Build the figure for a non-empty table.
    ///
    /// Markers are coloured by their row index along the Viridis scale.
    pub fn new(table: &VariantTable) -> Result<Figure, Report> {
        if table.is_empty() {
            return Err(eyre!("No data to plot for gene: {}", table.gene));
        }

        let positioned = table.positioned();
        let first = positioned.first().map(|(i, _, _)| *i).unwrap_or(0);
        let last = positioned.last().map(|(i, _, _)| *i).unwrap_or(0);
        let span = (last - first).max(1) as f64;

        let markers = positioned
            .into_iter()
            .map(|(i, x, row)| Marker {
                x,
                id: row.id.clone(),
                significance: row.significance.clone(),
                color: svg::viridis((i - first) as f64 / span),
            })
            .collect();

        Ok(Figure {
            gene: table.gene.clone(),
            bars: table.significance_counts(),
            markers,
            variants: table.len(),
        })
    }

    /// Overall report title.
    pub fn title(&self) -> String {
        format!("Interactive ClinVar Analysis: {}", self.gene)
    }

    /// Render the complete HTML document.
    pub fn to_html(&self) -> Result<String, Report> {
        let title = escape(&self.title());

        let mut body = String::new();
        writeln!(
            body,
            "<svg width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\" aria-label=\"{title}\">"
        )?;
        writeln!(body, "<text x=\"{}\" y=\"34\" class=\"title\" text-anchor=\"middle\">{title}</text>", WIDTH / 2.0)?;
        for (frame, panel_title) in [(BAR_FRAME, BAR_TITLE), (SCATTER_FRAME, SCATTER_TITLE)] {
            writeln!(
                body,
                "<text x=\"{}\" y=\"{}\" class=\"subtitle\" text-anchor=\"middle\">{panel_title}</text>",
                frame.center_x(),
                frame.top - 14.0
            )?;
        }
        svg::bar_panel(&mut body, &BAR_FRAME, &self.bars)?;
        svg::scatter_panel(&mut body, &SCATTER_FRAME, &self.markers)?;
        writeln!(body, "</svg>")?;

        let html = formatdoc!(
            r#"<!DOCTYPE html>
            <html lang="en">
            <head>
            <meta charset="utf-8"/>
            <meta name="viewport" content="width=device-width, initial-scale=1"/>
            <title>{title}</title>
            <style>
            body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#2a3f5f;background:#fff;}}
            svg{{background:#fff;}}
            .title{{font-size:20px;fill:#2a3f5f;}}
            .subtitle{{font-size:15px;fill:#2a3f5f;}}
            .tick{{font-size:11px;fill:#506784;}}
            .axis{{font-size:12px;fill:#2a3f5f;}}
            .note{{font-size:13px;fill:#888;}}
            .grid{{stroke:#ebf0f8;stroke-width:1;}}
            .bar rect:hover{{opacity:0.75;}}
            .marker{{stroke:#fff;stroke-width:0.5;}}
            .marker:hover{{stroke:#2a3f5f;stroke-width:2;}}
            .meta{{color:#666;font-size:12px;}}
            </style>
            </head>
            <body>
            {body}<p class="meta">{variants} variants, {positioned} with a known position. Hover over bars and markers for details. Generated {date}.</p>
            </body>
            </html>
            "#,
            title = title,
            body = body,
            variants = self.variants,
            positioned = self.markers.len(),
            date = Local::now().format("%Y-%m-%d %H:%M:%S"),
        );

        Ok(html)
    }
}

// ----------------------------------------------------------------------------
// Functions

/// Report path for a gene: `<output_dir>/interactive_analysis_<GENE>.html`.
///
/// ```rust
/// use clinvar_study::render::output_path;
/// let path = output_path("tp53", &".");
/// assert_eq!(path, std::path::Path::new("./interactive_analysis_TP53.html"));
/// ```
pub fn output_path<P>(gene: &str, output_dir: &P) -> PathBuf
where
    P: AsRef<Path>,
{
    let stem = file_stem(&gene.to_uppercase());
    output_dir.as_ref().join(format!("interactive_analysis_{stem}.html"))
}

/// Render the table to its report path, replacing any previous report.
///
/// Returns an error, and writes nothing, when there is no table or it has no rows.
pub fn plot<P>(table: Option<&VariantTable>, output_dir: &P) -> Result<PathBuf, Report>
where
    P: AsRef<Path> + Debug,
{
    let table = match table {
        Some(table) if !table.is_empty() => table,
        _ => return Err(eyre!("No data to plot.")),
    };

    info!("Generating interactive visualization for {}...", table.gene);
    let html = Figure::new(table)?.to_html()?;

    let path = output_path(&table.gene, output_dir);
    write_atomic(&path, &html)?;
    info!("Interactive graph saved as: {path:?}");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Position, VariantRow};
    use itertools::Itertools;

    fn row(id: &str, position: Position, significance: &str) -> VariantRow {
        VariantRow {
            id: id.to_string(),
            gene: "BRCA2".to_string(),
            chromosome: "13".to_string(),
            position,
            significance: significance.to_string(),
        }
    }

    fn table() -> VariantTable {
        let mut table = VariantTable::new("brca2");
        table.rows = vec![
            row("v1", Position::Known(100), "Pathogenic"),
            row("v2", Position::Unknown, "Benign"),
            row("v3", Position::Known(200), "Pathogenic"),
        ];
        table
    }

    #[test]
    fn figure_from_example() -> Result<(), Report> {
        let figure = Figure::new(&table())?;
        assert_eq!(figure.bars, [("Pathogenic".to_string(), 2), ("Benign".to_string(), 1)]);
        let xs = figure.markers.iter().map(|m| m.x).collect_vec();
        assert_eq!(xs, [100, 200]);
        assert_eq!(figure.markers[0].color, svg::viridis(0.0));
        assert_eq!(figure.markers[1].color, svg::viridis(1.0));
        assert_eq!(figure.title(), "Interactive ClinVar Analysis: BRCA2");
        Ok(())
    }

    #[test]
    fn unknown_positions_only_in_bars() -> Result<(), Report> {
        let html = Figure::new(&table())?.to_html()?;
        assert!(html.contains("<title>Benign: 1</title>"));
        assert!(!html.contains("Variant: v2"));
        assert!(html.contains("Variant: v1"));
        assert!(html.contains("Variant: v3"));
        assert!(html.contains(BAR_TITLE));
        assert!(html.contains(SCATTER_TITLE));
        Ok(())
    }

    #[test]
    fn plot_writes_report() -> Result<(), Report> {
        let dir = tempfile::tempdir()?;
        let path = plot(Some(&table()), &dir.path())?;
        assert_eq!(path, dir.path().join("interactive_analysis_BRCA2.html"));
        let html = std::fs::read_to_string(&path)?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));

        // a second render replaces the first
        let mut smaller = table();
        smaller.rows.truncate(1);
        plot(Some(&smaller), &dir.path())?;
        let html = std::fs::read_to_string(&path)?;
        assert!(!html.contains("Variant: v3"));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn plot_without_data() -> Result<(), Report> {
        let dir = tempfile::tempdir()?;
        assert!(plot(None, &dir.path()).is_err());
        assert!(plot(Some(&VariantTable::new("BRCA2")), &dir.path()).is_err());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
