//! Create, preview, and export a row-based [`Table`].

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A row-based [`Table`] of displayable cells.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
}

impl<T> Default for Table<T>
where
    T: Clone + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T>
where
    T: Clone + Display,
{
    /// Returns a new [`Table`] with empty headers and rows.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table: clinvar_table::Table<&str> = clinvar_table::Table::new();
    /// table.headers = vec!["VariantID", "Gene"];
    /// table.add_row(["chr17:g.7673802C>T", "TP53"])?;
    /// # assert_eq!(table.rows, vec![vec!["chr17:g.7673802C>T", "TP53"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new() }
    }

    /// Add a new row to the table.
    ///
    /// The row must be the same length as the headers, or as the existing rows
    /// when no headers have been set yet.
    ///
    /// ## Arguments
    ///
    /// * `row` - A iterable object of new data (`T`) to add as a row.
    pub fn add_row<I>(&mut self, row: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let row = row.into_iter().collect::<Vec<T>>();
        let expected = match (self.headers.is_empty(), self.rows.first()) {
            (false, _) => Some(self.headers.len()),
            (true, Some(first)) => Some(first.len()),
            (true, None) => None,
        };
        if let Some(ex) = expected {
            let new = row.len();
            if ex != new {
                return Err(eyre!("New row size ({new}) does not match existing table ({ex})."));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Returns a new [`Table`] with the same headers and at most the first `n` rows.
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table: clinvar_table::Table<&str> = clinvar_table::Table::new();
    /// table.headers = vec!["1"];
    /// table.add_row(["A"])?;
    /// table.add_row(["B"])?;
    /// table.add_row(["C"])?;
    ///
    /// assert_eq!(table.head(2).rows, [["A"], ["B"]]);
    /// assert_eq!(table.head(10).rows.len(), 3);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn head(&self, n: usize) -> Table<T> {
        let rows = self.rows[..n.min(self.rows.len())].to_vec();
        Table { headers: self.headers.clone(), rows }
    }

    /// Convert the [`Table`] into a [`tabled::Table`] for pretty printing.
    pub fn to_tabled(&self) -> tabled::Table {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(self.headers.iter().map(|h| h.to_string()));
        self.rows.iter().for_each(|row| {
            builder.push_record(row.iter().map(|v| v.to_string()));
        });
        builder.build()
    }

    /// Write [`Table`] to file [`Path`].
    ///
    /// If `delim` is [`None`], the delimiter is chosen from the file extension
    /// with [`get_delimiter`].
    ///
    /// ## Examples
    ///
    /// ```
    /// let mut table: clinvar_table::Table<&str> = clinvar_table::Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("table.tsv");
    /// table.write(&path, None)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "1\t2\t3\nA\tB\tC\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<Q>(&self, path: &Q, delim: Option<char>) -> Result<(), Report>
    where
        Q: AsRef<Path> + Debug,
    {
        let delim = match delim {
            Some(c) => c,
            None => get_delimiter(path)?,
        }
        .to_string();

        let file = File::create(path).wrap_err_with(|| format!("Unable to create file: {path:?}"))?;
        let mut writer = BufWriter::new(file);

        std::iter::once(&self.headers).chain(self.rows.iter()).try_for_each(|record| {
            writeln!(writer, "{}", record.iter().join(&delim))
                .wrap_err_with(|| format!("Unable to write table record to: {path:?}"))
        })?;
        writer.flush().wrap_err_with(|| format!("Unable to flush table file: {path:?}"))?;

        Ok(())
    }
}

/// Get delimiter based on file extension.
///
/// ## Examples
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// Note that `.txt` is assumed to be tab-delimited!
///
/// ```rust
/// use clinvar_table::get_delimiter;
///
/// assert_eq!(get_delimiter(&"file.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"file.csv")?, ',');
/// assert_eq!(get_delimiter(&"file.txt")?, '\t');
/// assert!(get_delimiter(&"file").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err(format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err(format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => {
            Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt"))
        }
    }
}
