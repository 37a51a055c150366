//! The interactive study [`Session`]: prompt, fetch, preview, plot, repeat.

use crate::fetch::{fetch, VariantSource};
use crate::render;
use crate::utils::{create_parent_dir, file_stem};
use crate::variant::{VariantTable, HEADERS};
use crate::Cli;
use color_eyre::eyre::{Report, Result, WrapErr};
use indoc::indoc;
use log::{error, info};
use std::io::{BufRead, ErrorKind, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::mpsc;

/// Number of rows shown in the data preview.
pub const PREVIEW_ROWS: usize = 5;

const BANNER: &str = indoc! {"

    ==================================================
       REAL-TIME INTERACTIVE CLINVAR STUDY TOOL
    ==================================================
    This tool connects to MyVariant.info (NCBI/ClinVar) for real data."
};

const PROMPT: &str = "\nEnter Gene Symbol (e.g., TP53, BRCA1, CFTR) or 'exit': ";

/// Lines buffered between the reader thread and the session.
const LINE_BUFFER: usize = 16;

// ----------------------------------------------------------------------------
// Input

/// One line of user input.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    /// The exit keyword, in any case.
    Exit,
    /// A blank line.
    Empty,
    /// A trimmed gene symbol.
    Gene(String),
}

impl FromStr for Input {
    type Err = Report;

    /// Parse a line of user input.
    ///
    /// ```rust
    /// use clinvar_study::session::Input;
    /// use std::str::FromStr;
    /// assert_eq!(Input::from_str("  EXIT ")?, Input::Exit);
    /// assert_eq!(Input::from_str("\n")?, Input::Empty);
    /// assert_eq!(Input::from_str(" tp53\n")?, Input::Gene("tp53".to_string()));
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    fn from_str(line: &str) -> Result<Self, Report> {
        let line = line.trim();
        let input = match line {
            "" => Input::Empty,
            _ if line.eq_ignore_ascii_case("exit") => Input::Exit,
            _ => Input::Gene(line.to_string()),
        };
        Ok(input)
    }
}

// ----------------------------------------------------------------------------
// Session

/// Holds the variant source, the configuration, and the most recent table.
#[derive(Debug)]
pub struct Session<S> {
    source: S,
    args: Cli,
    /// Table of the latest fetch, replaced wholesale by the next one.
    table: Option<VariantTable>,
}

impl<S> Session<S>
where
    S: VariantSource,
{
    pub fn new(source: S, args: Cli) -> Self {
        Session { source, args, table: None }
    }

    /// The table of the latest successful fetch.
    pub fn table(&self) -> Option<&VariantTable> {
        self.table.as_ref()
    }

    /// Fetch the table of a gene, replacing the current one.
    ///
    /// Failures are logged and reported as no data.
    pub async fn fetch(&mut self, gene: &str) -> Option<&VariantTable> {
        self.table = None;
        self.table = match fetch(&self.source, gene, self.args.size).await {
            Ok(Some(table)) => Some(table),
            Ok(None) => {
                error!("No data found for gene: {gene}");
                None
            }
            Err(e) => {
                error!("Failed to fetch data: {e:?}");
                None
            }
        };
        self.table.as_ref()
    }

    /// Fetch, preview, and plot one gene.
    ///
    /// Returns the report path, or [`None`] if the gene had no data.
    pub async fn process(&mut self, gene: &str) -> Result<Option<PathBuf>, Report> {
        self.fetch(gene).await;
        let table = match &self.table {
            Some(table) => table,
            None => return Ok(None),
        };

        println!("\nData Preview (First {PREVIEW_ROWS} rows):");
        println!("{}", table.preview(PREVIEW_ROWS));
        println!("[{} rows x {} columns]", table.len(), HEADERS.len());

        if self.args.table {
            let path = self.args.output_dir.join(format!("variants_{}.tsv", file_stem(&table.gene)));
            create_parent_dir(&path)?;
            table.write(&path)?;
        }

        let path = render::plot(Some(table), &self.args.output_dir)?;
        Ok(Some(path))
    }

    /// Process the genes given on the command line, or prompt for genes on stdin.
    pub async fn start(&mut self) -> Result<(), Report> {
        if self.args.gene.is_empty() {
            let lines = read_lines(std::io::BufReader::new(std::io::stdin()));
            return self.run(lines).await;
        }

        for gene in self.args.gene.clone() {
            self.step(&gene).await;
        }
        Ok(())
    }

    /// Interactive loop over input `lines` until exit, end of input, or Ctrl-C.
    pub async fn run(&mut self, mut lines: mpsc::Receiver<std::io::Result<String>>) -> Result<(), Report> {
        println!("{BANNER}");

        loop {
            print!("{PROMPT}");
            std::io::stdout().flush().wrap_err("Failed to flush stdout.")?;

            let line = tokio::select! {
                line = lines.recv() => line,
                _ = tokio::signal::ctrl_c() => break,
            };

            let line = match line {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    error!("Failed to read input: {e}");
                    continue;
                }
                // end of input
                None => break,
            };

            let gene = match Input::from_str(&line)? {
                Input::Exit => {
                    println!("Exiting. Goodbye!");
                    break;
                }
                Input::Empty => continue,
                Input::Gene(gene) => gene,
            };

            tokio::select! {
                _ = self.step(&gene) => (),
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        Ok(())
    }

    /// Process one gene, logging any error instead of returning it.
    async fn step(&mut self, gene: &str) {
        match self.process(gene).await {
            Ok(Some(path)) => {
                println!("\n[Action] Please open {path:?} in your browser to interact with the graph.")
            }
            Ok(None) => info!("No report written for gene: {}", gene.to_uppercase()),
            Err(e) => error!("An unexpected error occurred: {e:?}"),
        }
    }
}

// ----------------------------------------------------------------------------
// Functions

/// Read lines of `reader` on a dedicated thread, outside the runtime.
///
/// Invalid UTF-8 is replaced rather than rejected.
/// The channel closes at end of input, after a read error, or once the
/// receiver is dropped.
///
/// ```rust
/// use clinvar_study::session::read_lines;
/// let mut lines = read_lines(&b"TP53\r\n\xffBRCA1"[..]);
/// assert_eq!(lines.blocking_recv().transpose()?, Some("TP53\r\n".to_string()));
/// assert_eq!(lines.blocking_recv().transpose()?, Some("\u{FFFD}BRCA1".to_string()));
/// assert!(lines.blocking_recv().is_none());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn read_lines<R>(mut reader: R) -> mpsc::Receiver<std::io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(LINE_BUFFER);
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let line = match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => Ok(String::from_utf8_lossy(&buf).into_owned()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
            let failed = line.is_err();
            if sender.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    receiver
}
