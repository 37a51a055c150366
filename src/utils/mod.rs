//! File system helpers.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Create the parent directory of a file path, if it does not exist yet.
pub fn create_parent_dir<P>(path: &P) -> Result<PathBuf, Report>
where
    P: AsRef<Path> + Debug,
{
    let parent = match path.as_ref().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        std::fs::create_dir_all(&parent)
            .wrap_err_with(|| format!("Failed to create directory: {parent:?}"))?;
    }
    Ok(parent)
}

/// Write `contents` to `path` in one step.
///
/// The contents go to a temporary file in the same directory, which then
/// replaces `path`. Readers never see a partially written file.
///
/// ## Examples
///
/// ```rust
/// use clinvar_study::utils::write_atomic;
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("report.html");
/// write_atomic(&path, "first")?;
/// write_atomic(&path, "second")?;
/// assert_eq!(std::fs::read_to_string(&path)?, "second");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write_atomic<P>(path: &P, contents: &str) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let dir = create_parent_dir(path)?;
    let mut file = tempfile::NamedTempFile::new_in(&dir)
        .wrap_err_with(|| format!("Failed to create temporary file in: {dir:?}"))?;
    file.write_all(contents.as_bytes())
        .wrap_err_with(|| format!("Failed to write temporary file for: {path:?}"))?;
    file.persist(path).map_err(|e| eyre!("Failed to write: {path:?}: {}", e.error))?;
    Ok(())
}

/// Reduce a gene symbol to characters that are safe in a file name.
///
/// ```rust
/// use clinvar_study::utils::file_stem;
/// assert_eq!(file_stem("BRCA1"), "BRCA1");
/// assert_eq!(file_stem("HLA-DRB1"), "HLA-DRB1");
/// assert_eq!(file_stem("../etc"), "___etc");
/// ```
pub fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| match c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            true => c,
            false => '_',
        })
        .collect()
}
