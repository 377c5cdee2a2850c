//! Result rendering and the output file writer

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::aggregator::QueryResult;
use crate::error::{QueryError, Result};

/// One `<nation> <revenue>` line per nation with non-zero revenue, in result
/// order, revenue fixed to 4 decimals
pub fn format_result(result: &QueryResult) -> String {
    let mut out = String::new();
    for row in result.rows().iter().filter(|r| r.revenue != 0.0) {
        out.push_str(&format!("{} {:.4}\n", row.nation, row.revenue));
    }
    out
}

/// Write the rendered result to `path`.
///
/// The file is staged next to the destination and only moved into place once
/// fully written, so a failed write never leaves a partial result behind.
pub fn write_result(path: &Path, result: &QueryResult) -> Result<()> {
    let output_err = |source| QueryError::Output {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir).map_err(output_err)?;
    staged
        .write_all(format_result(result).as_bytes())
        .and_then(|_| staged.flush())
        .map_err(output_err)?;
    staged.persist(path).map_err(|err| output_err(err.error))?;
    Ok(())
}
