use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use fes_core::errors::{ErrorInfo, FesError};

use crate::grid::Grid;

/// Renders `(x, prediction)` rows as `%8.2f  %8.3f` lines.
pub fn format_fes(grid: &Grid, predictions: &[f64]) -> Result<String, FesError> {
    if grid.len() != predictions.len() {
        return Err(FesError::shape("fes_rows", "prediction", grid.len(), predictions.len()));
    }
    let mut out = String::with_capacity(grid.len() * 20);
    for (x, y) in grid.points().iter().zip(predictions) {
        // writing into a String cannot fail
        let _ = writeln!(out, "{x:8.2}  {y:8.3}");
    }
    Ok(out)
}

/// Writes the formatted curve to `path`, creating parent directories.
pub fn write_fes<P: AsRef<Path>>(path: P, grid: &Grid, predictions: &[f64]) -> Result<Vec<u8>, FesError> {
    let path = path.as_ref();
    let body = format_fes(grid, predictions)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| io_error("fes_dir", err, path))?;
    }
    fs::write(path, body.as_bytes()).map_err(|err| io_error("fes_write", err, path))?;
    Ok(body.into_bytes())
}

pub(crate) fn io_error(code: &str, err: impl ToString, path: &Path) -> FesError {
    FesError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_use_fixed_width_columns() {
        let grid = Grid::from_points(vec![-1.5, 0.0, 1.25]);
        let text = format_fes(&grid, &[12.3456, -0.0004, 3.0]).expect("format");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "   -1.50    12.346");
        assert_eq!(lines[1], "    0.00    -0.000");
        assert_eq!(lines[2], "    1.25     3.000");
        assert!(text.ends_with('\n'));
    }
}
