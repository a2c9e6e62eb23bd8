//! Delimited text form of a [`FrameTable`].
//!
//! One frame per line, comma-separated, no header row. Blank lines are
//! skipped and fields are trimmed before parsing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::FrameTable;
use crate::util::{Error, Result};

/// Field delimiter.
pub const DELIMITER: char = ',';

/// Number formatting used when writing a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Fixed number of decimal digits.
    Fixed(usize),
    /// Shortest representation that reads back to the same value.
    Shortest,
}

impl Default for Precision {
    fn default() -> Self {
        Self::Fixed(6)
    }
}

/// Parse delimited text into a table.
pub fn parse_table(text: &str) -> Result<FrameTable> {
    let mut table: Option<FrameTable> = None;
    let mut row = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        row.clear();
        for (col, field) in line.split(DELIMITER).enumerate() {
            let field = field.trim();
            let value = field.parse::<f64>().map_err(|_| Error::Parse {
                line: line_no + 1,
                column: col + 1,
                value: field.to_string(),
            })?;
            row.push(value);
        }
        table
            .get_or_insert_with(|| FrameTable::new(row.len()))
            .push_frame(&row)?;
    }

    Ok(table.unwrap_or_default())
}

/// Render a table as delimited text, one line per frame.
///
/// Fails for a table with frames but no columns: its frames would be blank
/// lines, which [`parse_table`] skips.
pub fn format_table(table: &FrameTable, precision: Precision) -> Result<String> {
    if table.width() == 0 && table.frame_count() > 0 {
        return Err(Error::invalid_arg(format!(
            "cannot write {} frames with zero columns",
            table.frame_count()
        )));
    }
    let mut out = String::with_capacity(table.as_flat().len() * 12);
    for frame in table.frames() {
        for (i, value) in frame.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            let field = match precision {
                Precision::Fixed(digits) => format!("{:.*}", digits, value),
                Precision::Shortest => value.to_string(),
            };
            out.push_str(&field);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Read a table from a file.
pub fn read_table(path: impl AsRef<Path>) -> Result<FrameTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    tracing::info!("Reading table: {}", path.display());
    let table = parse_table(&fs::read_to_string(path)?)?;
    tracing::debug!("Table shape: {:?}", table.shape());
    Ok(table)
}

/// Write a table to a file, creating parent directories as needed.
pub fn write_table(path: impl AsRef<Path>, table: &FrameTable, precision: Precision) -> Result<()> {
    let path = path.as_ref();
    let text = format_table(table, precision)?;
    crate::create_parent_dir(path)?;
    tracing::info!("Writing {} frames to {}", table.frame_count(), path.display());
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let t = parse_table("1, 2\n\n3,4\n  \n5,6\n").unwrap();
        assert_eq!(t.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
    }

    #[test]
    fn test_parse_empty() {
        let t = parse_table("").unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_table("1,2\n3,x\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, column: 2, .. }));

        let err = parse_table("1,2\n3\n").unwrap_err();
        assert!(matches!(err, Error::RaggedTable { row: 1, expected: 2, actual: 1 }));
    }

    #[test]
    fn test_format_fixed() {
        let t = FrameTable::from_rows(&[[1.0, -0.5], [0.25, 2.0]]).unwrap();
        assert_eq!(
            format_table(&t, Precision::Fixed(6)).unwrap(),
            "1.000000,-0.500000\n0.250000,2.000000\n"
        );
        let text = format_table(&t, Precision::Fixed(8)).unwrap();
        assert_eq!(text.lines().next().unwrap(), "1.00000000,-0.50000000");
    }

    #[test]
    fn test_format_shortest() {
        let t = FrameTable::from_rows(&[[0.1, 0.0, 3.0]]).unwrap();
        let text = format_table(&t, Precision::Shortest).unwrap();
        assert_eq!(text, "0.1,0,3\n");
        assert_eq!(parse_table(&text).unwrap(), t);
    }

    #[test]
    fn test_format_zero_width() {
        assert_eq!(format_table(&FrameTable::new(0), Precision::Shortest).unwrap(), "");

        let err = format_table(&FrameTable::zeros(2, 0), Precision::Shortest).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/out.csv");
        assert!(write_table(&path, &FrameTable::zeros(2, 0), Precision::Fixed(6)).is_err());
        assert!(!dir.path().join("sub").exists());
    }
}
