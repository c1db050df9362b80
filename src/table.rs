//! `;`-delimited tables held fully in memory.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{PipelineError, PipelineResult};
use crate::util::ensure_parent_directory;

pub const DELIMITER: u8 = b';';

/// Header row plus data rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelimitedTable {
    pub source: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// 1-based line in the source file, 0 for rows built in memory.
    pub line: u64,
    pub values: Vec<String>,
}

impl TableRow {
    #[cfg(test)]
    pub fn new(values: Vec<String>) -> Self {
        Self { line: 0, values }
    }

    pub fn cell(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or_default()
    }
}

impl DelimitedTable {
    #[cfg(test)]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: PathBuf::new(),
            columns,
            rows: rows.into_iter().map(TableRow::new).collect(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn require_column(&self, column: &str) -> PipelineResult<usize> {
        self.column_index(column)
            .ok_or_else(|| PipelineError::MissingColumn {
                path: self.source.clone(),
                column: column.to_string(),
            })
    }

    pub fn read(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|source| PipelineError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .flexible(true)
            .from_reader(file);

        let csv_error = |source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);

            if record.len() > columns.len() {
                return Err(PipelineError::RaggedRow {
                    path: path.to_path_buf(),
                    line,
                    fields: record.len(),
                    columns: columns.len(),
                });
            }

            let mut values: Vec<String> = record.iter().map(ToOwned::to_owned).collect();
            values.resize(columns.len(), String::new());

            rows.push(TableRow { line, values });
        }

        Ok(Self {
            source: path.to_path_buf(),
            columns,
            rows,
        })
    }

    pub fn write(&self, path: &Path) -> PipelineResult<()> {
        let file_error = |source| PipelineError::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        ensure_parent_directory(path).map_err(file_error)?;
        let file = File::create(path).map_err(file_error)?;

        let mut writer = WriterBuilder::new().delimiter(DELIMITER).from_writer(file);
        let csv_error = |source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        };

        writer.write_record(&self.columns).map_err(csv_error)?;
        for row in &self.rows {
            writer.write_record(&row.values).map_err(csv_error)?;
        }
        writer.flush().map_err(file_error)?;

        Ok(())
    }
}

pub fn read_text(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_text(path: &Path, content: &str) -> PipelineResult<()> {
    let file_error = |source| PipelineError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent_directory(path).map_err(file_error)?;
    let mut file = File::create(path).map_err(file_error)?;
    file.write_all(content.as_bytes()).map_err(file_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn read_trims_headers_and_pads_short_rows() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("cleaned_output.csv");
        fs::write(&path, " Time[s] ;RSSI ; SourceFile\n0.5;-60;roomA\n1.0;-61\n").expect("write");

        let table = DelimitedTable::read(&path).expect("read table");

        assert_eq!(table.columns, vec!["Time[s]", "RSSI", "SourceFile"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].values, vec!["1.0", "-61", ""]);
        assert_eq!(table.require_column("SourceFile").expect("column"), 2);
    }

    #[test]
    fn read_rejects_rows_wider_than_the_header() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("wide.csv");
        fs::write(&path, "RSSI;SourceFile\n-60;roomA;EXTRA_METRIC\n").expect("write");

        match DelimitedTable::read(&path) {
            Err(PipelineError::RaggedRow {
                line,
                fields,
                columns,
                ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(fields, 3);
                assert_eq!(columns, 2);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(table) => panic!("wide row should fail, got {:?}", table.rows),
        }
    }

    #[test]
    fn read_reports_missing_file_as_file_access() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let result = DelimitedTable::read(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(PipelineError::FileAccess { .. })));
    }

    #[test]
    fn write_quotes_cells_containing_the_delimiter() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested").join("out.csv");
        let table = DelimitedTable::new(
            vec!["layout_name".to_string(), "n_rooms_x".to_string()],
            vec![vec!["bldg1;bldg1_alt".to_string(), "3".to_string()]],
        );

        table.write(&path).expect("write table");

        let raw = fs::read_to_string(&path).expect("read back");
        assert_eq!(raw, "layout_name;n_rooms_x\n\"bldg1;bldg1_alt\";3\n");

        let reread = DelimitedTable::read(&path).expect("reread");
        assert_eq!(reread.rows[0].values, table.rows[0].values);
    }
}
