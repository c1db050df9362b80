use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::cli::{CleanArgs, CleaningOptions};
use crate::table::DelimitedTable;

pub fn run(args: CleanArgs) -> Result<()> {
    let changed = clean_file(&args.input_path, &args.output_path, &args.cleaning)?;
    info!(
        input = %args.input_path.display(),
        output = %args.output_path.display(),
        column = %args.cleaning.source_column,
        changed,
        "clean completed"
    );
    Ok(())
}

/// Cleans the source column of `input` into `output`, returning how many
/// cells changed.
pub fn clean_file(input: &Path, output: &Path, options: &CleaningOptions) -> Result<usize> {
    let cleaner = SourceFileCleaner::new(&options.strip_prefix, &options.strip_extension)?;
    let mut table = DelimitedTable::read(input)?;
    let changed = cleaner.clean_table(&mut table, &options.source_column)?;
    table
        .write(output)
        .with_context(|| format!("failed to write cleaned table: {}", output.display()))?;
    Ok(changed)
}

/// Strips the run prefix, the `_<n><ext>` run-number suffix and the bare
/// extension from a filename reference in one pass.
pub struct SourceFileCleaner {
    pattern: Option<Regex>,
}

impl SourceFileCleaner {
    pub fn new(prefix: &str, extension: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        if !prefix.is_empty() {
            alternatives.push(regex::escape(prefix));
        }
        if !extension.is_empty() {
            let extension = regex::escape(extension);
            alternatives.push(format!(r"_\d+{extension}"));
            alternatives.push(extension);
        }

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let source = alternatives.join("|");
        let pattern = Regex::new(&source)
            .with_context(|| format!("failed to compile source-file cleaning regex: {source}"))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn clean<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(value, ""),
            None => Cow::Borrowed(value),
        }
    }

    pub fn clean_table(&self, table: &mut DelimitedTable, column: &str) -> Result<usize> {
        let index = table.require_column(column)?;

        let mut changed = 0;
        for row in &mut table.rows {
            let cell = &mut row.values[index];
            let cleaned = self.clean(cell).into_owned();
            if cleaned != *cell {
                *cell = cleaned;
                changed += 1;
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn cleaner() -> SourceFileCleaner {
        SourceFileCleaner::new("simulation_results_", ".csv").expect("cleaner should build")
    }

    #[test]
    fn strips_prefix_run_number_and_extension() {
        let cleaner = cleaner();
        assert_eq!(cleaner.clean("simulation_results_bldg1.csv"), "bldg1");
        assert_eq!(cleaner.clean("simulation_results_bldg1.csv_3.csv"), "bldg1");
        assert_eq!(cleaner.clean("simulation_results_bldg1_12.csv"), "bldg1");
    }

    #[test]
    fn keeps_underscored_names_without_extension() {
        assert_eq!(cleaner().clean("grid_3x3_corner"), "grid_3x3_corner");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let cleaner = cleaner();
        for raw in [
            "simulation_results_bldg1.csv",
            "simulation_results_bldg1_alt_2.csv",
            "bldg1;bldg2",
            "",
        ] {
            let once = cleaner.clean(raw).into_owned();
            let twice = cleaner.clean(&once).into_owned();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn empty_configuration_is_a_no_op() {
        let cleaner = SourceFileCleaner::new("", "").expect("cleaner should build");
        assert_eq!(cleaner.clean("simulation_results_a.csv"), "simulation_results_a.csv");
    }

    #[test]
    fn clean_table_touches_only_the_source_column() {
        let mut table = DelimitedTable::new(
            vec!["Time[s]".to_string(), "SourceFile".to_string()],
            vec![
                vec!["a.csv".to_string(), "simulation_results_roomA.csv".to_string()],
                vec!["1".to_string(), "roomB".to_string()],
            ],
        );

        let changed = cleaner()
            .clean_table(&mut table, "SourceFile")
            .expect("clean table");

        assert_eq!(changed, 1);
        assert_eq!(table.rows[0].values, vec!["a.csv", "roomA"]);
        assert_eq!(table.rows[1].values, vec!["1", "roomB"]);
    }

    #[test]
    fn clean_file_trims_headers_and_rewrites_column() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("feed2.csv");
        let output = dir.path().join("cleaned_output.csv");
        fs::write(
            &input,
            "RSSI ; SourceFile \n-60;simulation_results_roomA_1.csv\n",
        )
        .expect("write fixture");

        let options = CleaningOptions {
            source_column: "SourceFile".to_string(),
            strip_prefix: "simulation_results_".to_string(),
            strip_extension: ".csv".to_string(),
        };
        let changed = clean_file(&input, &output, &options).expect("clean file");

        assert_eq!(changed, 1);
        assert_eq!(
            fs::read_to_string(&output).expect("read output"),
            "RSSI;SourceFile\n-60;roomA\n"
        );
    }

    #[test]
    fn clean_file_requires_the_source_column() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let input = dir.path().join("feed2.csv");
        fs::write(&input, "RSSI;Other\n-60;x\n").expect("write fixture");

        let options = CleaningOptions {
            source_column: "SourceFile".to_string(),
            strip_prefix: "simulation_results_".to_string(),
            strip_extension: ".csv".to_string(),
        };
        let err = clean_file(&input, &dir.path().join("out.csv"), &options)
            .expect_err("missing column should fail");
        assert!(err.to_string().contains("SourceFile"));
    }
}
