use crate::error::PipelineResult;
use crate::model::LAYOUT_COLUMNS;
use crate::table::{DelimitedTable, TableRow};

use super::index::LayoutIndex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub records_total: usize,
    pub records_enriched: usize,
    pub records_passed_through: usize,
    pub lookup_misses: usize,
}

/// Builds the enriched table: every input column in its original position,
/// followed by the layout columns the input does not already carry.
///
/// Each output row starts as a copy of its input row. A layout column that
/// already exists in the input is overwritten in place when the record
/// matches, and left untouched when it does not.
pub fn enrich_table(
    table: &DelimitedTable,
    index: &LayoutIndex,
    source_column: &str,
) -> PipelineResult<(DelimitedTable, MergeStats)> {
    let source_index = table.require_column(source_column)?;

    let mut columns = table.columns.clone();
    let mut targets = [0_usize; LAYOUT_COLUMNS.len()];
    for (target, name) in targets.iter_mut().zip(LAYOUT_COLUMNS) {
        *target = match table.column_index(name) {
            Some(existing) => existing,
            None => {
                columns.push(name.to_string());
                columns.len() - 1
            }
        };
    }

    let mut stats = MergeStats::default();
    let mut rows = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let resolution = index.resolve(row.cell(source_index));
        stats.records_total += 1;
        stats.lookup_misses += resolution.misses;

        let mut values = row.values.clone();
        values.resize(columns.len(), String::new());

        match resolution.attributes {
            Some(attributes) => {
                for (&target, cell) in targets.iter().zip(attributes.to_cells()) {
                    values[target] = cell;
                }
                stats.records_enriched += 1;
            }
            None => stats.records_passed_through += 1,
        }

        rows.push(TableRow {
            line: row.line,
            values,
        });
    }

    let enriched = DelimitedTable {
        source: table.source.clone(),
        columns,
        rows,
    };

    Ok((enriched, stats))
}
