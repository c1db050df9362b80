use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::cli::AliasCollisionPolicy;
use crate::error::{PipelineError, PipelineResult};
use crate::model::{LayoutAttributes, PositionList};
use crate::table::{DelimitedTable, TableRow};
use crate::util::split_tokens;

struct LayoutEntry {
    line: u64,
    attributes: LayoutAttributes,
}

/// Alias-keyed view over the layout table.
///
/// Every alias of one layout row points at the same entry, so all aliases of
/// a row always resolve to identical attributes. When two rows declare the
/// same alias the configured [`AliasCollisionPolicy`] decides: `LastWins`
/// keeps the row processed later, `Reject` aborts the build.
pub struct LayoutIndex {
    entries: Vec<LayoutEntry>,
    aliases: HashMap<String, usize>,
    collisions: usize,
}

/// Outcome of looking up every filename token of one `SourceFile` cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub attributes: Option<&'a LayoutAttributes>,
    pub misses: usize,
}

impl LayoutIndex {
    pub fn build(table: &DelimitedTable, policy: AliasCollisionPolicy) -> PipelineResult<Self> {
        let columns = LayoutColumns::locate(table)?;

        let mut index = Self {
            entries: Vec::with_capacity(table.rows.len()),
            aliases: HashMap::new(),
            collisions: 0,
        };

        for row in &table.rows {
            let attributes = columns.parse_row(row)?;
            let entry_id = index.entries.len();
            let aliases: Vec<String> = split_tokens(&attributes.layout_name)
                .map(ToOwned::to_owned)
                .collect();

            index.entries.push(LayoutEntry {
                line: row.line,
                attributes,
            });

            for alias in aliases {
                index.insert_alias(alias, entry_id, policy)?;
            }
        }

        debug!(
            layout_rows = index.entries.len(),
            aliases = index.aliases.len(),
            collisions = index.collisions,
            "layout index built"
        );

        Ok(index)
    }

    fn insert_alias(
        &mut self,
        alias: String,
        entry_id: usize,
        policy: AliasCollisionPolicy,
    ) -> PipelineResult<()> {
        match self.aliases.entry(alias) {
            Entry::Vacant(slot) => {
                slot.insert(entry_id);
            }
            Entry::Occupied(mut slot) => {
                let previous = *slot.get();
                if previous == entry_id {
                    return Ok(());
                }

                let first_line = self.entries[previous].line;
                let second_line = self.entries[entry_id].line;
                match policy {
                    AliasCollisionPolicy::Reject => {
                        return Err(PipelineError::AliasCollision {
                            alias: slot.key().clone(),
                            first_line,
                            second_line,
                        });
                    }
                    AliasCollisionPolicy::LastWins => {
                        debug!(
                            alias = %slot.key(),
                            first_line,
                            second_line,
                            "alias redeclared, later layout row wins"
                        );
                        slot.insert(entry_id);
                        self.collisions += 1;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, alias: &str) -> Option<&LayoutAttributes> {
        self.aliases
            .get(alias)
            .map(|&entry_id| &self.entries[entry_id].attributes)
    }

    /// Looks up each `;`-separated token of `source_file` in order. The last
    /// token that hits supplies the attributes; tokens that miss are counted.
    pub fn resolve(&self, source_file: &str) -> Resolution<'_> {
        let mut resolution = Resolution {
            attributes: None,
            misses: 0,
        };

        for token in split_tokens(source_file) {
            match self.get(token) {
                Some(attributes) => resolution.attributes = Some(attributes),
                None => {
                    debug!(token, "no layout entry for source file token");
                    resolution.misses += 1;
                }
            }
        }

        resolution
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }
}

/// Column positions of the layout attributes in the layout table.
struct LayoutColumns {
    layout_name: usize,
    n_rooms_x: usize,
    n_rooms_y: usize,
    ap_placement: usize,
    ap_positions: usize,
    mmwave_positions: usize,
    x_min: usize,
    x_max: usize,
    y_min: usize,
    y_max: usize,
    z_min: usize,
    z_max: usize,
}

impl LayoutColumns {
    fn locate(table: &DelimitedTable) -> PipelineResult<Self> {
        Ok(Self {
            layout_name: table.require_column("layout_name")?,
            n_rooms_x: table.require_column("n_rooms_x")?,
            n_rooms_y: table.require_column("n_rooms_y")?,
            ap_placement: table.require_column("ap_placement")?,
            ap_positions: table.require_column("ap_positions")?,
            mmwave_positions: table.require_column("mmwave_positions")?,
            x_min: table.require_column("x_min")?,
            x_max: table.require_column("x_max")?,
            y_min: table.require_column("y_min")?,
            y_max: table.require_column("y_max")?,
            z_min: table.require_column("z_min")?,
            z_max: table.require_column("z_max")?,
        })
    }

    fn parse_row(&self, row: &TableRow) -> PipelineResult<LayoutAttributes> {
        let text = |index: usize| row.cell(index).to_string();

        Ok(LayoutAttributes {
            layout_name: text(self.layout_name),
            n_rooms_x: text(self.n_rooms_x),
            n_rooms_y: text(self.n_rooms_y),
            ap_placement: text(self.ap_placement),
            ap_positions: parse_positions(row.line, "ap_positions", row.cell(self.ap_positions))?,
            mmwave_positions: parse_positions(
                row.line,
                "mmwave_positions",
                row.cell(self.mmwave_positions),
            )?,
            x_min: text(self.x_min),
            x_max: text(self.x_max),
            y_min: text(self.y_min),
            y_max: text(self.y_max),
            z_min: text(self.z_min),
            z_max: text(self.z_max),
        })
    }
}

fn parse_positions(line: u64, column: &str, value: &str) -> PipelineResult<PositionList> {
    PositionList::parse(value).map_err(|source| PipelineError::StructuredFieldParse {
        line,
        column: column.to_string(),
        value: value.to_string(),
        source,
    })
}
