use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output column names of the layout attributes, in emission order.
pub const LAYOUT_COLUMNS: [&str; 12] = [
    "layout_name",
    "n_rooms_x",
    "n_rooms_y",
    "ap_placement",
    "ap_positions",
    "mmwave_positions",
    "x_min",
    "x_max",
    "y_min",
    "y_max",
    "z_min",
    "z_max",
];

/// A node placement. Position lists encode each one as `[x, y]` or `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coordinate {
    pub fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y] => Ok(Self::planar(*x, *y)),
            [x, y, z] => Ok(Self {
                x: *x,
                y: *y,
                z: Some(*z),
            }),
            other => Err(format!(
                "expected 2 or 3 coordinate components, found {}",
                other.len()
            )),
        }
    }
}

/// A parsed position list that still renders with the number forms it was
/// written in (`1.0` stays `1.0`, `1` stays `1`).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionList {
    coordinates: Vec<Coordinate>,
    encoded: Value,
}

impl PositionList {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let encoded: Value = serde_json::from_str(text.trim())?;
        let coordinates = Vec::<Coordinate>::deserialize(&encoded)?;
        Ok(Self {
            coordinates,
            encoded,
        })
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }
}

impl fmt::Display for PositionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoded)
    }
}

/// Everything copied from a layout row onto a matching simulation record.
///
/// Only the position lists are parsed; every other attribute is the layout
/// cell exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutAttributes {
    pub layout_name: String,
    pub n_rooms_x: String,
    pub n_rooms_y: String,
    pub ap_placement: String,
    pub ap_positions: PositionList,
    pub mmwave_positions: PositionList,
    pub x_min: String,
    pub x_max: String,
    pub y_min: String,
    pub y_max: String,
    pub z_min: String,
    pub z_max: String,
}

impl LayoutAttributes {
    /// Cell values in `LAYOUT_COLUMNS` order.
    pub fn to_cells(&self) -> [String; 12] {
        [
            self.layout_name.clone(),
            self.n_rooms_x.clone(),
            self.n_rooms_y.clone(),
            self.ap_placement.clone(),
            self.ap_positions.to_string(),
            self.mmwave_positions.to_string(),
            self.x_min.clone(),
            self.x_max.clone(),
            self.y_min.clone(),
            self.y_max.clone(),
            self.z_min.clone(),
            self.z_max.clone(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceHash {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichPaths {
    pub input_path: String,
    pub layout_path: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichCounts {
    pub layout_rows: usize,
    pub aliases_indexed: usize,
    pub alias_collisions: usize,
    pub records_total: usize,
    pub records_enriched: usize,
    pub records_passed_through: usize,
    pub lookup_misses: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichRunReport {
    pub report_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub generated_at: String,
    pub command: String,
    pub alias_collision_policy: String,
    pub paths: EnrichPaths,
    pub counts: EnrichCounts,
    pub source_hashes: Vec<SourceHash>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(text: &str) -> PositionList {
        PositionList::parse(text).expect("positions should parse")
    }

    #[test]
    fn coordinates_parse_from_two_or_three_components() {
        let list = positions("[[0, 0], [2.5, 1, 1.5]]");
        assert_eq!(list.coordinates()[0], Coordinate::planar(0.0, 0.0));
        assert_eq!(list.coordinates()[1].z, Some(1.5));
    }

    #[test]
    fn position_list_keeps_float_and_integer_forms() {
        assert_eq!(positions("[[1.0, 2.5]]").to_string(), "[[1.0,2.5]]");
        assert_eq!(positions("[[0, 0], [1, 1]]").to_string(), "[[0,0],[1,1]]");
        assert_eq!(positions(" [] ").to_string(), "[]");
    }

    #[test]
    fn position_list_rejects_wrong_arity_and_non_lists() {
        assert!(PositionList::parse("[[0,0,0,0]]").is_err());
        assert!(PositionList::parse("[(0,0)]").is_err());
        assert!(PositionList::parse("").is_err());
    }

    #[test]
    fn to_cells_follows_layout_column_order_and_keeps_cell_text() {
        let layout = LayoutAttributes {
            layout_name: "bldg1;bldg1_alt".to_string(),
            n_rooms_x: "3.0".to_string(),
            n_rooms_y: "2".to_string(),
            ap_placement: "grid".to_string(),
            ap_positions: positions("[[0,0]]"),
            mmwave_positions: positions("[]"),
            x_min: "0".to_string(),
            x_max: "20.50".to_string(),
            y_min: "-1.5".to_string(),
            y_max: "15".to_string(),
            z_min: String::new(),
            z_max: "3".to_string(),
        };

        let cells = layout.to_cells();
        assert_eq!(cells[0], "bldg1;bldg1_alt");
        assert_eq!(cells[1], "3.0");
        assert_eq!(cells[4], "[[0,0]]");
        assert_eq!(cells[5], "[]");
        assert_eq!(cells[7], "20.50");
        assert_eq!(cells[10], "");
        assert_eq!(cells[LAYOUT_COLUMNS.len() - 1], "3");
    }
}
