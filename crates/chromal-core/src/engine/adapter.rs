//! Typed projection boundary between collaborator rows and engine records.
//!
//! The collaborator (graph storage, ingestion, dataframe layer) hands over
//! loosely-typed rows; this module converts them into the fixed
//! `VertexState`/`EdgeState` shapes exactly once, up front. Field names are
//! mapped to logical roles through a schema, so every stringly-typed lookup
//! happens here and nowhere inside round logic. Any missing field or type
//! mismatch is a [`ColorError::DataContract`] naming the row, the field, and
//! what was expected — raised before the first superstep.

use std::collections::HashMap;

use crate::engine::errors::ColorError;
use crate::engine::graph::{ColorGraph, EdgeState, VertexId, VertexState};

/// A loosely-typed cell value as supplied by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Text(_) => "text",
        }
    }
}

/// A loosely-typed row.
pub type Record = HashMap<String, AttrValue>;

/// Maps vertex-table field names to their logical roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSchema {
    /// Field holding the vertex id.
    pub id: String,
    /// Field holding the mutable color attribute.
    pub color: String,
}

impl Default for VertexSchema {
    fn default() -> Self {
        Self {
            id: "id".into(),
            color: "color".into(),
        }
    }
}

/// Maps edge-table field names to their logical roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSchema {
    /// Field holding the stored source endpoint.
    pub src: String,
    /// Field holding the stored destination endpoint.
    pub dst: String,
    /// Field holding the carried weight.
    pub weight: String,
}

impl Default for EdgeSchema {
    fn default() -> Self {
        Self {
            src: "src".into(),
            dst: "dst".into(),
            weight: "weight".into(),
        }
    }
}

fn require<'a>(
    record: &'a Record,
    row: usize,
    table: &str,
    field: &str,
) -> Result<&'a AttrValue, ColorError> {
    record.get(field).ok_or_else(|| {
        ColorError::DataContract(format!("{} row {} is missing field `{}`", table, row, field))
    })
}

fn non_negative_int(
    record: &Record,
    row: usize,
    table: &str,
    field: &str,
) -> Result<u64, ColorError> {
    match require(record, row, table, field)? {
        AttrValue::Int(value) if *value >= 0 => Ok(*value as u64),
        AttrValue::Int(value) => Err(ColorError::DataContract(format!(
            "{} row {} field `{}` must be non-negative, got {}",
            table, row, field, value
        ))),
        other => Err(ColorError::DataContract(format!(
            "{} row {} field `{}` must be an int, got {}",
            table, row, field,
            other.type_name()
        ))),
    }
}

fn float(record: &Record, row: usize, table: &str, field: &str) -> Result<f64, ColorError> {
    match require(record, row, table, field)? {
        AttrValue::Float(value) => Ok(*value),
        // Integer weights are common in edge tables; promote them.
        AttrValue::Int(value) => Ok(*value as f64),
        other => Err(ColorError::DataContract(format!(
            "{} row {} field `{}` must be a float, got {}",
            table, row, field,
            other.type_name()
        ))),
    }
}

/// Projects vertex rows into typed states.
pub fn extract_vertices(
    rows: &[Record],
    schema: &VertexSchema,
) -> Result<Vec<VertexState>, ColorError> {
    rows.iter()
        .enumerate()
        .map(|(row, record)| {
            Ok(VertexState {
                id: VertexId(non_negative_int(record, row, "vertex", &schema.id)?),
                color: non_negative_int(record, row, "vertex", &schema.color)?,
            })
        })
        .collect()
}

/// Projects edge rows into typed states.
pub fn extract_edges(rows: &[Record], schema: &EdgeSchema) -> Result<Vec<EdgeState>, ColorError> {
    rows.iter()
        .enumerate()
        .map(|(row, record)| {
            Ok(EdgeState {
                src: VertexId(non_negative_int(record, row, "edge", &schema.src)?),
                dst: VertexId(non_negative_int(record, row, "edge", &schema.dst)?),
                weight: float(record, row, "edge", &schema.weight)?,
            })
        })
        .collect()
}

/// Projects both tables and builds the initial snapshot in one step.
pub fn graph_from_records(
    vertex_rows: &[Record],
    edge_rows: &[Record],
    vertex_schema: &VertexSchema,
    edge_schema: &EdgeSchema,
) -> Result<ColorGraph, ColorError> {
    ColorGraph::new(
        extract_vertices(vertex_rows, vertex_schema)?,
        extract_edges(edge_rows, edge_schema)?,
    )
}

/// Reads the final coloring back into the collaborator's row shape, sorted
/// by vertex id.
pub fn export_colors(graph: &ColorGraph, schema: &VertexSchema) -> Vec<Record> {
    graph
        .color_assignments()
        .into_iter()
        .map(|(id, color)| {
            Record::from([
                (schema.id.clone(), AttrValue::Int(id.0 as i64)),
                (schema.color.clone(), AttrValue::Int(color as i64)),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_row(id: i64, color: i64) -> Record {
        Record::from([
            ("id".into(), AttrValue::Int(id)),
            ("color".into(), AttrValue::Int(color)),
        ])
    }

    #[test]
    fn missing_field_names_the_row_and_field() {
        let rows = vec![Record::from([("id".into(), AttrValue::Int(0))])];
        let err = extract_vertices(&rows, &VertexSchema::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data contract error: vertex row 0 is missing field `color`"
        );
    }

    #[test]
    fn wrong_type_is_rejected() {
        let rows = vec![Record::from([
            ("id".into(), AttrValue::Text("zero".into())),
            ("color".into(), AttrValue::Int(0)),
        ])];
        let err = extract_vertices(&rows, &VertexSchema::default()).unwrap_err();
        assert!(err.to_string().contains("must be an int, got text"));
    }

    #[test]
    fn negative_ids_are_rejected() {
        let rows = vec![vertex_row(-1, 0)];
        assert!(extract_vertices(&rows, &VertexSchema::default()).is_err());
    }

    #[test]
    fn integer_weights_are_promoted() {
        let rows = vec![Record::from([
            ("src".into(), AttrValue::Int(0)),
            ("dst".into(), AttrValue::Int(1)),
            ("weight".into(), AttrValue::Int(7)),
        ])];
        let edges = extract_edges(&rows, &EdgeSchema::default()).unwrap();
        assert_eq!(edges[0].weight, 7.0);
    }
}
