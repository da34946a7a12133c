//! Detects which of the upstream response shapes was returned.
//!
//! The district API has returned the same dataset in several layouts over
//! time. The shape is sniffed once here so the tree builder never has to
//! guess while recursing.

use serde::Deserialize;
use serde_json::Value;

use super::SyncError;
use crate::features::districts::models::DivisionRecord;

/// Object keys searched, in order, when the payload is not itself an array
const RECORD_LIST_KEYS: &[&str] = &["result", "districts", "data", "list"];

/// Upstream payload adapted into one of the supported shapes
#[derive(Debug, Clone, PartialEq)]
pub enum SourceShape {
    /// `[provinces[], cities[], districts[]]`, related by identifier prefix
    TripleArray {
        provinces: Vec<DivisionRecord>,
        cities: Vec<DivisionRecord>,
        districts: Vec<DivisionRecord>,
    },
    /// Records carry an explicit `level` tag
    DepthTagged(Vec<DivisionRecord>),
    /// Provinces with cities and districts nested under them
    PositionallyNested(Vec<DivisionRecord>),
}

impl SourceShape {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceShape::TripleArray { .. } => "triple-array",
            SourceShape::DepthTagged(_) => "depth-tagged",
            SourceShape::PositionallyNested(_) => "positionally-nested",
        }
    }
}

/// Adapt the upstream `result` payload into a [`SourceShape`]
pub fn normalize(payload: &Value) -> Result<SourceShape, SyncError> {
    let items = locate_records(payload).ok_or_else(|| {
        tracing::warn!("No record list found in upstream payload");
        SyncError::EmptyResult
    })?;

    let first = items.first().ok_or_else(|| {
        tracing::warn!("Upstream payload contains an empty record list");
        SyncError::EmptyResult
    })?;

    if first.is_array() {
        if items.len() > 3 {
            tracing::debug!(
                "Ignoring {} upstream levels below district",
                items.len() - 3
            );
        }

        let mut levels = (0..3).map(|i| match items.get(i) {
            Some(Value::Array(level)) => parse_records(level),
            Some(other) if !other.is_null() => {
                tracing::warn!("Upstream level {} is not an array, treating as empty", i + 1);
                Vec::new()
            }
            _ => Vec::new(),
        });

        return Ok(SourceShape::TripleArray {
            provinces: levels.next().unwrap_or_default(),
            cities: levels.next().unwrap_or_default(),
            districts: levels.next().unwrap_or_default(),
        });
    }

    let has_level = first
        .get("level")
        .is_some_and(|level| !level.is_null());
    let records = parse_records(items);

    if has_level {
        Ok(SourceShape::DepthTagged(records))
    } else {
        Ok(SourceShape::PositionallyNested(records))
    }
}

/// Find the top-level list of records in the payload
fn locate_records(payload: &Value) -> Option<&Vec<Value>> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => RECORD_LIST_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(locate_records),
        _ => None,
    }
}

fn parse_records(values: &[Value]) -> Vec<DivisionRecord> {
    values
        .iter()
        .filter_map(|value| match DivisionRecord::deserialize(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping unreadable upstream record {}: {}", value, e);
                None
            }
        })
        .collect()
}
