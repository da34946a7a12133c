//! Rebuilds the province → city → district tree from a normalized source.
//!
//! Each source shape has its own build function; they share the per-record
//! step in [`TreeBuilder::node`], which applies the identifier codec and
//! records skipped divisions. Sibling order always follows the source.

use serde::Serialize;

use super::identifier_codec::{self, CodecError};
use super::source_normalizer::SourceShape;
use super::SyncError;
use crate::features::districts::models::{Depth, DivisionCode, DivisionNode, DivisionRecord};

/// Division left out of the tree because its identifier was unusable
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub id: String,
    pub name: String,
    pub error: CodecError,
}

/// Number of nodes built per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub provinces: usize,
    pub cities: usize,
    pub districts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub tree: Vec<DivisionNode>,
    pub skipped: Vec<SkippedRecord>,
    pub stats: BuildStats,
    /// Flat-level records whose identifier matched no parent
    pub unplaced: usize,
}

/// Build the district tree for any supported source shape.
///
/// Fails with [`SyncError::EmptyResult`] when no province survives.
pub fn build_tree(source: &SourceShape) -> Result<BuildOutcome, SyncError> {
    let mut builder = TreeBuilder::default();

    let tree = match source {
        SourceShape::TripleArray {
            provinces,
            cities,
            districts,
        } => builder.triple_array(provinces, cities, districts),
        SourceShape::DepthTagged(records) => builder.depth_tagged(records),
        SourceShape::PositionallyNested(records) => builder.positionally_nested(records),
    };

    if tree.is_empty() {
        tracing::warn!(
            "No province could be built from {} source ({} records skipped)",
            source.kind(),
            builder.skipped.len()
        );
        return Err(SyncError::EmptyResult);
    }

    let unplaced = builder.pool_size.saturating_sub(builder.pooled);
    if unplaced > 0 {
        tracing::debug!(
            "Dropped {} {} records that matched no parent",
            unplaced,
            source.kind()
        );
    }

    Ok(BuildOutcome {
        tree,
        skipped: builder.skipped,
        stats: builder.stats,
        unplaced,
    })
}

/// Records from `pool` whose identifier starts with the parent's leading `len` characters
fn associated<'a>(
    pool: &'a [DivisionRecord],
    parent_id: &str,
    len: usize,
) -> impl Iterator<Item = &'a DivisionRecord> {
    let parent_prefix = identifier_codec::prefix(parent_id, len).map(str::to_owned);
    pool.iter().filter(move |record| {
        parent_prefix
            .as_deref()
            .is_some_and(|p| record.id.starts_with(p))
    })
}

#[derive(Default)]
struct TreeBuilder {
    skipped: Vec<SkippedRecord>,
    stats: BuildStats,
    /// Records in the flat city/district levels
    pool_size: usize,
    /// Pool records handed to a parent by prefix
    pooled: usize,
}

impl TreeBuilder {
    /// Childless node for `record`, or `None` if its identifier is unusable
    fn node(
        &mut self,
        record: &DivisionRecord,
        depth: Depth,
        parent: Option<&DivisionCode>,
    ) -> Option<DivisionNode> {
        match identifier_codec::child_code(&record.id, depth, parent) {
            Ok(code) => {
                match depth {
                    Depth::Province => self.stats.provinces += 1,
                    Depth::City => self.stats.cities += 1,
                    Depth::District => self.stats.districts += 1,
                }
                Some(DivisionNode::new(code, record.display_name()))
            }
            Err(error) => {
                tracing::warn!(
                    "Skipping division '{}' ({}): {}",
                    record.display_name(),
                    record.id,
                    error
                );
                self.skipped.push(SkippedRecord {
                    id: record.id.clone(),
                    name: record.display_name().to_string(),
                    error,
                });
                None
            }
        }
    }

    /// Flat level arrays associated by identifier prefix. Any nesting inside
    /// the records is ignored.
    fn triple_array(
        &mut self,
        provinces: &[DivisionRecord],
        cities: &[DivisionRecord],
        districts: &[DivisionRecord],
    ) -> Vec<DivisionNode> {
        let mut tree = Vec::with_capacity(provinces.len());
        self.pool_size = cities.len() + districts.len();

        for p in provinces {
            let Some(mut province) = self.node(p, Depth::Province, None) else {
                continue;
            };

            for c in associated(cities, &p.id, Depth::Province.code_len()) {
                self.pooled += 1;
                let Some(mut city) = self.node(c, Depth::City, Some(&province.code)) else {
                    continue;
                };

                for d in associated(districts, &c.id, Depth::City.code_len()) {
                    self.pooled += 1;
                    if let Some(district) = self.node(d, Depth::District, Some(&city.code)) {
                        city.children.push(district);
                    }
                }
                province.children.push(city);
            }
            tree.push(province);
        }

        tree
    }

    /// Records tagged with an explicit level. Untagged or level-1 top-level
    /// records are provinces; tagged city and district records at the top
    /// level serve as prefix pools for parents without nested children.
    fn depth_tagged(&mut self, records: &[DivisionRecord]) -> Vec<DivisionNode> {
        let mut roots = Vec::new();
        let mut cities = Vec::new();
        let mut districts = Vec::new();

        for record in records {
            match record.level {
                None | Some(1) => roots.push(record),
                Some(2) => cities.push(record.clone()),
                Some(3) => districts.push(record.clone()),
                Some(level) => {
                    tracing::debug!("Discarding level {} division {}", level, record.id)
                }
            }
        }

        self.pool_size = cities.len() + districts.len();
        let pools = LevelPools { cities, districts };
        roots
            .into_iter()
            .filter_map(|record| self.tagged_node(record, Depth::Province, None, &pools))
            .collect()
    }

    fn tagged_node(
        &mut self,
        record: &DivisionRecord,
        fallback: Depth,
        parent: Option<&DivisionCode>,
        pools: &LevelPools,
    ) -> Option<DivisionNode> {
        let depth = match record.level {
            Some(level) => match Depth::from_level(level) {
                Some(depth) => depth,
                None => {
                    tracing::debug!("Discarding level {} division {}", level, record.id);
                    return None;
                }
            },
            None => fallback,
        };

        let mut node = self.node(record, depth, parent)?;

        if let Some(next) = depth.next() {
            let children: Vec<&DivisionRecord> = match record.children() {
                Some(nested) => nested.iter().collect(),
                None => {
                    let pooled: Vec<&DivisionRecord> =
                        associated(pools.at(next), &record.id, depth.code_len()).collect();
                    self.pooled += pooled.len();
                    pooled
                }
            };

            for child in children {
                if let Some(child) = self.tagged_node(child, next, Some(&node.code), pools) {
                    node.children.push(child);
                }
            }
        }

        Some(node)
    }

    /// Provinces with cities and districts nested under them; depth is the
    /// traversal position.
    fn positionally_nested(&mut self, records: &[DivisionRecord]) -> Vec<DivisionNode> {
        records
            .iter()
            .filter_map(|record| self.positional_node(record, 0, None))
            .collect()
    }

    fn positional_node(
        &mut self,
        record: &DivisionRecord,
        position: usize,
        parent: Option<&DivisionCode>,
    ) -> Option<DivisionNode> {
        let depth = Depth::from_position(position)?;
        let mut node = self.node(record, depth, parent)?;

        if depth.next().is_some() {
            for child in record.children().unwrap_or_default() {
                if let Some(child) = self.positional_node(child, position + 1, Some(&node.code)) {
                    node.children.push(child);
                }
            }
        }

        Some(node)
    }
}

struct LevelPools {
    cities: Vec<DivisionRecord>,
    districts: Vec<DivisionRecord>,
}

impl LevelPools {
    fn at(&self, depth: Depth) -> &[DivisionRecord] {
        match depth {
            Depth::Province => &[],
            Depth::City => &self.cities,
            Depth::District => &self.districts,
        }
    }
}
