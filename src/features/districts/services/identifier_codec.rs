//! Canonical codes from composite division identifiers.
//!
//! A composite identifier carries 2 decimal digits per level, so the code of a
//! division at a given depth is simply the identifier's leading 2, 4 or 6
//! characters.

use thiserror::Error;

use crate::features::districts::models::{Depth, DivisionCode};

/// Per-record identifier failures. These never abort a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("identifier '{id}' is malformed for {depth:?} level")]
    MalformedIdentifier { id: String, depth: Depth },

    #[error("identifier '{id}' does not descend from parent code {parent}")]
    AncestryMismatch { id: String, parent: String },
}

/// Leading `len` characters of an identifier, if it is long enough
pub fn prefix(raw_id: &str, len: usize) -> Option<&str> {
    raw_id.get(..len)
}

/// Canonical code of a division at `depth`
pub fn canonical_code(raw_id: &str, depth: Depth) -> Result<DivisionCode, CodecError> {
    let malformed = || CodecError::MalformedIdentifier {
        id: raw_id.to_string(),
        depth,
    };

    let digits = prefix(raw_id, depth.code_len())
        .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(malformed)?;

    match depth {
        Depth::Province => digits
            .parse::<u32>()
            .map(DivisionCode::Province)
            .map_err(|_| malformed()),
        Depth::City | Depth::District => Ok(DivisionCode::Area(digits.to_string())),
    }
}

/// Whether `code` sits strictly below `parent` in the hierarchy
pub fn is_descendant(code: &DivisionCode, parent: &DivisionCode) -> bool {
    let code = code.as_prefix();
    let parent = parent.as_prefix();
    code.len() > parent.len() && code.starts_with(&parent)
}

/// Canonical code of a division, checked against its parent when it has one
pub fn child_code(
    raw_id: &str,
    depth: Depth,
    parent: Option<&DivisionCode>,
) -> Result<DivisionCode, CodecError> {
    let code = canonical_code(raw_id, depth)?;

    match parent {
        Some(parent) if !is_descendant(&code, parent) => Err(CodecError::AncestryMismatch {
            id: raw_id.to_string(),
            parent: parent.as_prefix(),
        }),
        _ => Ok(code),
    }
}
