use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a division in the province → city → district tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Depth {
    Province,
    City,
    District,
}

impl Depth {
    /// Depth from traversal position (0 = province)
    pub fn from_position(position: usize) -> Option<Self> {
        match position {
            0 => Some(Depth::Province),
            1 => Some(Depth::City),
            2 => Some(Depth::District),
            _ => None,
        }
    }

    /// Depth from an explicit upstream level tag (1 = province)
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Depth::Province),
            2 => Some(Depth::City),
            3 => Some(Depth::District),
            _ => None,
        }
    }

    /// Number of leading identifier characters that make up a code at this depth
    pub fn code_len(self) -> usize {
        match self {
            Depth::Province => 2,
            Depth::City => 4,
            Depth::District => 6,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Depth::Province => Some(Depth::City),
            Depth::City => Some(Depth::District),
            Depth::District => None,
        }
    }
}

/// Canonical division code.
///
/// Provinces serialize as a number (`44`), cities and districts as
/// fixed-width strings (`"4401"`, `"440103"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DivisionCode {
    Province(u32),
    Area(String),
}

impl DivisionCode {
    /// Fixed-width string form, 2 digits per level
    pub fn as_prefix(&self) -> String {
        match self {
            DivisionCode::Province(n) => format!("{:02}", n),
            DivisionCode::Area(code) => code.clone(),
        }
    }
}

impl fmt::Display for DivisionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_prefix())
    }
}

/// Node of the published district tree.
///
/// Field names are kept to a single letter to keep the stored object small.
/// `d` is omitted entirely for nodes without children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionNode {
    #[serde(rename = "c")]
    pub code: DivisionCode,
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "d", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DivisionNode>,
}

impl DivisionNode {
    pub fn new(code: DivisionCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_serializes_without_children() {
        let node = DivisionNode::new(DivisionCode::Province(11), "北京市");
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"c":11,"n":"北京市"}"#
        );
    }

    #[test]
    fn test_nested_serialization() {
        let mut city = DivisionNode::new(DivisionCode::Area("4401".to_string()), "广州市");
        city.children.push(DivisionNode::new(
            DivisionCode::Area("440103".to_string()),
            "荔湾区",
        ));
        let mut province = DivisionNode::new(DivisionCode::Province(44), "广东省");
        province.children.push(city);

        assert_eq!(
            serde_json::to_string(&province).unwrap(),
            r#"{"c":44,"n":"广东省","d":[{"c":"4401","n":"广州市","d":[{"c":"440103","n":"荔湾区"}]}]}"#
        );
    }

    #[test]
    fn test_province_prefix_is_zero_padded() {
        assert_eq!(DivisionCode::Province(5).as_prefix(), "05");
        assert_eq!(DivisionCode::Area("4401".to_string()).to_string(), "4401");
    }

    #[test]
    fn test_depth_navigation() {
        assert_eq!(Depth::from_level(2), Some(Depth::City));
        assert_eq!(Depth::from_level(4), None);
        assert_eq!(Depth::from_position(2), Some(Depth::District));
        assert_eq!(Depth::District.next(), None);
        assert_eq!(Depth::City.code_len(), 4);
    }
}
