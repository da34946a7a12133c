use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw administrative division as returned by the upstream district API.
///
/// Only the fields the tree needs are kept; everything else the upstream
/// sends (pinyin, centroid, `cidx`, ...) is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DivisionRecord {
    /// Composite identifier, 2 digits per hierarchy level (e.g. `440103`)
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fullname: Option<String>,
    /// Explicit depth tag: 1 = province, 2 = city, 3 = district
    #[serde(default, deserialize_with = "optional_level")]
    pub level: Option<u8>,
    #[serde(default)]
    pub children: Option<Vec<DivisionRecord>>,
    #[serde(default)]
    pub districts: Option<Vec<DivisionRecord>>,
}

impl DivisionRecord {
    /// Nested children, whichever field the upstream used for them
    pub fn children(&self) -> Option<&[DivisionRecord]> {
        self.children
            .as_deref()
            .or(self.districts.as_deref())
    }

    /// Full display name, falling back to the short name
    pub fn display_name(&self) -> &str {
        match self.fullname.as_deref() {
            Some(full) if !full.trim().is_empty() => full,
            _ => &self.name,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected identifier string or number, got {}",
            other
        ))),
    }
}

fn optional_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let level = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_tencent_record() {
        let record: DivisionRecord = serde_json::from_value(json!({
            "id": "440103",
            "name": "荔湾",
            "fullname": "荔湾区",
            "pinyin": ["li", "wan"],
            "location": {"lat": 23.12, "lng": 113.24}
        }))
        .unwrap();

        assert_eq!(record.id, "440103");
        assert_eq!(record.display_name(), "荔湾区");
        assert_eq!(record.level, None);
        assert!(record.children().is_none());
    }

    #[test]
    fn test_numeric_id_and_string_level() {
        let record: DivisionRecord =
            serde_json::from_value(json!({"id": 110000, "name": "北京", "level": "1"})).unwrap();

        assert_eq!(record.id, "110000");
        assert_eq!(record.level, Some(1));
        assert_eq!(record.display_name(), "北京");
    }

    #[test]
    fn test_children_accessor_prefers_children_field() {
        let record: DivisionRecord = serde_json::from_value(json!({
            "id": "440100",
            "children": [{"id": "440103"}],
            "districts": [{"id": "440104"}, {"id": "440105"}]
        }))
        .unwrap();
        assert_eq!(record.children().map(|c| c.len()), Some(1));

        let record: DivisionRecord = serde_json::from_value(json!({
            "id": "440100",
            "districts": [{"id": "440104"}, {"id": "440105"}]
        }))
        .unwrap();
        assert_eq!(record.children().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_blank_fullname_falls_back_to_name() {
        let record = DivisionRecord {
            id: "11".to_string(),
            name: "北京".to_string(),
            fullname: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.display_name(), "北京");
    }
}
