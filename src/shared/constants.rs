/// Content type of the serialized district tree
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Custom metadata entry holding the ISO-8601 time the stored tree was
/// built, taken right before the write that carries it
pub const UPDATED_AT_METADATA_KEY: &str = "updated-at";

/// Offset used when showing timestamps to users (Asia/Shanghai, no DST)
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

/// Shown on the status page before the first successful sync
pub const NEVER_UPDATED_LABEL: &str = "从未更新";
