use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::models::FeedResult;

const FEED_FIELDS: [&str; 5] = ["title", "link", "description", "modified", "generator"];
const ITEM_FIELDS: [&str; 8] = [
    "title",
    "link",
    "date_taken",
    "description",
    "published",
    "author",
    "author_id",
    "tags",
];

/// Decodes a photo feed payload.
/// Every required field must be present with string type (or the nested
/// `media.m` / `items` shapes); the first violation is reported by path.
pub fn decode(bytes: &[u8]) -> Result<FeedResult, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|_| DecodeError::MalformedPayload("payload".to_string()))?;

    check_feed(&value)?;

    serde_json::from_value(value)
        .map_err(|e| DecodeError::MalformedPayload(format!("payload ({})", e)))
}

fn check_feed(value: &Value) -> Result<(), DecodeError> {
    let feed = value
        .as_object()
        .ok_or_else(|| DecodeError::MalformedPayload("payload".to_string()))?;

    for field in FEED_FIELDS {
        require_str(feed, field, field)?;
    }

    let items = feed
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError::MalformedPayload("items".to_string()))?;

    for (index, item) in items.iter().enumerate() {
        check_item(item, index)?;
    }

    Ok(())
}

fn check_item(value: &Value, index: usize) -> Result<(), DecodeError> {
    let prefix = format!("items[{}]", index);
    let item = value
        .as_object()
        .ok_or_else(|| DecodeError::MalformedPayload(prefix.clone()))?;

    for field in ITEM_FIELDS {
        require_str(item, field, &format!("{}.{}", prefix, field))?;
    }

    let media = item
        .get("media")
        .and_then(Value::as_object)
        .ok_or_else(|| DecodeError::MalformedPayload(format!("{}.media", prefix)))?;
    require_str(media, "m", &format!("{}.media.m", prefix))
}

fn require_str(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), DecodeError> {
    match object.get(key) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(DecodeError::MalformedPayload(path.to_string())),
    }
}
