use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A trimmed, non-empty tag string. Doubles as the cache key, so two queries
/// that differ only in case are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Returns `None` when the input is empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub m: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoItem {
    /// Assigned per decode for list identity; never sent over the wire.
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub link: String,
    pub media: Media,
    #[serde(rename = "date_taken")]
    pub taken: String,
    pub description: String,
    pub published: String,
    pub author: String,
    pub author_id: String,
    pub tags: String,
}

impl PhotoItem {
    pub fn image_url(&self) -> &str {
        &self.media.m
    }

    /// The display name inside the feed's `nobody@flickr.com ("name")` author
    /// string, or the whole string when it has another shape.
    pub fn author_name(&self) -> &str {
        self.author
            .split_once("(\"")
            .and_then(|(_, rest)| rest.strip_suffix("\")"))
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.author)
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split_whitespace().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedResult {
    pub title: String,
    pub link: String,
    pub description: String,
    pub modified: String,
    pub generator: String,
    pub items: Vec<PhotoItem>,
}

/// Renders an RFC 3339 timestamp as `9 Jul 2024` in UTC.
/// Unparseable input is returned unchanged.
pub fn formatted_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date.with_timezone(&Utc).format("%-d %b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
