use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::timestamp::rfc3339_millis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category_id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
}

/// Category slug: lowercase, whitespace runs become `-`.
pub fn category_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Subcategory slug: lowercase, every run outside `[a-z0-9]` becomes one `-`, trimmed.
pub fn subcategory_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_slug() {
        assert_eq!(category_slug("Living  Room Chairs"), "living-room-chairs");
        assert_eq!(category_slug("  Office "), "office");
    }

    #[test]
    fn test_subcategory_slug() {
        assert_eq!(subcategory_slug("Desks & Tables!"), "desks-tables");
        assert_eq!(subcategory_slug("--Über Sofa 2--"), "ber-sofa-2");
    }
}
