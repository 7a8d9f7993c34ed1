/// Shared data structures for the catalog
///
/// These structs represent the data model that flows between the remote
/// API, the local cache and the UI layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::carousel::GalleryKey;

/// One website in the catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WebsiteEntry {
    /// Server-assigned id (absent on some listings)
    pub id: Option<i64>,
    pub title: String,
    pub url: String,
    /// Short description shown under the gallery
    pub snippet: String,
    /// Favicon reference (URL or data URI)
    pub favicon: Option<String>,
    /// Category display name
    pub category: String,
    /// Ordered photo references (URLs or data URIs)
    pub photos: Vec<String>,
}

impl WebsiteEntry {
    /// Identity used to key this entry's gallery instance
    pub fn gallery_key(&self) -> GalleryKey {
        match self.id {
            Some(id) => GalleryKey::Entry(id),
            None => GalleryKey::Url(self.url.clone()),
        }
    }

    /// Single image shown when the entry has no photos
    pub fn preview_image(&self) -> Option<&str> {
        self.photos
            .first()
            .map(String::as_str)
            .or(self.favicon.as_deref())
    }
}

/// A category as passed through UI controls: `"id|displayName"`, or just
/// the name when the server did not give an id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryToken {
    pub id: Option<String>,
    pub label: String,
}

impl CategoryToken {
    pub fn new(id: Option<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            label: label.into(),
        }
    }

    /// Parse `"id|name"` or a bare name. Everything after the first `|`
    /// belongs to the label.
    pub fn parse(token: &str) -> Self {
        match token.split_once('|') {
            Some((id, label)) => Self::new(Some(id.trim().to_string()), label.trim()),
            None => Self::new(None, token.trim()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Same category under a new display name; the id is kept
    pub fn renamed(&self, label: impl Into<String>) -> Self {
        Self::new(self.id.clone(), label)
    }
}

impl fmt::Display for CategoryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}|{}", id, self.label),
            None => write!(f, "{}", self.label),
        }
    }
}

// ========== Response normalization ==========
//
// The catalog API has returned several response shapes over time. Each
// listing is unwrapped and each item read through a list of field aliases.

/// Extract website entries from any known listing shape
pub fn normalize_entries(body: &Value) -> Vec<WebsiteEntry> {
    let items: Vec<&Value> = match body {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => ["data", "websites", "items"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(|items| items.iter().collect())
            .unwrap_or_else(|| vec![body]),
        _ => Vec::new(),
    };
    items.into_iter().map(normalize_entry).collect()
}

/// Read one website object through its field aliases
pub fn normalize_entry(item: &Value) -> WebsiteEntry {
    let photos = match first_of(item, &["photos_url", "photos", "images"]) {
        Some(Value::Array(photos)) => photos.iter().filter_map(text).collect(),
        Some(Value::String(single)) if !single.is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };

    WebsiteEntry {
        id: item.get("id").and_then(as_id),
        title: string_field(item, &["title", "name", "label"]),
        url: string_field(item, &["weburl", "url", "website"]),
        snippet: string_field(item, &["conext", "context", "snippet", "description"]),
        favicon: first_of(item, &["favicon_url", "favicon", "faviconUrl"])
            .and_then(text)
            .filter(|f| !f.is_empty()),
        category: string_field(item, &["categoryName", "category_name", "category", "cat"]),
        photos,
    }
}

/// Extract category tokens from any known listing shape
pub fn normalize_categories(body: &Value) -> Vec<CategoryToken> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["data", "categories"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            if let Value::String(name) = item {
                return Some(CategoryToken::parse(name));
            }
            let label = first_of(item, &["name", "title", "label", "category"]).and_then(text)?;
            let id = first_of(item, &["id", "categoryId", "value"]).and_then(text);
            Some(CategoryToken::new(id, label))
        })
        .filter(|token| !token.label.is_empty())
        .collect()
}

/// First alias present and not null
fn first_of<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| item.get(*key).filter(|value| !value.is_null()))
}

fn string_field(item: &Value, keys: &[&str]) -> String {
    first_of(item, keys).and_then(text).unwrap_or_default()
}

/// Strings as-is, numbers and booleans in their JSON spelling
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_aliases() {
        let entry = normalize_entry(&json!({
            "id": "12",
            "name": "Rayfog",
            "weburl": "https://rayfog.com",
            "conext": "Studio site",
            "favicon_url": "https://rayfog.com/favicon.ico",
            "category_name": "Design",
            "photos_url": ["a.jpg", "b.jpg"]
        }));

        assert_eq!(entry.id, Some(12));
        assert_eq!(entry.title, "Rayfog");
        assert_eq!(entry.url, "https://rayfog.com");
        assert_eq!(entry.snippet, "Studio site");
        assert_eq!(entry.favicon.as_deref(), Some("https://rayfog.com/favicon.ico"));
        assert_eq!(entry.category, "Design");
        assert_eq!(entry.photos, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_single_photo_string() {
        let entry = normalize_entry(&json!({ "title": "One", "photos_url": "only.png" }));
        assert_eq!(entry.photos, vec!["only.png"]);
        assert_eq!(entry.id, None);
        assert_eq!(entry.favicon, None);
    }

    #[test]
    fn test_listing_shapes() {
        let bare = json!([{ "title": "A" }, { "title": "B" }]);
        assert_eq!(normalize_entries(&bare).len(), 2);

        let wrapped = json!({ "status": true, "data": [{ "title": "A" }] });
        assert_eq!(normalize_entries(&wrapped)[0].title, "A");

        let items = json!({ "items": [{ "title": "X" }, { "title": "Y" }, { "title": "Z" }] });
        assert_eq!(normalize_entries(&items).len(), 3);

        let single = json!({ "title": "Solo", "url": "https://solo.test" });
        assert_eq!(normalize_entries(&single)[0].url, "https://solo.test");

        assert!(normalize_entries(&json!("nope")).is_empty());
    }

    #[test]
    fn test_categories() {
        let body = json!({ "data": [
            { "id": 3, "name": "Technology" },
            { "categoryId": "9", "title": "Business" },
            { "label": "Loose" },
            "4|Design",
            { "id": 5 }
        ]});
        let tokens = normalize_categories(&body);
        let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["3|Technology", "9|Business", "Loose", "4|Design"]);
    }

    #[test]
    fn test_token_parse() {
        let token = CategoryToken::parse("7|Arts | Crafts");
        assert_eq!(token.id(), Some("7"));
        assert_eq!(token.label(), "Arts | Crafts");

        let bare = CategoryToken::parse("Education");
        assert_eq!(bare.id(), None);
        assert_eq!(bare.to_string(), "Education");

        assert_eq!(CategoryToken::parse("|Empty id").id(), None);
    }

    #[test]
    fn test_renamed_token_keeps_id() {
        assert_eq!(CategoryToken::parse("7|Arts").renamed("Crafts").to_string(), "7|Crafts");
        assert_eq!(CategoryToken::parse("Loose").renamed("Tight").to_string(), "Tight");
    }

    #[test]
    fn test_gallery_key_prefers_id() {
        let mut entry = WebsiteEntry {
            url: "https://x.test".into(),
            ..Default::default()
        };
        assert_eq!(entry.gallery_key(), GalleryKey::Url("https://x.test".into()));
        entry.id = Some(4);
        assert_eq!(entry.gallery_key(), GalleryKey::Entry(4));
    }

    #[test]
    fn test_preview_falls_back_to_favicon() {
        let entry = WebsiteEntry {
            favicon: Some("fav.ico".into()),
            ..Default::default()
        };
        assert_eq!(entry.preview_image(), Some("fav.ico"));
    }
}
