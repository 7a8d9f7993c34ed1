/// Website form contents before they are sent to the API

use std::path::PathBuf;

use super::data::{CategoryToken, WebsiteEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebsiteDraft {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub category: Option<CategoryToken>,
    /// New favicon file to upload
    pub favicon: Option<PathBuf>,
    /// Drop the stored favicon (edit only)
    pub remove_favicon: bool,
    /// Photo files to upload
    pub photos: Vec<PathBuf>,
    /// Photos already stored for the entry being edited
    pub existing_photos: Vec<String>,
    /// Stored photos to delete on save, as server storage paths
    pub photos_to_remove: Vec<String>,
}

impl WebsiteDraft {
    /// Prefill from an existing entry. Files are never prefilled: the
    /// server keeps the current ones unless new files are sent or stored
    /// photos are marked for removal.
    pub fn from_entry(entry: &WebsiteEntry, category: Option<CategoryToken>) -> Self {
        Self {
            title: entry.title.clone(),
            url: entry.url.clone(),
            snippet: entry.snippet.clone(),
            category: category.or_else(|| {
                (!entry.category.is_empty()).then(|| CategoryToken::new(None, entry.category.clone()))
            }),
            existing_photos: entry.photos.clone(),
            ..Self::default()
        }
    }

    /// Mark a stored photo for deletion, or keep it again if already marked
    pub fn toggle_removal(&mut self, reference: &str) {
        let path = storage_path(reference);
        match self.photos_to_remove.iter().position(|p| *p == path) {
            Some(index) => {
                self.photos_to_remove.remove(index);
            }
            None => self.photos_to_remove.push(path),
        }
    }

    pub fn is_marked_for_removal(&self, reference: &str) -> bool {
        let path = storage_path(reference);
        self.photos_to_remove.contains(&path)
    }

    /// Problems that block submission, in form order
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("Title is required.".to_string());
        }

        let url = self.url.trim();
        if !url.is_empty() && !looks_like_url(url) {
            errors.push("URL looks invalid (use full URL like https://example.com)".to_string());
        }

        match &self.category {
            None => errors.push("Please choose a category.".to_string()),
            Some(token) if token.id().is_none() => errors.push(
                "Could not resolve category id for selected category. Please use an existing category (or create one)."
                    .to_string(),
            ),
            Some(_) => {}
        }

        errors
    }
}

/// Path the server stores a photo under, from either a public URL
/// (`https://host/public/storage/photos/a.jpg`) or a relative path.
pub fn storage_path(reference: &str) -> String {
    if reference.starts_with("photos/") || reference.starts_with("data:") {
        return reference.to_string();
    }

    let cleaned = match reference.split_once("://") {
        Some((_, rest)) => {
            let rest = rest.split(['?', '#']).next().unwrap_or_default();
            let path = rest.find('/').map_or("", |start| &rest[start..]);
            if let Some(at) = path.find("/public/storage/") {
                &path[at + "/public/storage/".len()..]
            } else if let Some(at) = path.find("/storage/") {
                &path[at + "/storage/".len()..]
            } else {
                path.trim_start_matches('/')
            }
        }
        None => {
            let path = reference.trim_start_matches('/');
            path.strip_prefix("public/storage/")
                .or_else(|| path.strip_prefix("storage/"))
                .unwrap_or(path)
        }
    };
    cleaned.to_string()
}

fn looks_like_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) => {
            let host = host.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !host.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> WebsiteDraft {
        WebsiteDraft {
            title: "Rayfog".into(),
            url: "https://rayfog.com".into(),
            category: Some(CategoryToken::parse("3|Design")),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn test_url_is_optional_but_checked() {
        let mut draft = valid();
        draft.url.clear();
        assert!(draft.validate().is_empty());

        draft.url = "rayfog.com".into();
        assert_eq!(draft.validate().len(), 1);

        draft.url = "https:// spaced.com".into();
        assert_eq!(draft.validate().len(), 1);
    }

    #[test]
    fn test_missing_title_and_unresolved_category() {
        let draft = WebsiteDraft {
            title: "   ".into(),
            category: Some(CategoryToken::parse("Design")),
            ..Default::default()
        };
        let errors = draft.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Title"));
        assert!(errors[1].contains("category id"));
    }

    #[test]
    fn test_storage_paths() {
        assert_eq!(
            storage_path("https://api.test/public/storage/photos/a.jpg"),
            "photos/a.jpg"
        );
        assert_eq!(storage_path("https://api.test/storage/photos/b.png?v=2"), "photos/b.png");
        assert_eq!(storage_path("https://cdn.test/img/c.jpg"), "img/c.jpg");
        assert_eq!(storage_path("photos/d.jpg"), "photos/d.jpg");
        assert_eq!(storage_path("/storage/photos/e.jpg"), "photos/e.jpg");
    }

    #[test]
    fn test_toggle_photo_removal() {
        let stored = "https://api.test/public/storage/photos/a.jpg";
        let mut draft = WebsiteDraft {
            existing_photos: vec![stored.to_string()],
            ..valid()
        };

        draft.toggle_removal(stored);
        draft.toggle_removal("https://api.test/storage/photos/b.jpg");
        assert!(draft.is_marked_for_removal(stored));
        assert_eq!(draft.photos_to_remove, vec!["photos/a.jpg", "photos/b.jpg"]);

        draft.toggle_removal(stored);
        assert!(!draft.is_marked_for_removal(stored));
        assert_eq!(draft.photos_to_remove, vec!["photos/b.jpg"]);
    }

    #[test]
    fn test_prefill_from_entry() {
        let entry = WebsiteEntry {
            id: Some(1),
            title: "Ledger".into(),
            category: "Business".into(),
            photos: vec!["photos/1.jpg".into()],
            ..Default::default()
        };
        let draft = WebsiteDraft::from_entry(&entry, None);
        assert_eq!(draft.title, "Ledger");
        assert_eq!(draft.existing_photos, vec!["photos/1.jpg"]);
        assert_eq!(draft.category, Some(CategoryToken::new(None, "Business")));

        assert!(draft.photos_to_remove.is_empty());

        let token = CategoryToken::parse("8|Business");
        let draft = WebsiteDraft::from_entry(&entry, Some(token.clone()));
        assert_eq!(draft.category, Some(token));
    }
}
