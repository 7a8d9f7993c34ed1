/// In-memory catalog: entries, known categories and filtering

use super::data::{CategoryToken, WebsiteEntry};

/// Pseudo-category that disables the category filter
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<WebsiteEntry>,
    tokens: Vec<CategoryToken>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[WebsiteEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<WebsiteEntry>) {
        self.entries = entries;
    }

    pub fn tokens(&self) -> &[CategoryToken] {
        &self.tokens
    }

    /// Add tokens not already known, keeping first-seen order
    pub fn merge_categories(&mut self, tokens: impl IntoIterator<Item = CategoryToken>) {
        for token in tokens {
            if !self.tokens.contains(&token) {
                self.tokens.push(token);
            }
        }
    }

    pub fn replace_categories(&mut self, tokens: Vec<CategoryToken>) {
        self.tokens.clear();
        self.merge_categories(tokens);
    }

    /// Rewrite `old` to `renamed` in the category list and on every entry
    /// filed under the old label. Token ids are kept as they are.
    pub fn rename_category(&mut self, old: &CategoryToken, renamed: &CategoryToken) {
        for token in &mut self.tokens {
            let same = match (token.id(), old.id()) {
                (Some(id), Some(old_id)) => id == old_id,
                _ => token.label() == old.label(),
            };
            if same {
                *token = token.renamed(renamed.label());
            }
        }
        for entry in &mut self.entries {
            if entry.category == old.label() {
                entry.category = renamed.label().to_string();
            }
        }
    }

    /// Labels for the filter chips: "All", then every distinct label from
    /// the category listing and the entries themselves.
    pub fn categories(&self) -> Vec<String> {
        let mut labels = vec![ALL_CATEGORIES.to_string()];
        let from_tokens = self.tokens.iter().map(|t| t.label());
        let from_entries = self.entries.iter().map(|e| e.category.as_str());
        for label in from_tokens.chain(from_entries) {
            if !label.is_empty() && !labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                labels.push(label.to_string());
            }
        }
        labels
    }

    /// Token carrying the id for a category label, when the server gave one
    pub fn token_for(&self, label: &str) -> Option<&CategoryToken> {
        self.tokens
            .iter()
            .find(|t| t.label().eq_ignore_ascii_case(label))
    }

    /// Entries in `category` (case-insensitive, "All" matches everything)
    /// whose title, snippet or category contains `search`.
    pub fn filtered(&self, category: &str, search: &str) -> Vec<&WebsiteEntry> {
        let term = search.trim().to_lowercase();
        let any_category = category.eq_ignore_ascii_case(ALL_CATEGORIES);

        self.entries
            .iter()
            .filter(|entry| any_category || entry.category.eq_ignore_ascii_case(category))
            .filter(|entry| {
                term.is_empty()
                    || entry.title.to_lowercase().contains(&term)
                    || entry.snippet.to_lowercase().contains(&term)
                    || entry.category.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn remove_entry(&mut self, id: i64) -> Option<WebsiteEntry> {
        let position = self.entries.iter().position(|e| e.id == Some(id))?;
        Some(self.entries.remove(position))
    }

    pub fn find(&self, id: i64) -> Option<&WebsiteEntry> {
        self.entries.iter().find(|e| e.id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, title: &str, category: &str, snippet: &str) -> WebsiteEntry {
        WebsiteEntry {
            id: Some(id),
            title: title.into(),
            url: format!("https://{}.test", title.to_lowercase()),
            snippet: snippet.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.set_entries(vec![
            entry(1, "Rayfog", "Design", "Creative studio"),
            entry(2, "Ledger", "Business", "Accounting for small teams"),
            entry(3, "Kernel", "technology", "Systems blog"),
        ]);
        catalog
    }

    #[test]
    fn test_all_matches_everything() {
        assert_eq!(catalog().filtered("All", "").len(), 3);
    }

    #[test]
    fn test_category_filter_ignores_case() {
        let catalog = catalog();
        let titles: Vec<_> = catalog
            .filtered("Technology", "")
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Kernel"]);
    }

    #[test]
    fn test_search_covers_title_snippet_and_category() {
        let catalog = catalog();
        assert_eq!(catalog.filtered("All", "rayfog").len(), 1);
        assert_eq!(catalog.filtered("All", "  SMALL teams ").len(), 1);
        assert_eq!(catalog.filtered("All", "design").len(), 1);
        assert!(catalog.filtered("Business", "studio").is_empty());
    }

    #[test]
    fn test_categories_are_distinct_and_ordered() {
        let mut catalog = catalog();
        catalog.merge_categories(vec![
            CategoryToken::parse("9|Education"),
            CategoryToken::parse("4|Design"),
        ]);
        catalog.merge_categories(vec![CategoryToken::parse("9|Education")]);

        assert_eq!(catalog.tokens().len(), 2);
        assert_eq!(
            catalog.categories(),
            vec!["All", "Education", "Design", "Business", "technology"]
        );
        assert_eq!(catalog.token_for("design").and_then(|t| t.id()), Some("4"));
    }

    #[test]
    fn test_rename_category_keeps_token_id() {
        let mut catalog = catalog();
        catalog.merge_categories(vec![
            CategoryToken::parse("4|Design"),
            CategoryToken::parse("Business"),
        ]);

        let old = CategoryToken::parse("4|Design");
        catalog.rename_category(&old, &old.renamed("Studio"));
        let tokens: Vec<String> = catalog.tokens().iter().map(ToString::to_string).collect();
        assert_eq!(tokens, vec!["4|Studio", "Business"]);
        assert_eq!(catalog.filtered("Studio", "").len(), 1);
        assert!(catalog.filtered("Design", "").is_empty());

        let bare = CategoryToken::parse("Business");
        catalog.rename_category(&bare, &bare.renamed("Finance"));
        assert_eq!(catalog.tokens()[1].to_string(), "Finance");
        assert_eq!(catalog.find(2).map(|e| e.category.as_str()), Some("Finance"));
    }

    #[test]
    fn test_remove_entry() {
        let mut catalog = catalog();
        assert_eq!(catalog.remove_entry(2).map(|e| e.title), Some("Ledger".into()));
        assert!(catalog.find(2).is_none());
        assert!(catalog.remove_entry(2).is_none());
    }
}
