/// Client for the remote catalog API
///
/// All persistence lives behind this API. Listing endpoints return loosely
/// shaped JSON which is normalized in `state::data`; write endpoints take
/// JSON (categories) or multipart forms (websites, because of file uploads).

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

use crate::error::{FolioError, Result};
use crate::state::data::{self, CategoryToken, WebsiteEntry};
use crate::state::draft::WebsiteDraft;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ========== Categories ==========

    pub async fn list_categories(&self) -> Result<Vec<CategoryToken>> {
        let response = self.client.get(self.endpoint("list-category")).send().await?;
        let body = read_json(response).await?;
        let tokens = data::normalize_categories(&body);
        info!("Loaded {} categories", tokens.len());
        Ok(tokens)
    }

    /// Create a category. The returned token carries the new id when the
    /// server reports one.
    pub async fn add_category(&self, name: &str) -> Result<CategoryToken> {
        let name = name.trim();
        let response = self
            .client
            .post(self.endpoint("add-category"))
            .json(&json!({ "name": name }))
            .send()
            .await?;
        let body = read_json(response).await?;
        Ok(created_category(&body, name))
    }

    /// Rename a category, by id when the token has one, otherwise by its
    /// old name. Returns the token under its new name.
    pub async fn update_category(&self, token: &CategoryToken, name: &str) -> Result<CategoryToken> {
        let name = name.trim();
        let (path, body) = rename_request(token, name);
        let response = self
            .client
            .post(self.endpoint(&path))
            .json(&body)
            .send()
            .await?;
        read_json(response).await?;
        info!("Renamed category {} to {:?}", token, name);
        Ok(token.renamed(name))
    }

    pub async fn delete_category(&self, token: &CategoryToken) -> Result<()> {
        let request = match token.id() {
            Some(id) => self
                .client
                .delete(self.endpoint(&format!("delete-category/{}", id))),
            None => self
                .client
                .delete(self.endpoint("delete-category"))
                .query(&[("name", token.label())]),
        };
        read_json(request.send().await?).await?;
        info!("Deleted category {}", token);
        Ok(())
    }

    // ========== Websites ==========

    pub async fn list_websites(&self) -> Result<Vec<WebsiteEntry>> {
        let response = self.client.get(self.endpoint("list-website")).send().await?;
        let body = read_json(response).await?;
        let entries = data::normalize_entries(&body);
        info!("Loaded {} websites", entries.len());
        Ok(entries)
    }

    pub async fn add_website(&self, draft: &WebsiteDraft) -> Result<()> {
        let form = website_form(draft, None).await?;
        let response = self
            .client
            .post(self.endpoint("add-website"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await?;
        info!("Added website {:?}", draft.title);
        Ok(())
    }

    pub async fn update_website(&self, id: i64, draft: &WebsiteDraft) -> Result<()> {
        let form = website_form(draft, Some(id)).await?;
        let response = self
            .client
            .post(self.endpoint(&format!("update-website/{}", id)))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await?;
        info!("Updated website {}", id);
        Ok(())
    }

    pub async fn delete_website(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("delete-website/{}", id)))
            .send()
            .await?;
        read_json(response).await?;
        info!("Deleted website {}", id);
        Ok(())
    }

    // ========== Images ==========

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FolioError::Api {
                status: status.as_u16(),
                message: format!("Request failed ({})", status.as_u16()),
            });
        }
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Parse the body as JSON (empty or non-JSON bodies become `Null`) and turn
/// error statuses into `FolioError::Api`.
async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(FolioError::Api {
            status: status.as_u16(),
            message: failure_message(status.as_u16(), &body),
        });
    }
    Ok(body)
}

/// Server-provided `message` or `error`, otherwise a generic line
fn failure_message(status: u16, body: &Value) -> String {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed ({})", status))
}

/// Token for a category just created, from `data.id`/`id` and `data.name`/`name`
fn created_category(body: &Value, requested: &str) -> CategoryToken {
    let scoped = |key: &str| {
        body.get("data")
            .and_then(|d| d.get(key))
            .or_else(|| body.get(key))
            .filter(|v| !v.is_null())
    };
    let id = scoped("id").map(|id| match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    let name = scoped("name")
        .and_then(Value::as_str)
        .unwrap_or(requested);
    CategoryToken::new(id, name)
}

fn rename_request(token: &CategoryToken, name: &str) -> (String, Value) {
    match token.id() {
        Some(id) => (format!("update-category/{}", id), json!({ "name": name })),
        None => (
            "update-category".to_string(),
            json!({ "oldName": token.label(), "name": name }),
        ),
    }
}

/// Text fields of the website form, in the order they are sent
fn text_fields(draft: &WebsiteDraft, id: Option<i64>) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(id) = id {
        fields.push(("id", id.to_string()));
    }
    fields.push(("title", draft.title.trim().to_string()));
    fields.push(("weburl", draft.url.trim().to_string()));
    fields.push(("conext", draft.snippet.trim().to_string()));

    if let Some(token) = &draft.category {
        fields.push(match token.id() {
            Some(category_id) => ("categoryId", category_id.to_string()),
            None => ("category", token.label().to_string()),
        });
    }
    if draft.remove_favicon {
        fields.push(("remove_favicon", "1".to_string()));
    }
    // Stored photos exist only when editing
    if id.is_some() {
        for path in &draft.photos_to_remove {
            fields.push(("delete_photos[]", path.clone()));
        }
    }
    fields
}

async fn website_form(draft: &WebsiteDraft, id: Option<i64>) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in text_fields(draft, id) {
        form = form.text(name, value);
    }

    if let Some(path) = &draft.favicon {
        form = form.part("favicon", file_part(path).await?);
    }
    for path in &draft.photos {
        form = form.part("photos[]", file_part(path).await?);
    }
    Ok(form)
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = CatalogClient::new("https://api.test/admin/").unwrap();
        assert_eq!(client.base_url(), "https://api.test/admin");
        assert_eq!(client.endpoint("/list-website"), "https://api.test/admin/list-website");
    }

    #[test]
    fn test_failure_message_prefers_server_text() {
        assert_eq!(failure_message(422, &json!({ "message": "Name taken" })), "Name taken");
        assert_eq!(failure_message(500, &json!({ "error": "boom" })), "boom");
        assert_eq!(failure_message(404, &Value::Null), "Request failed (404)");
    }

    #[test]
    fn test_created_category_reads_nested_fields() {
        let token = created_category(&json!({ "data": { "id": 12, "name": "Design" } }), "design");
        assert_eq!(token.to_string(), "12|Design");

        let token = created_category(&json!({ "id": "4" }), "Music");
        assert_eq!(token.to_string(), "4|Music");

        let token = created_category(&Value::Null, "Loose");
        assert_eq!(token.to_string(), "Loose");
    }

    #[test]
    fn test_rename_addresses_by_id_or_old_name() {
        let (path, body) = rename_request(&CategoryToken::parse("6|Design"), "Studio");
        assert_eq!(path, "update-category/6");
        assert_eq!(body, json!({ "name": "Studio" }));

        let (path, body) = rename_request(&CategoryToken::parse("Loose"), "Tight");
        assert_eq!(path, "update-category");
        assert_eq!(body, json!({ "oldName": "Loose", "name": "Tight" }));
    }

    #[test]
    fn test_edit_form_lists_photos_to_delete() {
        let draft = WebsiteDraft {
            title: " Rayfog ".into(),
            category: Some(CategoryToken::parse("3|Design")),
            photos_to_remove: vec!["photos/a.jpg".into(), "photos/b.jpg".into()],
            ..Default::default()
        };

        let fields = text_fields(&draft, Some(7));
        assert_eq!(fields[0], ("id", "7".to_string()));
        assert!(fields.contains(&("title", "Rayfog".to_string())));
        assert!(fields.contains(&("categoryId", "3".to_string())));
        let deleted: Vec<&str> = fields
            .iter()
            .filter(|(name, _)| *name == "delete_photos[]")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(deleted, vec!["photos/a.jpg", "photos/b.jpg"]);

        let created = text_fields(&draft, None);
        assert!(created.iter().all(|(name, _)| *name != "delete_photos[]" && *name != "id"));
    }

    #[tokio::test]
    async fn test_form_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("shot.png");
        std::fs::write(&photo, b"png bytes").unwrap();

        let draft = WebsiteDraft {
            title: "Rayfog".into(),
            category: Some(CategoryToken::parse("3|Design")),
            photos: vec![photo],
            ..Default::default()
        };
        assert!(website_form(&draft, Some(7)).await.is_ok());

        let missing = WebsiteDraft {
            photos: vec![dir.path().join("gone.png")],
            ..draft
        };
        assert!(matches!(
            website_form(&missing, None).await,
            Err(FolioError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_http_error() {
        let client = CatalogClient::new("http://127.0.0.1:9").unwrap();
        let result = client.list_websites().await;
        assert!(matches!(result, Err(FolioError::Http(_))));
    }
}
