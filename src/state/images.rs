/// Image load tracking for slides and favicons
///
/// Each reference (URL or `data:` URI) is loaded once. A reference that
/// fails stays `Failed` until the next reload: the view keeps its slot
/// empty instead of collapsing the layout or swapping in another image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use iced::widget::image::Handle;
use std::collections::HashMap;
use std::io::Cursor;

use crate::api::CatalogClient;
use crate::error::{FolioError, Result};

#[derive(Debug, Clone)]
pub enum ImageState {
    Loading,
    Ready(Handle),
    Failed,
}

#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<String, ImageState>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &str) -> Option<&ImageState> {
        self.images.get(reference)
    }

    pub fn handle(&self, reference: &str) -> Option<&Handle> {
        match self.images.get(reference) {
            Some(ImageState::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Mark unseen references as loading and return them for fetching
    pub fn request<'a, I>(&mut self, references: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut fresh = Vec::new();
        for reference in references {
            if reference.is_empty() || self.images.contains_key(reference) {
                continue;
            }
            self.images.insert(reference.to_string(), ImageState::Loading);
            fresh.push(reference.to_string());
        }
        fresh
    }

    /// Record the outcome of a load
    pub fn finish(&mut self, reference: String, result: std::result::Result<Handle, String>) {
        let state = match result {
            Ok(handle) => ImageState::Ready(handle),
            Err(e) => {
                log::warn!("Hiding image {}: {}", abbreviate(&reference), e);
                ImageState::Failed
            }
        };
        self.images.insert(reference, state);
    }

    /// Forget failed loads so the next `request` fetches them again.
    /// Returns how many were dropped.
    pub fn retry_failed(&mut self) -> usize {
        let before = self.images.len();
        self.images
            .retain(|_, state| !matches!(state, ImageState::Failed));
        before - self.images.len()
    }
}

/// Fetch or decode `reference` and turn it into a drawable handle
pub async fn load(client: CatalogClient, reference: String) -> Result<Handle> {
    let bytes = if reference.starts_with("data:") {
        decode_data_uri(&reference)?
    } else {
        client.fetch_bytes(&reference).await?
    };
    into_handle(bytes)
}

/// Decode a base64 `data:` URI into raw bytes
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| FolioError::DataUri("missing data: prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FolioError::DataUri("missing ',' separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(FolioError::DataUri("only base64 payloads are supported".into()));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| FolioError::DataUri(e.to_string()))
}

/// Check that `bytes` holds a readable image header, then wrap it
pub fn into_handle(bytes: Vec<u8>) -> Result<Handle> {
    let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    log::trace!("Loaded {}x{} image ({} bytes)", width, height, bytes.len());
    Ok(Handle::from_bytes(bytes))
}

/// Data URIs can be megabytes long; keep log lines short
fn abbreviate(reference: &str) -> &str {
    match reference.char_indices().nth(64) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_uri_decodes_to_handle() {
        let bytes = decode_data_uri(PIXEL_PNG).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert!(into_handle(bytes).is_ok());
    }

    #[test]
    fn test_rejects_non_base64_data_uri() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(FolioError::DataUri(_))
        ));
        assert!(decode_data_uri("data:image/png;base64").is_err());
    }

    #[test]
    fn test_garbage_bytes_are_not_an_image() {
        assert!(into_handle(b"<html>404</html>".to_vec()).is_err());
    }

    #[test]
    fn test_request_only_returns_unseen_references() {
        let mut store = ImageStore::new();
        let first = store.request(["a.png", "b.png", "a.png", ""]);
        assert_eq!(first, vec!["a.png", "b.png"]);
        assert!(matches!(store.get("a.png"), Some(ImageState::Loading)));

        let second = store.request(["b.png", "c.png"]);
        assert_eq!(second, vec!["c.png"]);
    }

    #[test]
    fn test_failed_reference_stays_failed() {
        let mut store = ImageStore::new();
        store.request(["broken.png"]);
        store.finish("broken.png".into(), Err("404".into()));
        assert!(matches!(store.get("broken.png"), Some(ImageState::Failed)));
        assert!(store.handle("broken.png").is_none());
        assert!(store.request(["broken.png"]).is_empty());
    }

    #[test]
    fn test_reload_retries_failed_references() {
        let mut store = ImageStore::new();
        store.request(["broken.png", "fine.png", "pending.png"]);
        store.finish("broken.png".into(), Err("timeout".into()));
        store.finish(
            "fine.png".into(),
            into_handle(decode_data_uri(PIXEL_PNG).unwrap()).map_err(|e| e.to_string()),
        );

        assert_eq!(store.retry_failed(), 1);
        assert!(store.get("broken.png").is_none());
        assert_eq!(
            store.request(["broken.png", "fine.png", "pending.png"]),
            vec!["broken.png"]
        );
    }

    #[test]
    fn test_abbreviate_long_references() {
        let long = "x".repeat(200);
        assert_eq!(abbreviate(&long).len(), 64);
        assert_eq!(abbreviate("short"), "short");
    }
}
