/// State management module
///
/// This module handles all application state, including:
/// - The local cache database (library.rs)
/// - Shared data structures and API response normalization (data.rs)
/// - The in-memory catalog and its filters (catalog.rs)
/// - Image load tracking (images.rs)
/// - Website form drafts (draft.rs)

pub mod catalog;
pub mod data;
pub mod draft;
pub mod images;
pub mod library;
