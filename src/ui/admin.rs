/// Admin dashboard: website CRUD, category management and the entry list
/// with its own galleries.

use iced::widget::{
    button, checkbox, column, container, pick_list, row, scrollable, text, text_input, Space,
};
use iced_aw::Wrap;
use iced::{Alignment, Color, ContentFit, Element, Length, Task};
use rfd::FileDialog;
use std::path::Path;

use super::card::card_style;
use super::slides;
use super::surface::GalleryTarget;
use crate::api::CatalogClient;
use crate::carousel::GalleryRegistry;
use crate::state::catalog::{Catalog, ALL_CATEGORIES};
use crate::state::data::{CategoryToken, WebsiteEntry};
use crate::state::draft::WebsiteDraft;
use crate::state::images::ImageStore;
use crate::Message;

const THUMB_WIDTH: f32 = 240.0;
const STORED_PHOTO_WIDTH: f32 = 128.0;
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "gif", "ico", "svg"];

#[derive(Debug, Default)]
pub struct AdminState {
    form: Option<WebsiteForm>,
    confirm_delete: Option<i64>,
    new_category: String,
    /// Category picked for rename or removal
    managed_category: Option<String>,
    rename_to: String,
    busy: bool,
    errors: Vec<String>,
    notice: Option<String>,
}

/// Add form when `editing` is `None`, edit form otherwise
#[derive(Debug, Clone)]
struct WebsiteForm {
    editing: Option<i64>,
    draft: WebsiteDraft,
}

#[derive(Debug, Clone)]
pub enum AdminMessage {
    NewWebsite,
    Edit(i64),
    CloseForm,
    TitleChanged(String),
    UrlChanged(String),
    SnippetChanged(String),
    CategoryPicked(String),
    PickFavicon,
    RemoveFaviconToggled(bool),
    PickPhotos,
    ClearPhotos,
    /// Mark or unmark a stored photo for deletion on save
    TogglePhotoRemoval(String),
    Submit,
    Saved(Result<(), String>),
    AskDelete(i64),
    CancelDelete,
    ConfirmDelete,
    Deleted(i64, Result<(), String>),
    NewCategoryChanged(String),
    AddCategory,
    CategoryAdded(Result<CategoryToken, String>),
    ManagedCategoryPicked(String),
    RenameToChanged(String),
    RenameCategory,
    /// Old token and the renamed one
    CategoryRenamed(Result<(CategoryToken, CategoryToken), String>),
    RemoveCategory,
    CategoryRemoved(Result<CategoryToken, String>),
}

impl AdminState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        message: AdminMessage,
        catalog: &mut Catalog,
        api: &CatalogClient,
    ) -> Task<Message> {
        match message {
            AdminMessage::NewWebsite => {
                self.open_form(None, WebsiteDraft::default());
            }
            AdminMessage::Edit(id) => {
                if let Some(entry) = catalog.find(id) {
                    let token = catalog.token_for(&entry.category).cloned();
                    let draft = WebsiteDraft::from_entry(entry, token);
                    self.open_form(Some(id), draft);
                }
            }
            AdminMessage::CloseForm => {
                self.form = None;
                self.errors.clear();
            }
            AdminMessage::TitleChanged(value) => self.edit_draft(|d| d.title = value),
            AdminMessage::UrlChanged(value) => self.edit_draft(|d| d.url = value),
            AdminMessage::SnippetChanged(value) => self.edit_draft(|d| d.snippet = value),
            AdminMessage::CategoryPicked(label) => {
                let token = catalog
                    .token_for(&label)
                    .cloned()
                    .unwrap_or_else(|| CategoryToken::new(None, label));
                self.edit_draft(|d| d.category = Some(token));
            }
            AdminMessage::PickFavicon => {
                // Show the native file picker
                let file = FileDialog::new()
                    .set_title("Choose a favicon")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();
                if let Some(path) = file {
                    self.edit_draft(|d| {
                        d.favicon = Some(path);
                        d.remove_favicon = false;
                    });
                }
            }
            AdminMessage::RemoveFaviconToggled(remove) => self.edit_draft(|d| {
                d.remove_favicon = remove;
                if remove {
                    d.favicon = None;
                }
            }),
            AdminMessage::PickPhotos => {
                let files = FileDialog::new()
                    .set_title("Choose photos")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_files();
                if let Some(paths) = files {
                    self.edit_draft(|d| d.photos.extend(paths));
                }
            }
            AdminMessage::ClearPhotos => self.edit_draft(|d| d.photos.clear()),
            AdminMessage::TogglePhotoRemoval(reference) => {
                self.edit_draft(|d| d.toggle_removal(&reference))
            }
            AdminMessage::Submit => {
                let Some(form) = &self.form else {
                    return Task::none();
                };
                self.errors = form.draft.validate();
                if !self.errors.is_empty() || self.busy {
                    return Task::none();
                }

                self.busy = true;
                let api = api.clone();
                let draft = form.draft.clone();
                let editing = form.editing;
                return Task::perform(
                    async move {
                        let result = match editing {
                            Some(id) => api.update_website(id, &draft).await,
                            None => api.add_website(&draft).await,
                        };
                        result.map_err(|e| e.to_string())
                    },
                    |result| Message::Admin(AdminMessage::Saved(result)),
                );
            }
            AdminMessage::Saved(result) => {
                self.busy = false;
                match result {
                    Ok(()) => {
                        self.form = None;
                        self.errors.clear();
                        self.notice = Some("Website saved.".to_string());
                        return Task::done(Message::Reload);
                    }
                    Err(e) => {
                        log::warn!("Saving website failed: {}", e);
                        self.errors = vec![e];
                    }
                }
            }
            AdminMessage::AskDelete(id) => self.confirm_delete = Some(id),
            AdminMessage::CancelDelete => self.confirm_delete = None,
            AdminMessage::ConfirmDelete => {
                let Some(id) = self.confirm_delete.take() else {
                    return Task::none();
                };
                self.busy = true;
                let api = api.clone();
                return Task::perform(
                    async move { api.delete_website(id).await.map_err(|e| e.to_string()) },
                    move |result| Message::Admin(AdminMessage::Deleted(id, result)),
                );
            }
            AdminMessage::Deleted(id, result) => {
                self.busy = false;
                match result {
                    Ok(()) => {
                        catalog.remove_entry(id);
                        self.notice = Some("Website deleted.".to_string());
                        return Task::done(Message::Reload);
                    }
                    Err(e) => {
                        log::warn!("Deleting website {} failed: {}", id, e);
                        self.errors = vec![e];
                    }
                }
            }
            AdminMessage::NewCategoryChanged(value) => self.new_category = value,
            AdminMessage::AddCategory => {
                let name = self.new_category.trim().to_string();
                if name.is_empty() || self.busy {
                    return Task::none();
                }
                let exists = catalog
                    .categories()
                    .iter()
                    .any(|label| label.eq_ignore_ascii_case(&name));
                if exists {
                    self.errors = vec![format!("Category \"{}\" already exists.", name)];
                    return Task::none();
                }

                self.busy = true;
                let api = api.clone();
                return Task::perform(
                    async move { api.add_category(&name).await.map_err(|e| e.to_string()) },
                    |result| Message::Admin(AdminMessage::CategoryAdded(result)),
                );
            }
            AdminMessage::CategoryAdded(result) => {
                self.busy = false;
                match result {
                    Ok(token) => {
                        self.notice = Some(format!("Category \"{}\" added.", token.label()));
                        self.new_category.clear();
                        self.errors.clear();
                        catalog.merge_categories([token]);
                    }
                    Err(e) => self.errors = vec![e],
                }
            }
            AdminMessage::ManagedCategoryPicked(label) => {
                self.rename_to = label.clone();
                self.managed_category = Some(label);
            }
            AdminMessage::RenameToChanged(value) => self.rename_to = value,
            AdminMessage::RenameCategory => {
                let Some(label) = self.managed_category.clone() else {
                    return Task::none();
                };
                let name = self.rename_to.trim().to_string();
                if name.is_empty() || name == label || self.busy {
                    return Task::none();
                }
                let taken = catalog.categories().iter().any(|other| {
                    !other.eq_ignore_ascii_case(&label) && other.eq_ignore_ascii_case(&name)
                });
                if taken {
                    self.errors = vec![format!("Category \"{}\" already exists.", name)];
                    return Task::none();
                }
                let token = catalog
                    .token_for(&label)
                    .cloned()
                    .unwrap_or_else(|| CategoryToken::new(None, label));

                self.busy = true;
                let api = api.clone();
                return Task::perform(
                    async move {
                        api.update_category(&token, &name)
                            .await
                            .map(|renamed| (token, renamed))
                            .map_err(|e| e.to_string())
                    },
                    |result| Message::Admin(AdminMessage::CategoryRenamed(result)),
                );
            }
            AdminMessage::CategoryRenamed(result) => {
                self.busy = false;
                match result {
                    Ok((old, renamed)) => {
                        catalog.rename_category(&old, &renamed);
                        self.managed_category = Some(renamed.label().to_string());
                        self.errors.clear();
                        self.notice = Some(format!(
                            "Category \"{}\" renamed to \"{}\".",
                            old.label(),
                            renamed.label()
                        ));
                        return Task::done(Message::Reload);
                    }
                    Err(e) => {
                        log::warn!("Renaming category failed: {}", e);
                        self.errors = vec![e];
                    }
                }
            }
            AdminMessage::RemoveCategory => {
                let Some(label) = self.managed_category.clone() else {
                    return Task::none();
                };
                if self.busy {
                    return Task::none();
                }
                let token = catalog
                    .token_for(&label)
                    .cloned()
                    .unwrap_or_else(|| CategoryToken::new(None, label));

                self.busy = true;
                let api = api.clone();
                return Task::perform(
                    async move {
                        api.delete_category(&token)
                            .await
                            .map(|()| token)
                            .map_err(|e| e.to_string())
                    },
                    |result| Message::Admin(AdminMessage::CategoryRemoved(result)),
                );
            }
            AdminMessage::CategoryRemoved(result) => {
                self.busy = false;
                match result {
                    Ok(token) => {
                        let remaining: Vec<CategoryToken> = catalog
                            .tokens()
                            .iter()
                            .filter(|t| t.label() != token.label())
                            .cloned()
                            .collect();
                        catalog.replace_categories(remaining);
                        self.managed_category = None;
                        self.rename_to.clear();
                        self.errors.clear();
                        self.notice = Some(format!("Category \"{}\" removed.", token.label()));
                        return Task::done(Message::Reload);
                    }
                    Err(e) => self.errors = vec![e],
                }
            }
        }
        Task::none()
    }

    fn open_form(&mut self, editing: Option<i64>, draft: WebsiteDraft) {
        self.form = Some(WebsiteForm { editing, draft });
        self.errors.clear();
        self.notice = None;
    }

    fn edit_draft(&mut self, change: impl FnOnce(&mut WebsiteDraft)) {
        if let Some(form) = &mut self.form {
            change(&mut form.draft);
        }
    }

    // ========== View ==========

    pub fn view<'a>(
        &'a self,
        catalog: &'a Catalog,
        galleries: &'a GalleryRegistry,
        images: &'a ImageStore,
    ) -> Element<'a, Message> {
        let mut content = column![self.toolbar(), self.category_panel(catalog)].spacing(16);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice.as_str()).size(14));
        }
        if !self.errors.is_empty() {
            content = content.push(error_list(&self.errors));
        }
        if let Some(form) = &self.form {
            content = content.push(form_view(form, catalog, images, self.busy));
        }

        let rows = catalog
            .entries()
            .iter()
            .map(|entry| self.entry_row(entry, galleries, images));
        content = content.push(column(rows).spacing(12));

        scrollable(content.padding(24).width(Length::Fill))
            .height(Length::Fill)
            .into()
    }

    fn toolbar<'a>(&self) -> Element<'a, Message> {
        row![
            text("Websites").size(24),
            Space::with_width(Length::Fill),
            button("Add website")
                .style(button::primary)
                .on_press_maybe((!self.busy).then_some(Message::Admin(AdminMessage::NewWebsite))),
        ]
        .align_y(Alignment::Center)
        .into()
    }

    fn category_panel<'a>(&'a self, catalog: &Catalog) -> Element<'a, Message> {
        let labels: Vec<String> = catalog
            .categories()
            .into_iter()
            .filter(|label| label != ALL_CATEGORIES)
            .collect();

        let add = row![
            text_input("New category", &self.new_category)
                .on_input(|value| Message::Admin(AdminMessage::NewCategoryChanged(value)))
                .on_submit(Message::Admin(AdminMessage::AddCategory))
                .width(220),
            button("Add category").on_press_maybe(
                (!self.busy && !self.new_category.trim().is_empty())
                    .then_some(Message::Admin(AdminMessage::AddCategory)),
            ),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let picked = self.managed_category.is_some();
        let rename_ready = picked
            && !self.rename_to.trim().is_empty()
            && self.managed_category.as_deref() != Some(self.rename_to.trim());

        let manage = row![
            pick_list(labels, self.managed_category.clone(), |label| {
                Message::Admin(AdminMessage::ManagedCategoryPicked(label))
            })
            .placeholder("Choose a category")
            .width(220),
            text_input("New name", &self.rename_to)
                .on_input(|value| Message::Admin(AdminMessage::RenameToChanged(value)))
                .on_submit(Message::Admin(AdminMessage::RenameCategory))
                .width(180),
            button("Rename").on_press_maybe(
                (!self.busy && rename_ready).then_some(Message::Admin(AdminMessage::RenameCategory)),
            ),
            button("Remove category")
                .style(button::danger)
                .on_press_maybe(
                    (!self.busy && picked).then_some(Message::Admin(AdminMessage::RemoveCategory)),
                ),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        container(column![text("Categories").size(18), add, manage].spacing(8))
            .padding(12)
            .width(Length::Fill)
            .style(card_style)
            .into()
    }

    fn entry_row<'a>(
        &self,
        entry: &WebsiteEntry,
        galleries: &GalleryRegistry,
        images: &ImageStore,
    ) -> Element<'a, Message> {
        let height = THUMB_WIDTH / galleries.config().aspect_ratio;
        let key = entry.gallery_key();

        let media: Element<'a, Message> = match galleries.get(&key) {
            Some(gallery) => column![
                container(slides::gallery(
                    gallery,
                    GalleryTarget::Admin(key.clone()),
                    images,
                    ContentFit::Cover,
                ))
                .width(THUMB_WIDTH)
                .height(height)
                .clip(true),
                slides::dots(gallery, GalleryTarget::Admin(key)),
            ]
            .spacing(4)
            .width(THUMB_WIDTH)
            .into(),
            None => container(text("No photos").size(12))
                .center_x(THUMB_WIDTH)
                .center_y(height)
                .into(),
        };

        let details = column![
            text(entry.title.clone()).size(18),
            text(entry.url.clone())
                .size(12)
                .color(Color::from_rgba(1.0, 1.0, 1.0, 0.7)),
            text(entry.category.clone()).size(12),
            text(entry.snippet.clone()).size(13),
        ]
        .spacing(4)
        .width(Length::Fill);

        let actions: Element<'a, Message> = match entry.id {
            Some(id) if self.confirm_delete == Some(id) => column![
                text("Delete this website?").size(13),
                row![
                    button("Delete")
                        .style(button::danger)
                        .on_press_maybe((!self.busy).then_some(Message::Admin(AdminMessage::ConfirmDelete))),
                    button("Cancel")
                        .style(button::secondary)
                        .on_press(Message::Admin(AdminMessage::CancelDelete)),
                ]
                .spacing(6),
            ]
            .spacing(6)
            .into(),
            Some(id) => column![
                button("Edit")
                    .width(80)
                    .on_press_maybe((!self.busy).then_some(Message::Admin(AdminMessage::Edit(id)))),
                button("Delete")
                    .width(80)
                    .style(button::danger)
                    .on_press_maybe((!self.busy).then_some(Message::Admin(AdminMessage::AskDelete(id)))),
            ]
            .spacing(6)
            .into(),
            // Without an id the API cannot address the entry
            None => Space::with_width(80).into(),
        };

        container(
            row![media, details, actions]
                .spacing(16)
                .align_y(Alignment::Start),
        )
        .padding(12)
        .width(Length::Fill)
        .style(card_style)
        .into()
    }
}

fn form_view<'a>(
    form: &'a WebsiteForm,
    catalog: &Catalog,
    images: &ImageStore,
    busy: bool,
) -> Element<'a, Message> {
    let draft = &form.draft;
    let heading = if form.editing.is_some() { "Edit website" } else { "Add website" };

    let labels: Vec<String> = catalog
        .categories()
        .into_iter()
        .filter(|label| label != ALL_CATEGORIES)
        .collect();
    let selected = draft.category.as_ref().map(|token| token.label().to_string());

    let favicon_label = match &draft.favicon {
        Some(path) => file_name(path),
        None => "No new favicon".to_string(),
    };
    let photos_label = match draft.photos.len() {
        0 => "No new photos".to_string(),
        1 => "1 photo selected".to_string(),
        n => format!("{} photos selected", n),
    };

    let mut fields = column![
        text(heading).size(20),
        text_input("Title", &draft.title)
            .on_input(|value| Message::Admin(AdminMessage::TitleChanged(value))),
        text_input("https://example.com", &draft.url)
            .on_input(|value| Message::Admin(AdminMessage::UrlChanged(value))),
        text_input("Description", &draft.snippet)
            .on_input(|value| Message::Admin(AdminMessage::SnippetChanged(value))),
        pick_list(labels, selected, |label| {
            Message::Admin(AdminMessage::CategoryPicked(label))
        })
        .placeholder("Choose a category"),
        row![
            button("Choose favicon").on_press(Message::Admin(AdminMessage::PickFavicon)),
            text(favicon_label).size(13),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    ]
    .spacing(10);

    if form.editing.is_some() {
        fields = fields.push(
            checkbox("Remove current favicon", draft.remove_favicon)
                .on_toggle(|remove| Message::Admin(AdminMessage::RemoveFaviconToggled(remove))),
        );
        if !draft.existing_photos.is_empty() {
            fields = fields.push(stored_photos(draft, images));
        }
    }

    fields = fields.push(
        row![
            button("Choose photos").on_press(Message::Admin(AdminMessage::PickPhotos)),
            button("Clear")
                .style(button::secondary)
                .on_press_maybe((!draft.photos.is_empty()).then_some(Message::Admin(AdminMessage::ClearPhotos))),
            text(photos_label).size(13),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    );

    let submit_label = if busy { "Saving..." } else { "Save" };
    fields = fields.push(
        row![
            button(submit_label)
                .style(button::primary)
                .on_press_maybe((!busy).then_some(Message::Admin(AdminMessage::Submit))),
            button("Cancel")
                .style(button::secondary)
                .on_press(Message::Admin(AdminMessage::CloseForm)),
        ]
        .spacing(8),
    );

    container(fields)
        .padding(16)
        .width(Length::Fill)
        .style(card_style)
        .into()
}

/// Photos the entry already has, each with a remove/keep toggle
fn stored_photos<'a>(draft: &WebsiteDraft, images: &ImageStore) -> Element<'a, Message> {
    let height = STORED_PHOTO_WIDTH * 0.625;
    let tiles = draft
        .existing_photos
        .iter()
        .map(|reference| {
            let marked = draft.is_marked_for_removal(reference);
            let preview: Element<'a, Message> = if marked {
                container(text("Will be removed").size(12))
                    .center_x(STORED_PHOTO_WIDTH)
                    .center_y(height)
                    .into()
            } else {
                container(slides::picture(reference, images, ContentFit::Cover))
                    .width(STORED_PHOTO_WIDTH)
                    .height(height)
                    .clip(true)
                    .into()
            };
            let toggle = button(text(if marked { "Keep" } else { "Remove" }).size(12))
                .style(if marked { button::secondary } else { button::danger })
                .on_press(Message::Admin(AdminMessage::TogglePhotoRemoval(reference.clone())));

            column![preview, toggle]
                .spacing(4)
                .align_x(Alignment::Center)
                .into()
        })
        .collect();

    column![
        text("Current photos").size(14),
        Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0),
    ]
    .spacing(6)
    .into()
}

fn error_list<'a>(errors: &[String]) -> Element<'a, Message> {
    let lines = errors.iter().map(|error| {
        text(error.clone())
            .size(14)
            .color(Color::from_rgb(0.95, 0.45, 0.45))
            .into()
    });
    column(lines).spacing(4).into()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
