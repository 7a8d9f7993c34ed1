use env_logger::{Builder, Target};
use iced::keyboard::{self, key::Named, Key};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, stack, text, text_input, Space};
use iced::{time, window, Alignment, Element, Length, Subscription, Task, Theme};
use iced_aw::Wrap;
use log::LevelFilter;
use std::time::{Duration, Instant};

mod api;
mod carousel;
mod config;
mod error;
mod state;
mod ui;

use api::CatalogClient;
use carousel::{GalleryRegistry, Lightbox, LightboxKey};
use config::Settings;
use state::catalog::{Catalog, ALL_CATEGORIES};
use state::data::{CategoryToken, WebsiteEntry};
use state::images::{self, ImageStore};
use state::library::Library;
use ui::admin::{AdminMessage, AdminState};
use ui::surface::{GalleryEvent, GalleryTarget};

/// Drives autoplay and the lightbox teardown; finer than any configured interval
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one catalog fetch
#[derive(Debug, Clone)]
pub struct CatalogListing {
    entries: Vec<WebsiteEntry>,
    categories: Vec<CategoryToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Gallery,
    Admin,
}

/// Main application state
struct Folio {
    api: CatalogClient,
    /// Offline cache; `None` when no database could be opened at all
    library: Option<Library>,
    catalog: Catalog,
    active_category: String,
    search: String,
    mode: Mode,
    grid: GalleryRegistry,
    admin_galleries: GalleryRegistry,
    lightbox: Lightbox,
    images: ImageStore,
    admin: AdminState,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Reload,
    CatalogLoaded(Result<CatalogListing, String>),
    CategorySelected(String),
    SearchChanged(String),
    ShowGallery,
    ShowAdmin,
    /// Still preview of an entry without photos
    OpenPreview(String),
    /// Arrow buttons
    Step(GalleryTarget, i64),
    /// Indicator dots
    GoTo(GalleryTarget, usize),
    /// Pointer and touch input from a drag surface
    Gallery(GalleryTarget, GalleryEvent),
    CloseLightbox,
    LightboxKey(LightboxKey),
    Tick(Instant),
    Frame(Instant),
    Resized,
    ImageLoaded(String, Result<Handle, String>),
    Admin(AdminMessage),
}

impl Folio {
    fn new(settings: Settings, api: CatalogClient) -> (Self, Task<Message>) {
        let library = match Library::open_default() {
            Ok(library) => Some(library),
            Err(e) => {
                log::warn!("Could not open the library, using a temporary one: {}", e);
                Library::open_in_memory()
                    .map_err(|e| log::error!("Offline cache disabled: {}", e))
                    .ok()
            }
        };

        let active_category = library
            .as_ref()
            .and_then(|library| library.active_category().ok().flatten())
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());

        let mut app = Folio {
            api,
            library,
            catalog: Catalog::new(),
            active_category,
            search: String::new(),
            mode: Mode::Gallery,
            grid: GalleryRegistry::new(settings.grid_surface()),
            admin_galleries: GalleryRegistry::new(settings.admin_surface()),
            lightbox: Lightbox::new(settings.lightbox_surface(), settings.swipe()),
            images: ImageStore::new(),
            admin: AdminState::new(),
            status: "Loading websites...".to_string(),
        };

        // Show the cached listing while the fresh one loads
        let cached = app.restore_cache();
        log::info!("Folio initialized with {} cached websites", cached);

        let image_loads = app.sync_galleries();
        let load = Task::perform(fetch_listing(app.api.clone()), Message::CatalogLoaded);
        (app, Task::batch([image_loads, load]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Reload => {
                let retried = self.images.retry_failed();
                if retried > 0 {
                    log::debug!("Retrying {} failed images", retried);
                }
                self.status = "Loading websites...".to_string();
                return Task::perform(fetch_listing(self.api.clone()), Message::CatalogLoaded);
            }
            Message::CatalogLoaded(Ok(listing)) => {
                self.status = format!("{} websites", listing.entries.len());

                if let Some(library) = &mut self.library {
                    if let Err(e) = library.replace_entries(&listing.entries) {
                        log::warn!("Could not cache the listing: {}", e);
                    }
                    if let Err(e) = library.replace_categories(&listing.categories) {
                        log::warn!("Could not cache categories: {}", e);
                    }
                }

                self.catalog.set_entries(listing.entries);
                self.catalog.replace_categories(listing.categories);
                return self.sync_galleries();
            }
            Message::CatalogLoaded(Err(e)) => {
                log::warn!("Loading the catalog failed: {}", e);
                let cached = self.restore_cache();
                self.status = match self.library.as_ref().and_then(|l| l.cached_at().ok().flatten()) {
                    Some(at) if cached > 0 => format!(
                        "Offline: showing {} websites cached {}",
                        cached,
                        at.format("%Y-%m-%d %H:%M UTC")
                    ),
                    _ => e,
                };
                return self.sync_galleries();
            }
            Message::CategorySelected(label) => {
                self.select_category(label);
                return self.sync_galleries();
            }
            Message::SearchChanged(search) => {
                self.search = search;
                return self.sync_galleries();
            }
            Message::ShowGallery => {
                self.mode = Mode::Gallery;
                return self.sync_galleries();
            }
            Message::ShowAdmin => {
                self.mode = Mode::Admin;
                return self.sync_galleries();
            }
            Message::Step(target, delta) => match target {
                GalleryTarget::Grid(key) => {
                    self.grid.step_by(&key, delta);
                }
                GalleryTarget::Admin(key) => {
                    self.admin_galleries.step_by(&key, delta);
                }
                GalleryTarget::Lightbox => {
                    if delta < 0 {
                        self.lightbox.prev();
                    } else {
                        self.lightbox.next();
                    }
                }
            },
            Message::GoTo(target, index) => match target {
                GalleryTarget::Grid(key) => {
                    self.grid.go_to(&key, index);
                }
                GalleryTarget::Admin(key) => {
                    self.admin_galleries.go_to(&key, index);
                }
                GalleryTarget::Lightbox => {
                    self.lightbox.go_to(index);
                }
            },
            Message::Gallery(target, event) => self.on_gallery_event(target, event),
            Message::OpenPreview(reference) => {
                let now = Instant::now();
                if self.lightbox.open(vec![reference], 0, now) {
                    self.grid.cancel_all(now);
                    self.admin_galleries.cancel_all(now);
                }
            }
            Message::CloseLightbox => self.lightbox.close(Instant::now()),
            Message::LightboxKey(key) => {
                self.lightbox.on_key(key, Instant::now());
            }
            Message::Tick(now) => {
                if !self.lightbox.page_suspended() {
                    self.grid.tick(now);
                    self.admin_galleries.tick(now);
                }
                self.lightbox.tick(now);
            }
            Message::Frame(now) => {
                self.grid.advance(now);
                self.admin_galleries.advance(now);
                self.lightbox.advance(now);
            }
            Message::Resized => {
                self.grid.resize_all();
                self.admin_galleries.resize_all();
                self.lightbox.resize();
            }
            Message::ImageLoaded(reference, result) => self.images.finish(reference, result),
            Message::Admin(message) => {
                if let AdminMessage::CategoryRenamed(Ok((old, renamed))) = &message {
                    if self.active_category.eq_ignore_ascii_case(old.label()) {
                        self.select_category(renamed.label().to_string());
                    }
                }
                let task = self.admin.update(message, &mut self.catalog, &self.api);
                return Task::batch([task, self.sync_galleries()]);
            }
        }

        Task::none()
    }

    /// Switch the category filter and remember it for the next launch
    fn select_category(&mut self, label: String) {
        if let Some(library) = &self.library {
            if let Err(e) = library.set_active_category(&label) {
                log::warn!("Could not remember category {}: {}", label, e);
            }
        }
        self.active_category = label;
    }

    fn on_gallery_event(&mut self, target: GalleryTarget, event: GalleryEvent) {
        let now = Instant::now();

        let (registry, key) = match target {
            GalleryTarget::Grid(key) => (&mut self.grid, key),
            GalleryTarget::Admin(key) => (&mut self.admin_galleries, key),
            GalleryTarget::Lightbox => return self.on_lightbox_event(event, now),
        };

        match event {
            GalleryEvent::Press { x, width, .. } => {
                registry.press(&key, x, width);
            }
            GalleryEvent::Move { x, width } => {
                registry.drag_to(&key, x, width);
            }
            GalleryEvent::Release { .. } => {
                let Some(snap) = registry.release(&key, now) else {
                    return;
                };
                // A press without travel is a click: open that slide
                if snap.tap {
                    let slides = registry
                        .get(&key)
                        .map(|gallery| gallery.slides().to_vec())
                        .unwrap_or_default();
                    if self.lightbox.open(slides, snap.index, now) {
                        self.grid.cancel_all(now);
                        self.admin_galleries.cancel_all(now);
                    }
                }
            }
            GalleryEvent::Cancel { .. } => {
                registry.cancel(&key, now);
            }
            GalleryEvent::Hover(hovered) => registry.set_hovered(&key, hovered),
        }
    }

    fn on_lightbox_event(&mut self, event: GalleryEvent, now: Instant) {
        match event {
            // Touch navigates by swipe, the mouse by dragging the track
            GalleryEvent::Press { x, touch: true, .. } => self.lightbox.touch_start(x),
            GalleryEvent::Press { x, width, touch: false } => {
                self.lightbox.press(x, width);
            }
            GalleryEvent::Move { x, width } => {
                self.lightbox.drag_to(x, width);
            }
            GalleryEvent::Release { x, touch: true } => {
                self.lightbox.touch_end(x, now);
            }
            GalleryEvent::Release { touch: false, .. } => {
                self.lightbox.release(now);
            }
            GalleryEvent::Cancel { touch: true } => {
                self.lightbox.touch_end(None, now);
            }
            GalleryEvent::Cancel { touch: false } => {
                self.lightbox.cancel(now);
            }
            GalleryEvent::Hover(_) => {}
        }
    }

    /// Load the cached listing into the catalog. Returns how many entries it held.
    fn restore_cache(&mut self) -> usize {
        let Some(library) = &self.library else {
            return 0;
        };
        let entries = library.cached_entries().unwrap_or_else(|e| {
            log::warn!("Could not read cached listing: {}", e);
            Vec::new()
        });
        let categories = library.cached_categories().unwrap_or_default();
        if entries.is_empty() {
            return 0;
        }

        let count = entries.len();
        self.catalog.set_entries(entries);
        self.catalog.replace_categories(categories);
        count
    }

    /// Mount galleries for what the current mode shows, unmount the rest,
    /// and start loading any images they need.
    fn sync_galleries(&mut self) -> Task<Message> {
        let (grid_entries, admin_entries): (Vec<&WebsiteEntry>, Vec<&WebsiteEntry>) = match self.mode {
            Mode::Gallery => (
                self.catalog.filtered(&self.active_category, &self.search),
                Vec::new(),
            ),
            Mode::Admin => (Vec::new(), self.catalog.entries().iter().collect()),
        };

        let references: Vec<String> = grid_entries
            .iter()
            .chain(admin_entries.iter())
            .flat_map(|entry| entry.photos.iter().chain(entry.favicon.iter()))
            .cloned()
            .collect();

        self.grid.sync(
            grid_entries
                .iter()
                .map(|entry| (entry.gallery_key(), entry.photos.clone())),
        );
        self.admin_galleries.sync(
            admin_entries
                .iter()
                .map(|entry| (entry.gallery_key(), entry.photos.clone())),
        );

        let fresh = self.images.request(references.iter().map(String::as_str));
        Task::batch(fresh.into_iter().map(|reference| {
            let key = reference.clone();
            Task::perform(images::load(self.api.clone(), reference), move |result| {
                Message::ImageLoaded(key.clone(), result.map_err(|e| e.to_string()))
            })
        }))
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let nav_button = |label: &'static str, mode: Mode, message: Message| {
            button(label)
                .padding([6, 14])
                .style(if self.mode == mode { button::primary } else { button::secondary })
                .on_press(message)
        };

        let header = row![
            text("Folio").size(28),
            Space::with_width(Length::Fill),
            nav_button("Gallery", Mode::Gallery, Message::ShowGallery),
            nav_button("Admin", Mode::Admin, Message::ShowAdmin),
            button("Reload")
                .padding([6, 14])
                .style(button::text)
                .on_press(Message::Reload),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let body = match self.mode {
            Mode::Gallery => self.gallery_view(),
            Mode::Admin => self
                .admin
                .view(&self.catalog, &self.admin_galleries, &self.images),
        };

        let page = column![header, text(self.status.as_str()).size(14), body]
            .spacing(16)
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill);

        // Same tree shape open or closed, so the page keeps its scroll state
        let mut layers = stack![page];
        if self.lightbox.is_visible() {
            layers = layers.push(ui::lightbox::view(&self.lightbox, &self.images));
        }
        layers.into()
    }

    fn gallery_view(&self) -> Element<Message> {
        let chips = self.catalog.categories().into_iter().map(|label| {
            let active = label.eq_ignore_ascii_case(&self.active_category);
            button(text(label.clone()).size(14))
                .padding([4, 12])
                .style(if active { button::primary } else { button::secondary })
                .on_press(Message::CategorySelected(label))
                .into()
        });

        let filters = column![
            text_input("Search websites", &self.search)
                .on_input(Message::SearchChanged)
                .width(320),
            Wrap::with_elements(chips.collect()).spacing(8.0).line_spacing(8.0),
        ]
        .spacing(12);

        let entries = self.catalog.filtered(&self.active_category, &self.search);
        let grid: Element<Message> = if entries.is_empty() {
            container(text("No websites match.").size(16))
                .center_x(Length::Fill)
                .padding(40)
                .into()
        } else {
            let cards = entries
                .into_iter()
                .map(|entry| ui::card::view(entry, &self.grid, &self.images))
                .collect();
            Wrap::with_elements(cards)
                .spacing(16.0)
                .line_spacing(16.0)
                .into()
        };

        column![filters, scrollable(grid).height(Length::Fill)]
            .spacing(16)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            time::every(TICK_INTERVAL).map(Message::Tick),
            window::resize_events().map(|_| Message::Resized),
        ];

        // Per-frame redraws only while something moves
        if self.grid.is_active() || self.admin_galleries.is_active() || self.lightbox.is_active() {
            subscriptions.push(window::frames().map(Message::Frame));
        }
        // Keyboard bindings exist only while the lightbox is open
        if self.lightbox.is_open() {
            subscriptions.push(keyboard::on_key_press(lightbox_key));
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn lightbox_key(key: Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    let key = match key.as_ref() {
        Key::Named(Named::Escape) => LightboxKey::Escape,
        Key::Named(Named::ArrowLeft) => LightboxKey::ArrowLeft,
        Key::Named(Named::ArrowRight) => LightboxKey::ArrowRight,
        _ => return None,
    };
    Some(Message::LightboxKey(key))
}

/// Fetch websites and categories. A category failure is not fatal: the
/// labels found on the entries still fill the filter.
async fn fetch_listing(api: CatalogClient) -> Result<CatalogListing, String> {
    let entries = api.list_websites().await.map_err(|e| e.to_string())?;
    let categories = api.list_categories().await.unwrap_or_else(|e| {
        log::warn!("Loading categories failed: {}", e);
        Vec::new()
    });
    Ok(CatalogListing { entries, categories })
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("folio_gallery", LevelFilter::Debug)
        .init();
}

fn main() -> iced::Result {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let settings = Settings::load();
    let api = match CatalogClient::new(&settings.api_base_url) {
        Ok(api) => api,
        Err(e) => {
            log::error!("Could not create the HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Using catalog API at {}", api.base_url());

    iced::application("Folio Gallery", Folio::update, Folio::view)
        .subscription(Folio::subscription)
        .theme(Folio::theme)
        .centered()
        .run_with(move || Folio::new(settings, api))
}
