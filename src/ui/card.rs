/// Catalog card: favicon, title, gallery, dots, snippet and category

use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Alignment, Background, Border, Color, ContentFit, Element, Length, Shadow, Theme, Vector};

use super::slides;
use super::surface::GalleryTarget;
use crate::carousel::GalleryRegistry;
use crate::state::data::WebsiteEntry;
use crate::state::images::ImageStore;
use crate::Message;

pub const CARD_WIDTH: f32 = 340.0;
const FAVICON_SIZE: f32 = 24.0;

pub fn view<'a>(
    entry: &WebsiteEntry,
    galleries: &GalleryRegistry,
    images: &ImageStore,
) -> Element<'a, Message> {
    let media_height = CARD_WIDTH / galleries.config().aspect_ratio;
    let key = entry.gallery_key();

    let media: Element<'a, Message> = match galleries.get(&key) {
        Some(gallery) => column![
            container(slides::gallery(
                gallery,
                GalleryTarget::Grid(key.clone()),
                images,
                ContentFit::Cover,
            ))
            .width(Length::Fill)
            .height(media_height)
            .clip(true),
            container(slides::dots(gallery, GalleryTarget::Grid(key)))
                .width(Length::Fill)
                .center_x(Length::Fill),
        ]
        .spacing(4)
        .into(),
        // No photos: the favicon is a still preview that opens on click
        None => match entry.preview_image() {
            Some(reference) => button(
                container(slides::picture(reference, images, ContentFit::Contain))
                    .width(Length::Fill)
                    .height(media_height),
            )
            .padding(0)
            .width(Length::Fill)
            .style(button::text)
            .on_press(Message::OpenPreview(reference.to_string()))
            .into(),
            None => container(text("No images").size(12))
                .center_x(Length::Fill)
                .center_y(media_height)
                .into(),
        },
    };

    let header = row![favicon(entry, images), title_block(entry)]
        .spacing(10)
        .align_y(Alignment::Center);

    let mut body = column![header, media].spacing(10);
    if !entry.snippet.is_empty() {
        body = body.push(text(entry.snippet.clone()).size(14));
    }
    if !entry.category.is_empty() {
        body = body.push(
            text(entry.category.clone())
                .size(12)
                .color(Color::from_rgba(1.0, 1.0, 1.0, 0.5)),
        );
    }

    container(body)
        .width(CARD_WIDTH)
        .padding(12)
        .style(card_style)
        .into()
}

fn favicon<'a>(entry: &WebsiteEntry, images: &ImageStore) -> Element<'a, Message> {
    match entry.favicon.as_deref().and_then(|reference| images.handle(reference)) {
        Some(handle) => image(handle.clone())
            .width(FAVICON_SIZE)
            .height(FAVICON_SIZE)
            .into(),
        None => Space::new(FAVICON_SIZE, FAVICON_SIZE).into(),
    }
}

fn title_block<'a>(entry: &WebsiteEntry) -> Element<'a, Message> {
    let mut block = column![text(entry.title.clone()).size(18)].spacing(2);
    if !entry.url.is_empty() {
        block = block.push(
            text(entry.url.clone())
                .size(12)
                .color(Color::from_rgba(1.0, 1.0, 1.0, 0.7)),
        );
    }
    block.into()
}

pub fn card_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgb(0.11, 0.11, 0.14))),
        border: Border {
            color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
            width: 1.0,
            radius: 10.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
            offset: Vector::new(0.0, 4.0),
            blur_radius: 8.0,
        },
        ..container::Style::default()
    }
}
