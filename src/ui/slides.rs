/// Gallery rendering shared by cards, the admin list and the lightbox

use iced::widget::{button, canvas, container, image, row, stack, text, Space};
use iced::{Alignment, Background, Border, Color, ContentFit, Element, Length, Theme};

use super::surface::{DragSurface, GalleryTarget};
use crate::carousel::Gallery;
use crate::state::images::{ImageState, ImageStore};
use crate::Message;

/// Slides on screen at the gallery's rendered offset.
///
/// Between two rest positions the leading and trailing slides share the
/// width in proportion to how far the track has moved.
pub fn track<'a>(gallery: &Gallery, images: &ImageStore, fit: ContentFit) -> Element<'a, Message> {
    let Some(visible) = gallery.visible_slides() else {
        return Space::new(Length::Fill, Length::Fill).into();
    };

    if visible.fraction <= 0.0 {
        return slot(gallery, visible.leading, images, fit);
    }

    row![
        container(slot(gallery, visible.leading, images, fit))
            .width(Length::FillPortion(portion(1.0 - visible.fraction)))
            .height(Length::Fill)
            .clip(true),
        container(slot(gallery, visible.trailing, images, fit))
            .width(Length::FillPortion(portion(visible.fraction)))
            .height(Length::Fill)
            .clip(true),
    ]
    .into()
}

fn portion(share: f32) -> u16 {
    ((share * 1000.0).round() as u16).max(1)
}

fn slot<'a>(
    gallery: &Gallery,
    index: Option<usize>,
    images: &ImageStore,
    fit: ContentFit,
) -> Element<'a, Message> {
    match index.and_then(|i| gallery.slides().get(i)) {
        Some(reference) => picture(reference, images, fit),
        None => Space::new(Length::Fill, Length::Fill).into(),
    }
}

/// One image reference at full size of its slot
pub fn picture<'a>(reference: &str, images: &ImageStore, fit: ContentFit) -> Element<'a, Message> {
    match images.get(reference) {
        Some(ImageState::Ready(handle)) => image(handle.clone())
            .content_fit(fit)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Some(ImageState::Loading) => container(text("Loading...").size(12))
            .center(Length::Fill)
            .into(),
        // Failed loads keep their slot and show nothing
        _ => Space::new(Length::Fill, Length::Fill).into(),
    }
}

/// Slides, drag surface and prev/next arrows stacked in that order
pub fn gallery<'a>(
    gallery: &Gallery,
    target: GalleryTarget,
    images: &ImageStore,
    fit: ContentFit,
) -> Element<'a, Message> {
    let surface = canvas(DragSurface::new(target.clone()))
        .width(Length::Fill)
        .height(Length::Fill);

    let mut layers = stack![track(gallery, images, fit), surface];
    if gallery.len() > 1 {
        layers = layers.push(arrows(target));
    }
    layers.width(Length::Fill).height(Length::Fill).into()
}

fn arrows<'a>(target: GalleryTarget) -> Element<'a, Message> {
    let arrow = |label: &'static str, delta: i64| {
        button(text(label).size(20))
            .padding([2, 10])
            .style(button::secondary)
            .on_press(Message::Step(target.clone(), delta))
    };

    container(
        row![arrow("‹", -1), Space::with_width(Length::Fill), arrow("›", 1)]
            .align_y(Alignment::Center)
            .padding(6),
    )
    .height(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

/// Indicator dots following the live preview index during a drag
pub fn dots<'a>(gallery: &Gallery, target: GalleryTarget) -> Element<'a, Message> {
    let active = gallery.display_index();
    let dots = (0..gallery.len()).map(|index| {
        let is_active = index == active;
        let dot = container(Space::new(8, 8)).style(move |theme: &Theme| dot_style(theme, is_active));
        button(dot)
            .padding(3)
            .style(button::text)
            .on_press(Message::GoTo(target.clone(), index))
            .into()
    });
    row(dots).spacing(2).align_y(Alignment::Center).into()
}

fn dot_style(theme: &Theme, active: bool) -> container::Style {
    let color = if active {
        theme.extended_palette().primary.strong.color
    } else {
        Color::from_rgba(1.0, 1.0, 1.0, 0.3)
    };
    container::Style {
        background: Some(Background::Color(color)),
        border: Border {
            radius: 4.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    }
}
