use iced::widget::{button, column, container, opaque, row, text, Space};
use iced::{Alignment, Background, Color, ContentFit, Element, Length, Theme};

use super::slides;
use super::surface::GalleryTarget;
use crate::carousel::Lightbox;
use crate::state::images::ImageStore;
use crate::Message;

/// Full-window overlay. It is opaque to the pointer, so the page underneath
/// neither scrolls nor reacts while it is shown.
///
/// After closing only the backdrop remains, fading out and letting input
/// through to the page.
pub fn view<'a>(lightbox: &Lightbox, images: &ImageStore) -> Element<'a, Message> {
    if !lightbox.is_open() {
        let opacity = lightbox.opacity();
        return container(Space::new(Length::Fill, Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |theme: &Theme| backdrop(theme, opacity))
            .into();
    }

    let gallery = lightbox.gallery();
    let (position, total) = lightbox.counter();

    let top_bar = row![
        text(format!("{} / {}", position, total)).size(16),
        Space::with_width(Length::Fill),
        button(text("✕").size(18))
            .padding([4, 12])
            .style(button::secondary)
            .on_press(Message::CloseLightbox),
    ]
    .align_y(Alignment::Center);

    let stage = container(slides::gallery(
        gallery,
        GalleryTarget::Lightbox,
        images,
        ContentFit::Contain,
    ))
    .width(Length::Fill)
    .height(Length::Fill)
    .clip(true);

    let content = column![top_bar, stage].spacing(12).padding(24);

    opaque(
        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|theme: &Theme| backdrop(theme, 1.0)),
    )
}

fn backdrop(_theme: &Theme, opacity: f32) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.88 * opacity))),
        text_color: Some(Color::WHITE),
        ..container::Style::default()
    }
}
