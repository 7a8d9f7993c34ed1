/// UI widgets
///
/// - surface.rs: invisible canvas that turns pointer input into gallery gestures
/// - slides.rs: slide track, arrows and dots shared by every gallery
/// - card.rs: catalog card
/// - lightbox.rs: full-window image overlay
/// - admin.rs: admin dashboard

pub mod admin;
pub mod card;
pub mod lightbox;
pub mod slides;
pub mod surface;
