use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Program};
use iced::{Point, Rectangle, Renderer, Theme};

use crate::carousel::GalleryKey;
use crate::Message;

/// Which gallery a gesture belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryTarget {
    Grid(GalleryKey),
    Admin(GalleryKey),
    Lightbox,
}

/// Pointer input over a gallery, in coordinates relative to its left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryEvent {
    Press { x: f32, width: f32, touch: bool },
    Move { x: f32, width: f32 },
    /// `x` is `None` when the pointer left the window before the release
    Release { x: Option<f32>, touch: bool },
    Cancel { touch: bool },
    Hover(bool),
}

/// Invisible canvas laid over the slides of one gallery.
/// Overlay buttons are stacked above it and capture their own presses.
pub struct DragSurface {
    pub target: GalleryTarget,
}

impl DragSurface {
    pub fn new(target: GalleryTarget) -> Self {
        Self { target }
    }

    fn emit(&self, event: GalleryEvent) -> (canvas::event::Status, Option<Message>) {
        (
            canvas::event::Status::Captured,
            Some(Message::Gallery(self.target.clone(), event)),
        )
    }
}

impl Program<Message> for DragSurface {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        // Slides are drawn by the widgets underneath
        vec![]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let relative = |position: Point| position.x - bounds.x;

        match event {
            // Primary button down over the slides starts a drag
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.pressed = true;
                    return self.emit(GalleryEvent::Press {
                        x: position.x,
                        width: bounds.width,
                        touch: false,
                    });
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.pressed {
                    state.pressed = false;
                    return self.emit(GalleryEvent::Release {
                        x: cursor.position().map(relative),
                        touch: false,
                    });
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.pressed {
                    if let Some(position) = cursor.position() {
                        return self.emit(GalleryEvent::Move {
                            x: relative(position),
                            width: bounds.width,
                        });
                    }
                } else if let Some(position) = cursor.position() {
                    let over = bounds.contains(position);
                    if over != state.hovered {
                        state.hovered = over;
                        return (
                            canvas::event::Status::Ignored,
                            Some(Message::Gallery(self.target.clone(), GalleryEvent::Hover(over))),
                        );
                    }
                }
            }

            // Pointer left the window: treat an open drag as lost
            canvas::Event::Mouse(mouse::Event::CursorLeft) => {
                if state.pressed {
                    state.pressed = false;
                    return self.emit(GalleryEvent::Cancel { touch: false });
                }
                if state.hovered {
                    state.hovered = false;
                    return (
                        canvas::event::Status::Ignored,
                        Some(Message::Gallery(self.target.clone(), GalleryEvent::Hover(false))),
                    );
                }
            }

            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if state.finger.is_none() && bounds.contains(position) {
                    state.finger = Some(id);
                    return self.emit(GalleryEvent::Press {
                        x: relative(position),
                        width: bounds.width,
                        touch: true,
                    });
                }
            }

            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                if state.finger == Some(id) {
                    return self.emit(GalleryEvent::Move {
                        x: relative(position),
                        width: bounds.width,
                    });
                }
            }

            canvas::Event::Touch(touch::Event::FingerLifted { id, position }) => {
                if state.finger == Some(id) {
                    state.finger = None;
                    return self.emit(GalleryEvent::Release {
                        x: Some(relative(position)),
                        touch: true,
                    });
                }
            }

            canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => {
                if state.finger == Some(id) {
                    state.finger = None;
                    return self.emit(GalleryEvent::Cancel { touch: true });
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if state.pressed {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Per-widget gesture state kept by iced between events
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub pressed: bool,
    pub hovered: bool,
    pub finger: Option<touch::Finger>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 50.0), Size::new(300.0, 200.0))
    }

    fn gesture(result: (canvas::event::Status, Option<Message>)) -> Option<GalleryEvent> {
        match result.1 {
            Some(Message::Gallery(_, event)) => Some(event),
            _ => None,
        }
    }

    fn mouse_event(event: mouse::Event) -> canvas::Event {
        canvas::Event::Mouse(event)
    }

    #[test]
    fn test_drag_coordinates_are_relative_to_the_surface() {
        let surface = DragSurface::new(GalleryTarget::Lightbox);
        let mut state = DragState::default();

        let press = surface.update(
            &mut state,
            mouse_event(mouse::Event::ButtonPressed(mouse::Button::Left)),
            bounds(),
            Cursor::Available(Point::new(250.0, 100.0)),
        );
        assert_eq!(press.0, canvas::event::Status::Captured);
        assert_eq!(
            gesture(press),
            Some(GalleryEvent::Press { x: 150.0, width: 300.0, touch: false })
        );

        // Moves keep reporting outside the bounds while pressed
        let at = Point::new(70.0, 100.0);
        let moved = surface.update(
            &mut state,
            mouse_event(mouse::Event::CursorMoved { position: at }),
            bounds(),
            Cursor::Available(at),
        );
        assert_eq!(gesture(moved), Some(GalleryEvent::Move { x: -30.0, width: 300.0 }));

        let released = surface.update(
            &mut state,
            mouse_event(mouse::Event::ButtonReleased(mouse::Button::Left)),
            bounds(),
            Cursor::Unavailable,
        );
        assert_eq!(gesture(released), Some(GalleryEvent::Release { x: None, touch: false }));
        assert!(!state.pressed);
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let surface = DragSurface::new(GalleryTarget::Lightbox);
        let mut state = DragState::default();

        let press = surface.update(
            &mut state,
            mouse_event(mouse::Event::ButtonPressed(mouse::Button::Left)),
            bounds(),
            Cursor::Available(Point::new(10.0, 10.0)),
        );
        assert_eq!(press.0, canvas::event::Status::Ignored);
        assert!(gesture(press).is_none());

        let release = surface.update(
            &mut state,
            mouse_event(mouse::Event::ButtonReleased(mouse::Button::Left)),
            bounds(),
            Cursor::Available(Point::new(10.0, 10.0)),
        );
        assert!(gesture(release).is_none());
    }

    #[test]
    fn test_hover_changes_and_window_leave() {
        let surface = DragSurface::new(GalleryTarget::Lightbox);
        let mut state = DragState::default();
        let inside = Point::new(200.0, 100.0);

        let enter = surface.update(
            &mut state,
            mouse_event(mouse::Event::CursorMoved { position: inside }),
            bounds(),
            Cursor::Available(inside),
        );
        assert_eq!(gesture(enter), Some(GalleryEvent::Hover(true)));

        let again = surface.update(
            &mut state,
            mouse_event(mouse::Event::CursorMoved { position: inside }),
            bounds(),
            Cursor::Available(inside),
        );
        assert!(gesture(again).is_none());

        let left = surface.update(
            &mut state,
            mouse_event(mouse::Event::CursorLeft),
            bounds(),
            Cursor::Unavailable,
        );
        assert_eq!(gesture(left), Some(GalleryEvent::Hover(false)));
    }

    #[test]
    fn test_lost_pointer_cancels_drag() {
        let surface = DragSurface::new(GalleryTarget::Lightbox);
        let mut state = DragState::default();

        surface.update(
            &mut state,
            mouse_event(mouse::Event::ButtonPressed(mouse::Button::Left)),
            bounds(),
            Cursor::Available(Point::new(200.0, 100.0)),
        );
        let left = surface.update(
            &mut state,
            mouse_event(mouse::Event::CursorLeft),
            bounds(),
            Cursor::Unavailable,
        );
        assert_eq!(gesture(left), Some(GalleryEvent::Cancel { touch: false }));
    }

    #[test]
    fn test_touch_tracks_one_finger() {
        let surface = DragSurface::new(GalleryTarget::Lightbox);
        let mut state = DragState::default();
        let finger = touch::Finger(1);
        let other = touch::Finger(2);

        let down = surface.update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerPressed { id: finger, position: Point::new(300.0, 100.0) }),
            bounds(),
            Cursor::Unavailable,
        );
        assert_eq!(
            gesture(down),
            Some(GalleryEvent::Press { x: 200.0, width: 300.0, touch: true })
        );

        let stray = surface.update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerLifted { id: other, position: Point::new(150.0, 100.0) }),
            bounds(),
            Cursor::Unavailable,
        );
        assert!(gesture(stray).is_none());

        let up = surface.update(
            &mut state,
            canvas::Event::Touch(touch::Event::FingerLifted { id: finger, position: Point::new(150.0, 100.0) }),
            bounds(),
            Cursor::Unavailable,
        );
        assert_eq!(gesture(up), Some(GalleryEvent::Release { x: Some(50.0), touch: true }));
    }
}
