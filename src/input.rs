// input.rs: raw window events to pointer events, with double-click synthesis

use glam::Vec2;
use std::time::{Duration, Instant};
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Positions are physical pixels from the window's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resized { width: u32, height: u32 },
    PointerDown { position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2 },
    DoubleClick { position: Vec2 },
}

pub struct InputTranslator {
    cursor: Vec2,
    last_click: Option<(Instant, Vec2)>,
    double_click_time: Duration,
    slop: f32,
}

impl InputTranslator {
    pub fn new(config: &crate::config::InputConfig) -> Self {
        Self {
            cursor: Vec2::ZERO,
            last_click: None,
            double_click_time: Duration::from_millis(config.double_click_ms),
            slop: config.double_click_slop_px,
        }
    }

    pub fn translate(&mut self, event: &WindowEvent<'_>, now: Instant) -> Vec<InputEvent> {
        match event {
            WindowEvent::Resized(size) => vec![self.resized(size.width, size.height)],
            WindowEvent::CursorMoved { position, .. } => {
                vec![self.moved(Vec2::new(position.x as f32, position.y as f32))]
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => vec![self.pressed()],
                ElementState::Released => self.released(now),
            },
            _ => Vec::new(),
        }
    }

    pub fn resized(&mut self, width: u32, height: u32) -> InputEvent {
        InputEvent::Resized { width, height }
    }

    pub fn moved(&mut self, position: Vec2) -> InputEvent {
        self.cursor = position;
        InputEvent::PointerMove { position }
    }

    pub fn pressed(&mut self) -> InputEvent {
        InputEvent::PointerDown {
            position: self.cursor,
        }
    }

    /// A release completes a click; a second click soon enough and close
    /// enough to the first adds a double-click after the pointer-up.
    pub fn released(&mut self, now: Instant) -> Vec<InputEvent> {
        let position = self.cursor;
        let mut out = vec![InputEvent::PointerUp { position }];

        match self.last_click.take() {
            Some((at, first))
                if now.duration_since(at) <= self.double_click_time
                    && first.distance(position) <= self.slop =>
            {
                out.push(InputEvent::DoubleClick { position });
            }
            _ => self.last_click = Some((now, position)),
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;

    fn translator() -> InputTranslator {
        InputTranslator::new(&InputConfig::default())
    }

    fn click(t: &mut InputTranslator, at: Instant) -> Vec<InputEvent> {
        let down = t.pressed();
        assert!(matches!(down, InputEvent::PointerDown { .. }));
        t.released(at)
    }

    fn has_double(events: &[InputEvent]) -> bool {
        events.iter().any(|e| matches!(e, InputEvent::DoubleClick { .. }))
    }

    #[test]
    fn pointer_events_carry_last_cursor_position() {
        let mut t = translator();
        t.moved(Vec2::new(12.0, 34.0));
        assert_eq!(
            t.pressed(),
            InputEvent::PointerDown {
                position: Vec2::new(12.0, 34.0)
            }
        );
        assert_eq!(t.cursor, Vec2::new(12.0, 34.0));
    }

    #[test]
    fn two_quick_clicks_make_a_double_click() {
        let mut t = translator();
        let t0 = Instant::now();
        t.moved(Vec2::new(100.0, 100.0));

        let first = click(&mut t, t0);
        assert_eq!(first.len(), 1);

        let second = click(&mut t, t0 + Duration::from_millis(200));
        assert_eq!(
            second,
            vec![
                InputEvent::PointerUp {
                    position: Vec2::new(100.0, 100.0)
                },
                InputEvent::DoubleClick {
                    position: Vec2::new(100.0, 100.0)
                },
            ]
        );
    }

    #[test]
    fn slow_clicks_do_not() {
        let mut t = translator();
        let t0 = Instant::now();
        click(&mut t, t0);
        assert!(!has_double(&click(&mut t, t0 + Duration::from_millis(900))));
    }

    #[test]
    fn distant_clicks_do_not() {
        let mut t = translator();
        let t0 = Instant::now();
        click(&mut t, t0);
        t.moved(Vec2::new(40.0, 0.0));
        assert!(!has_double(&click(&mut t, t0 + Duration::from_millis(100))));
    }

    #[test]
    fn third_click_starts_a_new_pair() {
        let mut t = translator();
        let t0 = Instant::now();
        click(&mut t, t0);
        assert!(has_double(&click(&mut t, t0 + Duration::from_millis(100))));
        assert!(!has_double(&click(&mut t, t0 + Duration::from_millis(200))));
        assert!(has_double(&click(&mut t, t0 + Duration::from_millis(300))));
    }
}
