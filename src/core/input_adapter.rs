use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Press and release closer than this (physical pixels) count as a click
pub const CLICK_SLOP: f32 = 5.0;

/// Pixels per wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// What a pointer event means for the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Click,
    Orbit { dx: f32, dy: f32 },
    Zoom(f32),
    Quit,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    /// None until the cursor position is known; the first move anchors it
    origin: Option<(f32, f32)>,
    dragging: bool,
}

/// Adapter that turns Winit events into clicks, orbit drags and zooms
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    /// Current cursor position (relative to window)
    position: Option<(f32, f32)>,
    /// Left button held since this press
    press: Option<Press>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<PointerAction> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.position = None;
                self.press = None;
                None
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.press();
                    None
                }
                ElementState::Released => self.release(),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.scroll(lines)
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                Some(PointerAction::Quit)
            }
            _ => None,
        }
    }

    pub fn press(&mut self) {
        self.press = Some(Press {
            origin: self.position,
            dragging: false,
        });
    }

    /// Orbit while the button is held and the cursor has left the slop radius
    pub fn move_to(&mut self, x: f32, y: f32) -> Option<PointerAction> {
        let previous = self.position.replace((x, y));
        let press = self.press.as_mut()?;

        if !press.dragging {
            let (ox, oy) = *press.origin.get_or_insert((x, y));
            if (x - ox).hypot(y - oy) < CLICK_SLOP {
                return None;
            }
            press.dragging = true;
        }

        let (px, py) = previous?;
        Some(PointerAction::Orbit {
            dx: x - px,
            dy: y - py,
        })
    }

    pub fn release(&mut self) -> Option<PointerAction> {
        match self.press.take() {
            Some(press) if !press.dragging => Some(PointerAction::Click),
            _ => None,
        }
    }

    pub fn scroll(&mut self, lines: f32) -> Option<PointerAction> {
        if lines == 0.0 {
            None
        } else {
            Some(PointerAction::Zoom(lines))
        }
    }

    /// Get current cursor position (if available)
    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }
}
