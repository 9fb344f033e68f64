//! Translation of winit window events into interaction state.
//!
//! [`InputAdapter`] is the host-side layer: it turns raw pointer, wheel,
//! touch, keyboard and resize events into writes on an
//! [`InteractionState`] plus a few discrete [`InputAction`]s. The scene never
//! registers listeners of its own.
//!
//! # Usage
//!
//! ```ignore
//! fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
//!     match self.input.handle_event(&event, self.sphere.interaction_mut()) {
//!         Some(action) => self.sphere.handle_input(action),
//!         None => {}
//!     }
//! }
//! ```

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::InteractionState;

/// Pixels per wheel "line", matching what browsers report.
const PIXELS_PER_LINE: f32 = 100.0;

/// Keyboard zoom shortcuts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomCommand {
    In,
    Out,
    Reset,
}

/// Discrete results of an event that the sphere handle must act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Resized { width: u32, height: u32 },
    ScaleFactorChanged(f64),
    Zoom(ZoomCommand),
}

/// Pointer and touch tracking between events.
#[derive(Debug, Default)]
pub struct InputAdapter {
    cursor: Option<Vec2>,
    /// The single touch currently driving rotation.
    touch: Option<(u64, Vec2)>,
    /// Number of fingers down.
    touches: usize,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one window event. Returns an action when the caller must react.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        state: &mut InteractionState,
    ) -> Option<InputAction> {
        match event {
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                match button_state {
                    ElementState::Pressed => self.pointer_down(state),
                    ElementState::Released => self.pointer_up(state),
                }
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(Vec2::new(position.x as f32, position.y as f32), state);
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer_up(state);
                self.cursor = None;
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports positive y for scrolling up; the zoom expects
                // positive for scrolling down (moving away).
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                };
                self.wheel(delta_y, state);
                None
            }
            WindowEvent::Touch(touch) => {
                let location = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.touch(touch.id, touch.phase, location, state);
                None
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                zoom_shortcut(code).map(InputAction::Zoom)
            }
            WindowEvent::Resized(size) => Some(InputAction::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                Some(InputAction::ScaleFactorChanged(*scale_factor))
            }
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, state: &mut InteractionState) {
        state.begin_drag();
    }

    pub fn pointer_up(&mut self, state: &mut InteractionState) {
        state.end_drag();
    }

    /// Cursor moved to `position` (pixels). Drags rotate by the movement.
    pub fn pointer_moved(&mut self, position: Vec2, state: &mut InteractionState) {
        if let Some(previous) = self.cursor {
            let delta = position - previous;
            state.drag(delta.x, delta.y);
        }
        self.cursor = Some(position);
    }

    pub fn wheel(&mut self, delta_y: f32, state: &mut InteractionState) {
        state.scroll(delta_y);
    }

    /// Single-finger drags rotate. Extra fingers cancel the drag.
    pub fn touch(&mut self, id: u64, phase: TouchPhase, location: Vec2, state: &mut InteractionState) {
        match phase {
            TouchPhase::Started => {
                self.touches += 1;
                if self.touches == 1 {
                    self.touch = Some((id, location));
                    state.begin_drag();
                } else {
                    self.touch = None;
                    state.end_drag();
                }
            }
            TouchPhase::Moved => {
                if let Some((active, previous)) = self.touch {
                    if active == id {
                        let delta = location - previous;
                        state.drag(delta.x, delta.y);
                        self.touch = Some((id, location));
                    }
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches = self.touches.saturating_sub(1);
                if self.touch.is_some_and(|(active, _)| active == id) || self.touches == 0 {
                    self.touch = None;
                    state.end_drag();
                }
            }
        }
    }
}

fn zoom_shortcut(code: KeyCode) -> Option<ZoomCommand> {
    match code {
        KeyCode::Equal | KeyCode::NumpadAdd => Some(ZoomCommand::In),
        KeyCode::Minus | KeyCode::NumpadSubtract => Some(ZoomCommand::Out),
        KeyCode::Digit0 | KeyCode::Numpad0 => Some(ZoomCommand::Reset),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::DeviceId;

    fn idle_state() -> InteractionState {
        InteractionState::default().with_auto_rotate(false, None)
    }

    #[test]
    fn test_drag_rotates() {
        let mut input = InputAdapter::new();
        let mut state = idle_state();
        input.pointer_moved(Vec2::new(10.0, 10.0), &mut state);
        input.pointer_down(&mut state);
        input.pointer_moved(Vec2::new(60.0, 30.0), &mut state);
        assert!((state.target_rotation.y - 0.5).abs() < 1e-6);
        assert!((state.target_rotation.x - 0.2).abs() < 1e-6);

        input.pointer_up(&mut state);
        input.pointer_moved(Vec2::new(500.0, 500.0), &mut state);
        assert!((state.target_rotation.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_event() {
        let mut input = InputAdapter::new();
        let mut state = idle_state();
        let device_id = unsafe { DeviceId::dummy() };
        state.begin_drag();
        for x in [0.0, 30.0] {
            let event = WindowEvent::CursorMoved {
                device_id,
                position: PhysicalPosition::new(x, 0.0),
            };
            assert_eq!(input.handle_event(&event, &mut state), None);
        }
        assert!((state.target_rotation.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_event() {
        let mut input = InputAdapter::new();
        let mut state = idle_state();
        let event = WindowEvent::MouseWheel {
            device_id: unsafe { DeviceId::dummy() },
            delta: MouseScrollDelta::LineDelta(0.0, -1.0),
            phase: TouchPhase::Moved,
        };
        input.handle_event(&event, &mut state);
        assert!((state.take_zoom_delta() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_resize_event() {
        let mut input = InputAdapter::new();
        let mut state = idle_state();
        let event = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            input.handle_event(&event, &mut state),
            Some(InputAction::Resized {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn test_single_touch_drag() {
        let mut input = InputAdapter::new();
        let mut state = idle_state();
        input.touch(1, TouchPhase::Started, Vec2::new(0.0, 0.0), &mut state);
        input.touch(1, TouchPhase::Moved, Vec2::new(20.0, 0.0), &mut state);
        assert!((state.target_rotation.y - 0.2).abs() < 1e-6);

        // a second finger stops rotation
        input.touch(2, TouchPhase::Started, Vec2::new(50.0, 50.0), &mut state);
        input.touch(1, TouchPhase::Moved, Vec2::new(90.0, 0.0), &mut state);
        assert!((state.target_rotation.y - 0.2).abs() < 1e-6);
        assert!(!state.dragging);

        input.touch(1, TouchPhase::Ended, Vec2::ZERO, &mut state);
        input.touch(2, TouchPhase::Ended, Vec2::ZERO, &mut state);
        assert!(!state.dragging);
    }

    #[test]
    fn test_zoom_shortcuts() {
        assert_eq!(zoom_shortcut(KeyCode::Equal), Some(ZoomCommand::In));
        assert_eq!(zoom_shortcut(KeyCode::Minus), Some(ZoomCommand::Out));
        assert_eq!(zoom_shortcut(KeyCode::Digit0), Some(ZoomCommand::Reset));
        assert_eq!(zoom_shortcut(KeyCode::KeyA), None);
    }
}
