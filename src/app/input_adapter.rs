//! Translates winit window events into pointer [`Input`].

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::utils::input::{Input, PointerButton};

/// Pixels per scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 10.0;

#[must_use]
pub fn translate_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right | MouseButton::Middle => Some(PointerButton::Secondary),
        _ => None,
    }
}

pub fn process_window_event(input: &mut Input, event: &WindowEvent) {
    match event {
        WindowEvent::Resized(size) => input.handle_resize(size.width, size.height),
        WindowEvent::CursorMoved { position, .. } => {
            input.handle_cursor_move(position.x as f32, position.y as f32);
        }
        WindowEvent::CursorLeft { .. } => input.handle_cursor_left(),
        WindowEvent::MouseInput { state, button, .. } => {
            if let Some(button) = translate_button(*button) {
                input.handle_button(button, *state == ElementState::Pressed);
            }
        }
        WindowEvent::MouseWheel { delta, .. } => match delta {
            MouseScrollDelta::LineDelta(_, y) => input.handle_scroll(*y),
            MouseScrollDelta::PixelDelta(pos) => input.handle_scroll(pos.y as f32 / PIXELS_PER_LINE),
        },
        _ => {}
    }
}
