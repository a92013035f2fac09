use glam::Vec2;

/// Pointer buttons the orbit controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Rotate.
    Primary,
    /// Pan.
    Secondary,
}

/// Pointer state accumulated between two frames.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position in the window, physical pixels.
    pub cursor_position: Option<Vec2>,
    /// Cursor movement since the last frame.
    pub cursor_delta: Vec2,
    /// Wheel movement since the last frame, in lines.
    pub scroll_delta: f32,
    /// Window size, physical pixels.
    pub screen_size: Vec2,
    primary: bool,
    secondary: bool,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if let Some(old) = self.cursor_position {
            self.cursor_delta += new_pos - old;
        }
        self.cursor_position = Some(new_pos);
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor_position = None;
    }

    pub fn handle_button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.primary = pressed,
            PointerButton::Secondary => self.secondary = pressed,
        }
    }

    pub fn handle_scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    #[must_use]
    pub fn is_pressed(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Primary => self.primary,
            PointerButton::Secondary => self.secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_has_no_delta() {
        let mut input = Input::new();
        input.handle_cursor_move(10.0, 10.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(13.0, 6.0);
        assert_eq!(input.cursor_delta, Vec2::new(3.0, -4.0));
        input.end_frame();
        assert_eq!(input.cursor_delta, Vec2::ZERO);
    }
}
