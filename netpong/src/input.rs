//! Local paddle control, sampled once per frame.

use macroquad::prelude::*;
use shared::{PADDLE_HEIGHT, PADDLE_MAX_OFFSET};

/// Per-frame paddle travel while a movement key is held.
const KEY_STEP: f32 = 7.0;

/// Tracks pointer movement so keys and pointer can share control: the
/// pointer drags the paddle center whenever it moves, keys nudge from the
/// current offset otherwise.
pub struct InputTracker {
    last_mouse_y: Option<f32>,
}

impl InputTracker {
    pub fn new() -> Self {
        InputTracker { last_mouse_y: None }
    }

    /// Desired local paddle offset for this frame, clamped to the field.
    pub fn desired_offset(&mut self, current: f32) -> f32 {
        let mut offset = current;

        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            offset -= KEY_STEP;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            offset += KEY_STEP;
        }

        let (_, mouse_y) = mouse_position();
        match self.last_mouse_y {
            Some(last) if (mouse_y - last).abs() > f32::EPSILON => {
                offset = mouse_y - PADDLE_HEIGHT / 2.0;
            }
            _ => {}
        }
        self.last_mouse_y = Some(mouse_y);

        offset.clamp(0.0, PADDLE_MAX_OFFSET)
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
