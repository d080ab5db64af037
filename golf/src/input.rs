//! Raw keyboard/pointer state fed by the render loop.
//!
//! Keys are raw 8-bit codes; letters are folded to upper case so `'w'` and
//! `'W'` are the same key. Held keys are polled once per frame by the session.

use rapier3d::na::{Vector2, Vector3};

use crate::camera::CameraMove;

const MAX_KEYS: usize = 256;

#[derive(Clone, Debug)]
pub struct InputState {
    held: [bool; MAX_KEYS],
    pointer: Vector2<f32>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            held: [false; MAX_KEYS],
            pointer: Vector2::zeros(),
        }
    }
}

fn fold(key: u8) -> u8 {
    key.to_ascii_uppercase()
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only on the transition from released to held.
    pub fn key_down(&mut self, key: u8) -> bool {
        let slot = &mut self.held[fold(key) as usize];
        let pressed = !*slot;
        *slot = true;
        pressed
    }

    pub fn key_up(&mut self, key: u8) {
        self.held[fold(key) as usize] = false;
    }

    pub fn is_held(&self, key: u8) -> bool {
        self.held[fold(key) as usize]
    }

    /// Currently held keys, in code order.
    pub fn held_keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.held
            .iter()
            .enumerate()
            .filter(|(_, held)| **held)
            .map(|(key, _)| key as u8)
    }

    /// Accumulate pointer motion until the next frame consumes it.
    pub fn pointer_delta(&mut self, dx: f32, dy: f32) {
        self.pointer += Vector2::new(dx, dy);
    }

    pub fn take_pointer(&mut self) -> Vector2<f32> {
        std::mem::replace(&mut self.pointer, Vector2::zeros())
    }
}

/// Unit push direction for the force keys (I/K/J/L/U/M).
pub fn force_direction(key: u8) -> Option<Vector3<f32>> {
    let dir = match fold(key) {
        b'I' => Vector3::new(0.0, 0.0, -1.0),
        b'K' => Vector3::new(0.0, 0.0, 1.0),
        b'J' => Vector3::new(-1.0, 0.0, 0.0),
        b'L' => Vector3::new(1.0, 0.0, 0.0),
        b'U' => Vector3::new(0.0, 1.0, 0.0),
        b'M' => Vector3::new(0.0, -1.0, 0.0),
        _ => return None,
    };
    Some(dir)
}

/// Free-camera move for the camera keys (W/S/A/D/Q/Z).
pub fn camera_move(key: u8) -> Option<CameraMove> {
    let movement = match fold(key) {
        b'W' => CameraMove::Forward,
        b'S' => CameraMove::Backward,
        b'A' => CameraMove::Left,
        b'D' => CameraMove::Right,
        b'Q' => CameraMove::Up,
        b'Z' => CameraMove::Down,
        _ => return None,
    };
    Some(movement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_reports_only_the_first_press() {
        let mut input = InputState::new();
        assert!(input.key_down(b'w'));
        assert!(!input.key_down(b'W'));
        assert!(input.is_held(b'w'));
        input.key_up(b'W');
        assert!(!input.is_held(b'w'));
        assert!(input.key_down(b'w'));
    }

    #[test]
    fn held_keys_are_listed_in_order() {
        let mut input = InputState::new();
        input.key_down(b'l');
        input.key_down(b'i');
        assert_eq!(input.held_keys().collect::<Vec<_>>(), vec![b'I', b'L']);
    }

    #[test]
    fn pointer_accumulates_until_taken() {
        let mut input = InputState::new();
        input.pointer_delta(1.0, 2.0);
        input.pointer_delta(3.0, -1.0);
        assert_eq!(input.take_pointer(), Vector2::new(4.0, 1.0));
        assert_eq!(input.take_pointer(), Vector2::zeros());
    }

    #[test]
    fn key_maps_do_not_overlap() {
        for key in 0..=u8::MAX {
            assert!(force_direction(key).is_none() || camera_move(key).is_none());
        }
        assert_eq!(camera_move(b'q'), Some(CameraMove::Up));
        assert_eq!(force_direction(b'u'), Some(Vector3::y()));
    }
}
