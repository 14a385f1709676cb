//! Keyboard and mouse state for the local player
//!
//! Controls:
//! - W/S: Forward/backward along the view direction
//! - A/D: Strafe left/right
//! - Space: Jump
//! - Shift/Ctrl: Crouch while held
//! - Horizontal mouse motion: Turn (yaw)
//! - Left click: Fire
//! - Right click: Aim down sights

use ricochet_math::Vec3;
use ricochet_physics::{MoveInput, MoveKeys};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Horizontal view direction for a yaw angle
///
/// Yaw 0 looks down -Z; positive yaw turns right.
pub fn yaw_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

/// Input state accumulated between frames
pub struct PlayerInput {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    crouch: bool,

    // Edge-triggered, cleared when consumed
    jump_pressed: bool,
    fire_pressed: bool,

    aiming: bool,
    yaw: f32,

    pub mouse_sensitivity: f32,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInput {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            crouch: false,
            jump_pressed: false,
            fire_pressed: false,
            aiming: false,
            yaw: 0.0,
            mouse_sensitivity: 0.002,
        }
    }

    /// Builder: set mouse sensitivity (radians per pixel)
    pub fn with_mouse_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Process keyboard input; returns whether the key was handled
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.backward = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::Space => {
                if pressed {
                    self.jump_pressed = true;
                }
            }
            KeyCode::ShiftLeft | KeyCode::ShiftRight | KeyCode::ControlLeft | KeyCode::ControlRight => {
                self.crouch = pressed
            }
            _ => return false,
        }
        true
    }

    /// Process mouse button input
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state == ElementState::Pressed;

        match button {
            MouseButton::Left => {
                if pressed {
                    self.fire_pressed = true;
                }
            }
            MouseButton::Right => self.aiming = pressed,
            _ => {}
        }
    }

    /// Process raw mouse motion
    ///
    /// Moving right turns right. Vertical motion is ignored: movement, shots
    /// and snapshots all live in the horizontal plane.
    pub fn process_mouse_motion(&mut self, delta_x: f64, _delta_y: f64) {
        self.yaw += delta_x as f32 * self.mouse_sensitivity;
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn is_forward_held(&self) -> bool {
        self.forward
    }

    #[inline]
    pub fn is_aiming(&self) -> bool {
        self.aiming
    }

    #[inline]
    pub fn is_crouch_held(&self) -> bool {
        self.crouch
    }

    /// Check if any movement keys are pressed
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Horizontal view direction
    pub fn forward_vector(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    /// Consume the jump flag
    ///
    /// Returns true if jump was pressed since the last call.
    pub fn consume_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_pressed)
    }

    /// Consume the fire flag
    pub fn consume_fire(&mut self) -> bool {
        std::mem::take(&mut self.fire_pressed)
    }

    /// Build this frame's controller input, consuming a pending jump
    ///
    /// The crouch modifier is reported every frame so that a blocked stand-up
    /// is retried once the ceiling clears.
    pub fn move_input(&mut self) -> MoveInput {
        let mut keys = MoveKeys::empty();
        keys.set(MoveKeys::FORWARD, self.forward);
        keys.set(MoveKeys::BACK, self.backward);
        keys.set(MoveKeys::LEFT, self.left);
        keys.set(MoveKeys::RIGHT, self.right);
        keys.set(MoveKeys::JUMP, self.consume_jump());

        MoveInput {
            keys,
            forward: self.forward_vector(),
            crouch: Some(self.crouch),
        }
    }
}
