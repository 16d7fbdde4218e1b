use std::collections::HashSet;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Symbolic key names accepted by `IsKeyPressed`, matched case-sensitively.
const SCRIPT_KEYS: &[(&str, KeyCode)] = &[
    ("W", KeyCode::KeyW),
    ("A", KeyCode::KeyA),
    ("S", KeyCode::KeyS),
    ("D", KeyCode::KeyD),
    ("Q", KeyCode::KeyQ),
    ("E", KeyCode::KeyE),
    ("Space", KeyCode::Space),
    ("Shift", KeyCode::ShiftLeft),
    ("Ctrl", KeyCode::ControlLeft),
    ("Alt", KeyCode::AltLeft),
    ("Up", KeyCode::ArrowUp),
    ("Down", KeyCode::ArrowDown),
    ("Left", KeyCode::ArrowLeft),
    ("Right", KeyCode::ArrowRight),
    ("Enter", KeyCode::Enter),
    ("Escape", KeyCode::Escape),
];

pub fn script_key_code(name: &str) -> Option<KeyCode> {
    SCRIPT_KEYS.iter().find(|(key, _)| *key == name).map(|(_, code)| *code)
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed {
            self.held.insert(code);
        } else {
            self.held.remove(&code);
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.set_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    pub fn is_down(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    pub fn is_script_key_down(&self, name: &str) -> bool {
        script_key_code(name).is_some_and(|code| self.is_down(code))
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
