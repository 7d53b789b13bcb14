/// Keyboard input collector.
///
/// Every slide is one discrete action, so this tracks presses rather than
/// held keys: each Press (or auto-repeat) event read this frame is kept in
/// arrival order. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Press/Repeat events read during the most recent drain_events().
    presses: Vec<KeyEvent>,

    /// Terminal was resized this frame.
    pub resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            resized: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.record(ev),
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }
    }

    fn record(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.presses.push(key),
            Event::Resize(..) => self.resized = true,
            _ => {}
        }
    }

    /// Key presses this frame, oldest first.
    pub fn presses(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.presses.iter().map(|k| k.code)
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    pub fn any_key(&self) -> bool {
        !self.presses.is_empty()
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
