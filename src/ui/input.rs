/// Keyboard capture.
///
/// The simulation is turn-based: one key event is one move attempt, so
/// there is no held-key state to track. Each frame drains the terminal
/// event queue and records every Press/Repeat as a discrete press
/// (terminal auto-repeat gives continuous motion while a key is held).

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

pub struct InputState {
    /// Press/Repeat events collected during the most recent drain, in
    /// arrival order.
    presses: Vec<KeyCode>,

    /// Every key event from the drain, kept for modifier checks.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release => {}
                    _ => self.presses.push(key.code),
                }
            }
        }
    }

    /// All presses this frame, in order. Each one is a discrete trigger.
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
