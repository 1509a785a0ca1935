//! Input processing layer: key mapping and numeric prefix accumulator.
//!
//! Pure logic, no I/O. All functions are deterministic and testable.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::KeyConfig;

const MAX_COUNT: u32 = 999_999;

/// Accumulated numeric prefix for vim/less-style commands.
///
/// Users type digits then a command character: `12g` goes to page 12,
/// `10j` scrolls 10 steps forward.
pub struct InputAccumulator {
    count: Option<u32>,
}

impl Default for InputAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputAccumulator {
    pub fn new() -> Self {
        Self { count: None }
    }

    /// Feed a digit (0..=9). Returns false if overflow would occur.
    fn push_digit(&mut self, d: u32) -> bool {
        let current = self.count.unwrap_or(0);
        let new = current.saturating_mul(10).saturating_add(d);
        if new > MAX_COUNT {
            return false; // ignore further digits
        }
        self.count = Some(new);
        true
    }

    /// Take the accumulated count, resetting to None.
    fn take(&mut self) -> Option<u32> {
        self.count.take()
    }

    /// Peek at the current accumulated count without consuming it.
    pub fn peek(&self) -> Option<u32> {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = None;
    }

    pub fn is_active(&self) -> bool {
        self.count.is_some()
    }
}

/// Actions produced by key input processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollForward(u32),
    ScrollBackward(u32),
    NextPage(u32),
    PreviousPage(u32),
    FirstPage,
    LastPage,
    GotoPage(u32),
    CancelInput,
    /// A digit was accumulated; caller should redraw the status bar.
    Digit,
}

/// Map a key event to an `Action`, consuming/updating the accumulator as needed.
///
/// The configured forward/backward keys take precedence over the built-in
/// bindings. Returns `None` for unknown keys (caller should reset the
/// accumulator).
pub fn map_key_event(key: KeyEvent, acc: &mut InputAccumulator, keys: &KeyConfig) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = key;

    match (code, modifiers) {
        // Always immediate
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),

        (KeyCode::Char(c), _) if c == keys.forward => {
            Some(Action::ScrollForward(acc.take().unwrap_or(1)))
        }
        (KeyCode::Char(c), _) if c == keys.backward => {
            Some(Action::ScrollBackward(acc.take().unwrap_or(1)))
        }

        (KeyCode::Char('q'), _) => Some(Action::Quit),

        (KeyCode::Esc, _) => {
            acc.reset();
            Some(Action::CancelInput)
        }

        (KeyCode::Char(c @ '0'..='9'), KeyModifiers::NONE) => {
            acc.push_digit(c as u32 - '0' as u32);
            Some(Action::Digit)
        }

        (KeyCode::Down, _) => Some(Action::ScrollForward(acc.take().unwrap_or(1))),
        (KeyCode::Up, _) => Some(Action::ScrollBackward(acc.take().unwrap_or(1))),

        (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => {
            Some(Action::NextPage(acc.take().unwrap_or(1)))
        }
        (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => {
            Some(Action::PreviousPage(acc.take().unwrap_or(1)))
        }

        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => match acc.take() {
            None => Some(Action::FirstPage),
            Some(n) => Some(Action::GotoPage(n)),
        },
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => match acc.take() {
            None => Some(Action::LastPage),
            Some(n) => Some(Action::GotoPage(n)),
        },

        _ => None,
    }
}
