//! Keyboard trigger source for the interactive screen.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::trigger::{SourceSignal, TriggerEvent, TriggerSource};

/// Reads crossterm key events from the terminal.
///
/// Enter, Space and `r` trigger a recording. Escape, `q` and Ctrl+C close the source.
#[derive(Debug, Default)]
pub struct KeyboardSource;

impl KeyboardSource {
    pub fn new() -> Self {
        Self
    }
}

impl TriggerSource for KeyboardSource {
    fn poll_trigger(&mut self, timeout: Duration) -> anyhow::Result<SourceSignal> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(signal_for_key(key));
            }
        }
        Ok(SourceSignal::Idle)
    }
}

/// Maps one key event to a source signal. Releases and unknown keys are idle.
pub fn signal_for_key(key: KeyEvent) -> SourceSignal {
    if key.kind == KeyEventKind::Release {
        return SourceSignal::Idle;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => {
            tracing::debug!("{:?} pressed: triggering recording", key.code);
            SourceSignal::Trigger(TriggerEvent)
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tracing::debug!("Ctrl+C pressed: closing");
            SourceSignal::Closed
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            tracing::debug!("Escape or 'q' pressed: closing");
            SourceSignal::Closed
        }
        _ => SourceSignal::Idle,
    }
}
