//! Event handling for the story TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tale_core::Phase;

use crate::app::App;

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event.
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event.
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcut (always works)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // Exit confirmation overlay captures everything
    if app.confirm_exit {
        return handle_confirm_key(app, key);
    }

    match app.session.phase() {
        Phase::Idle => handle_start_screen_key(app, key),
        // Choice and back inputs cannot reach the engine while a story is
        // being generated.
        Phase::Loading => EventResult::Continue,
        Phase::Playing => handle_scene_key(app, key),
    }
}

/// Keys while the exit confirmation overlay is open.
fn handle_confirm_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.confirm_exit_yes();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm_exit_no();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Keys on the start screen (subject input).
fn handle_start_screen_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Enter => {
            app.submit_subject();
            EventResult::NeedsRedraw
        }
        KeyCode::Tab => {
            app.cycle_preset();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Esc => EventResult::Quit,
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Keys while playing a scene.
fn handle_scene_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10).unwrap() as usize - 1;
            app.session.choose(index);
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace | KeyCode::Esc | KeyCode::Left => {
            app.request_back();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('r') => {
            app.restart();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}
