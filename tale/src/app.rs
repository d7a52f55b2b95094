//! Front-end application state.
//!
//! The session owns all narrative state; this struct only adds what the
//! terminal needs on top: the subject input buffer, the exit-confirmation
//! overlay, and animation bookkeeping.

use tale_core::{BackStep, Phase, StorySession};

use crate::ui::theme::Theme;

/// Preset subjects offered on the start screen.
pub const SUBJECT_PRESETS: [&str; 4] = [
    "Cyberpunk Alley",
    "Haunted Space Station",
    "Ancient Desert Temple",
    "Noir Detective Office",
];

/// Main application state.
pub struct App {
    pub session: StorySession,
    pub theme: Theme,

    // Subject input on the start screen
    pub subject_input: String,
    pub cursor_position: usize,
    preset_index: usize,

    // A submitted subject waiting for the main loop to load it
    pub pending_subject: Option<String>,
    /// True while the generation call is in flight, so the loading screen
    /// can be drawn before the await blocks the loop.
    pub dreaming: bool,

    // Overlay state
    pub confirm_exit: bool,

    pub should_quit: bool,
    pub animation_frame: u8,
}

impl App {
    /// Create the app around a session.
    pub fn new(session: StorySession) -> Self {
        Self {
            session,
            theme: Theme::default(),
            subject_input: String::new(),
            cursor_position: 0,
            preset_index: 0,
            pending_subject: None,
            dreaming: false,
            confirm_exit: false,
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Handle a typed character in the subject input.
    pub fn type_char(&mut self, c: char) {
        self.subject_input.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
    }

    /// Handle backspace in the subject input.
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            let prev = self.subject_input[..self.cursor_position]
                .chars()
                .next_back()
                .map(char::len_utf8)
                .unwrap_or(0);
            self.cursor_position -= prev;
            self.subject_input.remove(self.cursor_position);
        }
    }

    /// Move the cursor left one character.
    pub fn cursor_left(&mut self) {
        if self.cursor_position > 0 {
            let prev = self.subject_input[..self.cursor_position]
                .chars()
                .next_back()
                .map(char::len_utf8)
                .unwrap_or(0);
            self.cursor_position -= prev;
        }
    }

    /// Move the cursor right one character.
    pub fn cursor_right(&mut self) {
        if let Some(c) = self.subject_input[self.cursor_position..].chars().next() {
            self.cursor_position += c.len_utf8();
        }
    }

    /// Move the cursor to the start of the input.
    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    /// Move the cursor to the end of the input.
    pub fn cursor_end(&mut self) {
        self.cursor_position = self.subject_input.len();
    }

    /// Replace the input with the next preset subject.
    pub fn cycle_preset(&mut self) {
        self.subject_input = SUBJECT_PRESETS[self.preset_index].to_string();
        self.cursor_position = self.subject_input.len();
        self.preset_index = (self.preset_index + 1) % SUBJECT_PRESETS.len();
    }

    /// Submit the subject input if it has content.
    pub fn submit_subject(&mut self) {
        if self.subject_input.trim().is_empty() {
            return;
        }
        self.session.dismiss_error();
        self.pending_subject = Some(self.subject_input.clone());
    }

    /// Step back one scene, or open the exit confirmation at the root.
    pub fn request_back(&mut self) {
        if self.session.phase() != Phase::Playing {
            return;
        }
        if self.session.back() == BackStep::AtStart {
            self.confirm_exit = true;
        }
    }

    /// The user confirmed leaving the story.
    pub fn confirm_exit_yes(&mut self) {
        self.confirm_exit = false;
        self.session.confirm_exit();
    }

    /// The user declined leaving; nothing changes.
    pub fn confirm_exit_no(&mut self) {
        self.confirm_exit = false;
    }

    /// Restart after reaching an ending.
    pub fn restart(&mut self) {
        if self.session.at_ending() {
            self.session.restart();
        }
    }

    /// Tick for animations.
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}
