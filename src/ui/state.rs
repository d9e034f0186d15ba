//! Presentation-only state: focus, composer, dialog, toast and scroll.
//! Chat data itself is the controller's [`ChatState`], mirrored here once per
//! frame so rendering never waits on the controller lock.

use std::time::{Duration, Instant};

use ratatui::style::Style;
use tui_textarea::TextArea;

use crate::core::controller::ChatState;
use crate::ui::picker::ChatPicker;
use crate::ui::theme::Theme;

pub const TOAST_DURATION: Duration = Duration::from_millis(4500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Composer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

pub struct NewChatDialog {
    pub input: TextArea<'static>,
    pub submitting: bool,
}

impl NewChatDialog {
    fn new(theme: &Theme) -> Self {
        let mut input = TextArea::default();
        input.set_placeholder_text("Leave empty for a timestamped title");
        input.set_placeholder_style(theme.input_placeholder_style);
        input.set_style(theme.input_text_style);
        input.set_cursor_style(theme.input_cursor_style);
        input.set_cursor_line_style(Style::default());
        Self {
            input,
            submitting: false,
        }
    }

    /// The typed title, trimmed. Blank titles are filled in by the controller.
    pub fn title(&self) -> String {
        self.input.lines().join(" ").trim().to_string()
    }
}

pub struct UiState {
    pub theme: Theme,
    pub markdown: bool,
    pub syntax: bool,
    pub server_label: String,
    pub chat: ChatState,
    pub online: bool,
    pub focus: Focus,
    pub picker: ChatPicker,
    pub composer: TextArea<'static>,
    pub sending: bool,
    pub dialog: Option<NewChatDialog>,
    pub toast: Option<Toast>,
    /// Lines scrolled up from the bottom of the transcript; 0 follows new content.
    pub scroll_from_bottom: u16,
    pub exit_requested: bool,
}

impl UiState {
    pub fn new(theme: Theme, markdown: bool, syntax: bool, server_label: String) -> Self {
        let composer = Self::fresh_composer(&theme);
        Self {
            theme,
            markdown,
            syntax,
            server_label,
            chat: ChatState::default(),
            online: false,
            focus: Focus::Composer,
            picker: ChatPicker::default(),
            composer,
            sending: false,
            dialog: None,
            toast: None,
            scroll_from_bottom: 0,
            exit_requested: false,
        }
    }

    fn fresh_composer(theme: &Theme) -> TextArea<'static> {
        let mut composer = TextArea::default();
        composer.set_style(theme.input_text_style);
        composer.set_cursor_style(theme.input_cursor_style);
        composer.set_cursor_line_style(Style::default());
        composer.set_placeholder_style(theme.input_placeholder_style);
        composer
    }

    /// Mirror a controller snapshot, keeping the sidebar cursor in range and
    /// jumping back to the bottom when the transcript changed.
    pub fn apply_snapshot(&mut self, snapshot: ChatState) {
        if snapshot.messages != self.chat.messages {
            self.scroll_from_bottom = 0;
        }
        let current_changed = snapshot.current_chat.as_ref().map(|c| c.id)
            != self.chat.current_chat.as_ref().map(|c| c.id);
        self.chat = snapshot;
        if current_changed {
            if let Some(idx) = self.current_chat_index() {
                self.picker.select(idx);
            }
        }
        self.picker.clamp(self.chat.chats.len());
    }

    pub fn current_chat_index(&self) -> Option<usize> {
        let current = self.chat.current_chat.as_ref()?;
        self.chat.chats.iter().position(|chat| chat.id == current.id)
    }

    /// Why the composer is not accepting input, if it is not.
    pub fn composer_block_reason(&self) -> Option<&'static str> {
        if self.chat.current_chat.is_none() {
            Some("Create or select a chat to start (Ctrl+N)")
        } else if !self.online {
            Some("Server offline, waiting for it to come back…")
        } else if self.sending {
            Some("Sending…")
        } else if self.chat.loading {
            Some("Loading…")
        } else {
            None
        }
    }

    pub fn composer_enabled(&self) -> bool {
        self.composer_block_reason().is_none()
    }

    /// Trimmed composer text, or `None` when there is nothing to send.
    pub fn composer_message(&self) -> Option<String> {
        let text = self.composer.lines().join("\n");
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn clear_composer(&mut self) {
        self.composer = Self::fresh_composer(&self.theme);
    }

    pub fn open_dialog(&mut self) {
        if self.dialog.is_none() {
            self.dialog = Some(NewChatDialog::new(&self.theme));
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Composer,
            Focus::Composer => Focus::Sidebar,
        };
    }

    pub fn show_error(&mut self, message: String, now: Instant) {
        self.toast = Some(Toast {
            message,
            shown_at: now,
        });
    }

    /// Drop the toast once it has been visible for [`TOAST_DURATION`].
    /// Returns whether anything changed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|toast| now.duration_since(toast.shown_at) >= TOAST_DURATION);
        if expired {
            self.toast = None;
        }
        expired
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }
}
