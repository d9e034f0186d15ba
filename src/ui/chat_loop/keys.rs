//! Keyboard routing. Keys only mutate presentation state here; anything that
//! needs the backend comes back as a [`KeyAction`] for the loop to spawn.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tui_textarea::Input as TAInput;

use crate::api::Chat;
use crate::ui::chat_loop::lifecycle::sanitize_pasted_text;
use crate::ui::state::{Focus, UiState};

const PAGE_SCROLL: u16 = 10;
const WHEEL_SCROLL: u16 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    None,
    Redraw,
    Quit,
    Reload,
    CreateChat(String),
    SelectChat(Chat),
    Send(String),
}

pub fn handle_key(ui: &mut UiState, key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        ui.exit_requested = true;
        return KeyAction::Quit;
    }

    if ui.dialog.is_some() {
        return handle_dialog_key(ui, key);
    }

    match key.code {
        KeyCode::Char('n') if ctrl => {
            ui.open_dialog();
            return KeyAction::Redraw;
        }
        KeyCode::Char('r') if ctrl => return KeyAction::Reload,
        KeyCode::Tab | KeyCode::BackTab => {
            ui.toggle_focus();
            return KeyAction::Redraw;
        }
        KeyCode::PageUp => {
            ui.scroll_up(PAGE_SCROLL);
            return KeyAction::Redraw;
        }
        KeyCode::PageDown => {
            ui.scroll_down(PAGE_SCROLL);
            return KeyAction::Redraw;
        }
        _ => {}
    }

    match ui.focus {
        Focus::Sidebar => handle_sidebar_key(ui, key),
        Focus::Composer => handle_composer_key(ui, key),
    }
}

fn handle_dialog_key(ui: &mut UiState, key: KeyEvent) -> KeyAction {
    let Some(dialog) = ui.dialog.as_mut() else {
        return KeyAction::None;
    };
    if dialog.submitting {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Esc => {
            ui.close_dialog();
            KeyAction::Redraw
        }
        KeyCode::Enter => {
            dialog.submitting = true;
            KeyAction::CreateChat(dialog.title())
        }
        _ => {
            dialog.input.input(TAInput::from(key));
            KeyAction::Redraw
        }
    }
}

fn handle_sidebar_key(ui: &mut UiState, key: KeyEvent) -> KeyAction {
    let len = ui.chat.chats.len();
    match key.code {
        KeyCode::Up => ui.picker.move_up(len),
        KeyCode::Down => ui.picker.move_down(len),
        KeyCode::Home => ui.picker.select(0),
        KeyCode::End => ui.picker.select(len.saturating_sub(1)),
        KeyCode::Enter => {
            let Some(chat) = ui.chat.chats.get(ui.picker.selected).cloned() else {
                return KeyAction::None;
            };
            ui.focus = Focus::Composer;
            return KeyAction::SelectChat(chat);
        }
        _ => return KeyAction::None,
    }
    KeyAction::Redraw
}

fn handle_composer_key(ui: &mut UiState, key: KeyEvent) -> KeyAction {
    if !ui.composer_enabled() {
        return KeyAction::None;
    }
    if key.code == KeyCode::Enter {
        if key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
        {
            ui.composer.insert_newline();
            return KeyAction::Redraw;
        }
        return match ui.composer_message() {
            Some(message) => {
                ui.sending = true;
                KeyAction::Send(message)
            }
            None => KeyAction::None,
        };
    }
    ui.composer.input(TAInput::from(key));
    KeyAction::Redraw
}

/// Pastes go to the dialog when it is open, otherwise to an enabled composer.
pub fn handle_paste(ui: &mut UiState, text: &str) -> bool {
    let text = sanitize_pasted_text(text);
    if text.is_empty() {
        return false;
    }
    if let Some(dialog) = ui.dialog.as_mut() {
        if dialog.submitting {
            return false;
        }
        // Titles are single-line.
        dialog.input.insert_str(text.replace('\n', " "));
        return true;
    }
    if ui.focus == Focus::Composer && ui.composer_enabled() {
        ui.composer.insert_str(text);
        return true;
    }
    false
}

pub fn handle_mouse(ui: &mut UiState, mouse: MouseEvent) -> bool {
    match mouse.kind {
        MouseEventKind::ScrollUp => ui.scroll_up(WHEEL_SCROLL),
        MouseEventKind::ScrollDown => ui.scroll_down(WHEEL_SCROLL),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::ChatState;
    use crate::ui::theme::Theme;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn chat(id: i64) -> Chat {
        Chat {
            id,
            session_id: format!("s{id}"),
            title: format!("Chat {id}"),
            created_at: String::new(),
            updated_at: String::new(),
            messages: None,
        }
    }

    fn type_text(ui: &mut UiState, text: &str) {
        for c in text.chars() {
            handle_key(ui, key(KeyCode::Char(c)));
        }
    }

    fn ready_ui() -> UiState {
        let mut ui = UiState::new(Theme::dark_default(), true, false, "local".to_string());
        ui.online = true;
        ui.apply_snapshot(ChatState {
            chats: vec![chat(1), chat(2)],
            current_chat: Some(chat(1)),
            ..Default::default()
        });
        ui
    }

    #[test]
    fn ctrl_c_and_ctrl_q_quit() {
        let mut ui = ready_ui();
        assert_eq!(handle_key(&mut ui, ctrl('q')), KeyAction::Quit);
        assert!(ui.exit_requested);

        let mut ui = ready_ui();
        ui.open_dialog();
        assert_eq!(handle_key(&mut ui, ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn enter_sends_trimmed_composer_text() {
        let mut ui = ready_ui();
        type_text(&mut ui, "  hello ");
        assert_eq!(
            handle_key(&mut ui, key(KeyCode::Enter)),
            KeyAction::Send("hello".to_string())
        );
        assert!(ui.sending);
        // Text stays until the send succeeds.
        assert_eq!(ui.composer.lines(), ["  hello "]);
    }

    #[test]
    fn blank_composer_does_not_send() {
        let mut ui = ready_ui();
        type_text(&mut ui, "   ");
        assert_eq!(handle_key(&mut ui, key(KeyCode::Enter)), KeyAction::None);
        assert!(!ui.sending);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut ui = ready_ui();
        type_text(&mut ui, "a");
        let shift_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(handle_key(&mut ui, shift_enter), KeyAction::Redraw);
        type_text(&mut ui, "b");
        assert_eq!(ui.composer_message().as_deref(), Some("a\nb"));
    }

    #[test]
    fn composer_ignores_input_while_offline() {
        let mut ui = ready_ui();
        ui.online = false;
        type_text(&mut ui, "hi");
        assert_eq!(handle_key(&mut ui, key(KeyCode::Enter)), KeyAction::None);
        assert_eq!(ui.composer_message(), None);
    }

    #[test]
    fn sidebar_navigation_selects_chat() {
        let mut ui = ready_ui();
        handle_key(&mut ui, key(KeyCode::Tab));
        assert_eq!(ui.focus, Focus::Sidebar);
        handle_key(&mut ui, key(KeyCode::Down));
        assert_eq!(
            handle_key(&mut ui, key(KeyCode::Enter)),
            KeyAction::SelectChat(chat(2))
        );
        assert_eq!(ui.focus, Focus::Composer);
    }

    #[test]
    fn dialog_submits_title_once() {
        let mut ui = ready_ui();
        handle_key(&mut ui, ctrl('n'));
        assert!(ui.dialog.is_some());
        type_text(&mut ui, "My Chat");
        assert_eq!(
            handle_key(&mut ui, key(KeyCode::Enter)),
            KeyAction::CreateChat("My Chat".to_string())
        );
        assert_eq!(handle_key(&mut ui, key(KeyCode::Enter)), KeyAction::None);
        assert_eq!(handle_key(&mut ui, key(KeyCode::Esc)), KeyAction::None);
        assert!(ui.dialog.is_some());
    }

    #[test]
    fn escape_cancels_dialog() {
        let mut ui = ready_ui();
        handle_key(&mut ui, ctrl('n'));
        type_text(&mut ui, "draft");
        assert_eq!(handle_key(&mut ui, key(KeyCode::Esc)), KeyAction::Redraw);
        assert!(ui.dialog.is_none());
        assert_eq!(ui.composer_message(), None);
    }

    #[test]
    fn reload_and_scroll_keys() {
        let mut ui = ready_ui();
        assert_eq!(handle_key(&mut ui, ctrl('r')), KeyAction::Reload);
        handle_key(&mut ui, key(KeyCode::PageUp));
        assert_eq!(ui.scroll_from_bottom, PAGE_SCROLL);
        handle_key(&mut ui, key(KeyCode::PageDown));
        assert_eq!(ui.scroll_from_bottom, 0);
    }

    #[test]
    fn paste_targets_dialog_then_composer() {
        let mut ui = ready_ui();
        ui.open_dialog();
        assert!(handle_paste(&mut ui, "Trip\r\nideas"));
        let title = ui.dialog.as_ref().map(|d| d.title());
        assert_eq!(title.as_deref(), Some("Trip ideas"));

        ui.close_dialog();
        assert!(handle_paste(&mut ui, "line one\nline two"));
        assert_eq!(ui.composer_message().as_deref(), Some("line one\nline two"));

        ui.online = false;
        assert!(!handle_paste(&mut ui, "more"));
    }
}
