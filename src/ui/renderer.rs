use std::ops::Range;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::ui::markdown::{render_transcript, MessageRenderConfig};
use crate::ui::state::{Focus, UiState};
use crate::utils::time::short_timestamp;

const SIDEBAR_WIDTH: u16 = 30;
const MAX_COMPOSER_LINES: u16 = 6;

pub fn ui(f: &mut Frame, ui: &mut UiState) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(ui.theme.background_color)),
        area,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, ui, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[1]);
    draw_sidebar(f, ui, columns[0]);
    if ui.chat.current_chat.is_some() {
        draw_conversation(f, ui, columns[1]);
    } else {
        draw_welcome(f, ui, columns[1]);
    }

    draw_status_line(f, ui, rows[2]);

    if ui.dialog.is_some() {
        draw_new_chat_dialog(f, ui, area);
    }
}

fn draw_header(f: &mut Frame, ui: &UiState, area: Rect) {
    let theme = &ui.theme;
    let badge = if ui.online {
        Span::styled(" ● online ", theme.online_badge_style)
    } else {
        Span::styled(" ○ offline ", theme.offline_badge_style)
    };
    let line = Line::from(vec![
        Span::styled(" chatline ", theme.title_style),
        Span::styled(format!("· {} ", ui.server_label), theme.timestamp_style),
        badge,
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn border_style(ui: &UiState, focus: Focus) -> Style {
    if ui.focus == focus && ui.dialog.is_none() {
        ui.theme.focused_border_style
    } else {
        ui.theme.border_style
    }
}

fn draw_sidebar(f: &mut Frame, ui: &UiState, area: Rect) {
    let theme = &ui.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(ui, Focus::Sidebar))
        .title(Span::styled(" Chats ", theme.title_style));

    if ui.chat.chats.is_empty() {
        let hint = if ui.chat.loading {
            Line::from(Span::styled("Loading chats…", theme.loading_indicator_style))
        } else {
            Line::from(Span::styled(
                "No chats yet. Press Ctrl+N to start one.",
                theme.system_text_style,
            ))
        };
        f.render_widget(
            Paragraph::new(hint).block(block).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let current_id = ui.chat.current_chat.as_ref().map(|chat| chat.id);
    let items: Vec<ListItem> = ui
        .chat
        .chats
        .iter()
        .map(|chat| {
            let title_style = if Some(chat.id) == current_id {
                theme.current_chat_style.add_modifier(Modifier::BOLD)
            } else {
                theme.assistant_text_style
            };
            ListItem::new(vec![
                Line::from(Span::styled(chat.title.clone(), title_style)),
                Line::from(Span::styled(
                    short_timestamp(&chat.updated_at),
                    theme.timestamp_style,
                )),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(ui.picker.selected));
    let highlight = if ui.focus == Focus::Sidebar {
        theme.selection_style
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("▌");
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_welcome(f: &mut Frame, ui: &UiState, area: Rect) {
    let theme = &ui.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("Welcome to chatline", theme.title_style)),
        Line::default(),
        Line::from(Span::styled(
            "Pick a chat on the left, or press Ctrl+N to create a new one.",
            theme.system_text_style,
        )),
    ];
    let top = inner.height.saturating_sub(lines.len() as u16) / 2;
    let centered = Rect {
        y: inner.y + top,
        height: inner.height.saturating_sub(top),
        ..inner
    };
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered,
    );
}

fn draw_conversation(f: &mut Frame, ui: &mut UiState, area: Rect) {
    let composer_lines = (ui.composer.lines().len() as u16).clamp(1, MAX_COMPOSER_LINES);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(composer_lines + 2),
        ])
        .split(area);

    draw_chat_header(f, ui, rows[0]);
    draw_transcript(f, ui, rows[1]);
    draw_composer(f, ui, rows[2]);
}

fn draw_chat_header(f: &mut Frame, ui: &UiState, area: Rect) {
    let theme = &ui.theme;
    let Some(chat) = ui.chat.current_chat.as_ref() else {
        return;
    };
    let count = ui.chat.messages.len();
    let noun = if count == 1 { "message" } else { "messages" };
    let lines = vec![
        Line::from(Span::styled(chat.title.clone(), theme.title_style)),
        Line::from(Span::styled(
            format!(
                "Updated {} · {count} {noun}",
                short_timestamp(&chat.updated_at)
            ),
            theme.timestamp_style,
        )),
    ];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border_style);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Transcript lines for a pane `width` columns wide, including the loading
/// and empty-state lines.
pub fn transcript_lines(ui: &UiState, width: u16) -> Vec<Line<'static>> {
    let theme = &ui.theme;
    let config = MessageRenderConfig::new(ui.markdown, ui.syntax, width.max(1) as usize);
    let mut lines = render_transcript(&ui.chat.messages, theme, config);

    if ui.chat.loading || ui.sending {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "Assistant is thinking…",
            theme.loading_indicator_style,
        )));
    } else if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No messages yet. Say hello!",
            theme.system_text_style,
        )));
    }
    lines
}

fn draw_transcript(f: &mut Frame, ui: &mut UiState, area: Rect) {
    let inner = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    };
    let mut lines = transcript_lines(ui, inner.width);
    let (range, scroll) = visible_range(lines.len(), inner.height, ui.scroll_from_bottom);
    // Clamp so scrolling past the top does not accumulate.
    ui.scroll_from_bottom = scroll;
    lines.truncate(range.end);
    lines.drain(..range.start);

    f.render_widget(Paragraph::new(lines), inner);
}

/// Rows of a `total`-line transcript visible in a pane `height` rows tall,
/// `scroll_from_bottom` lines up from the end, plus that scroll clamped to
/// the content.
pub(crate) fn visible_range(
    total: usize,
    height: u16,
    scroll_from_bottom: u16,
) -> (Range<usize>, u16) {
    let max_offset = total.saturating_sub(height as usize);
    let back = (scroll_from_bottom as usize).min(max_offset);
    let start = max_offset - back;
    let end = (start + height as usize).min(total);
    (start..end, back as u16)
}

fn draw_composer(f: &mut Frame, ui: &mut UiState, area: Rect) {
    let reason = ui.composer_block_reason();
    let focused = ui.focus == Focus::Composer && ui.dialog.is_none();
    let title = match reason {
        Some(_) => " Message ".to_string(),
        None => " Message (Enter to send, Shift+Enter for a new line) ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(ui, Focus::Composer))
        .title(Span::styled(title, ui.theme.title_style));

    let placeholder = reason.unwrap_or("Type a message…");
    let cursor_style = if reason.is_none() && focused {
        ui.theme.input_cursor_style
    } else {
        Style::default()
    };
    ui.composer.set_placeholder_text(placeholder);
    ui.composer.set_cursor_style(cursor_style);
    ui.composer.set_block(block);
    f.render_widget(&ui.composer, area);
}

fn draw_status_line(f: &mut Frame, ui: &UiState, area: Rect) {
    let theme = &ui.theme;
    let line = match &ui.toast {
        Some(toast) => Line::from(Span::styled(format!(" ✖ {}", toast.message), theme.error_style)),
        None => Line::from(Span::styled(
            " Tab switch focus · Ctrl+N new chat · Ctrl+R reload · PgUp/PgDn scroll · Ctrl+Q quit",
            theme.system_text_style,
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_new_chat_dialog(f: &mut Frame, ui: &mut UiState, area: Rect) {
    let theme = ui.theme.clone();
    let Some(dialog) = ui.dialog.as_mut() else {
        return;
    };
    let popup = centered_rect(56, 5, area);
    f.render_widget(Clear, popup);

    let title = if dialog.submitting {
        " New chat (creating…) "
    } else {
        " New chat (Enter to create, Esc to cancel) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.focused_border_style)
        .title(Span::styled(title, theme.title_style))
        .style(Style::default().bg(theme.background_color));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(
        Paragraph::new(Span::styled("Title", theme.timestamp_style)),
        rows[0],
    );
    f.render_widget(&dialog.input, rows[1]);
}
