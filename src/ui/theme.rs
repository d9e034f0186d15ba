use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub selection_style: Style,
    pub current_chat_style: Style,
    pub timestamp_style: Style,
    pub online_badge_style: Style,
    pub offline_badge_style: Style,
    pub loading_indicator_style: Style,
    pub error_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_placeholder_style: Style,

    // Markdown
    pub md_heading_styles: [Style; 3],
    pub md_code_style: Style,
    pub md_codeblock_bg: Option<Color>,
    pub md_codeblock_text_style: Style,
    pub md_link_style: Style,
    pub md_quote_style: Style,
    pub md_list_marker_style: Style,
    pub md_rule_style: Style,
    pub md_table_border_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Rgb(16, 18, 24),
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(160, 220, 235)),
            assistant_prefix_style: Style::default()
                .fg(Color::Rgb(190, 160, 255))
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Rgb(225, 225, 230)),
            system_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default()
                .fg(Color::Rgb(230, 230, 240))
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::Rgb(70, 74, 90)),
            focused_border_style: Style::default().fg(Color::Rgb(120, 160, 255)),
            selection_style: Style::default()
                .bg(Color::Rgb(45, 52, 72))
                .add_modifier(Modifier::BOLD),
            current_chat_style: Style::default().fg(Color::Rgb(120, 160, 255)),
            timestamp_style: Style::default().fg(Color::Rgb(120, 124, 140)),
            online_badge_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(80, 200, 120)),
            offline_badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(200, 70, 70)),
            loading_indicator_style: Style::default()
                .fg(Color::Rgb(190, 160, 255))
                .add_modifier(Modifier::ITALIC),
            error_style: Style::default()
                .fg(Color::Rgb(255, 120, 120))
                .add_modifier(Modifier::BOLD),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_placeholder_style: Style::default().fg(Color::DarkGray),

            md_heading_styles: [
                Style::default()
                    .fg(Color::Rgb(255, 200, 110))
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                Style::default()
                    .fg(Color::Rgb(255, 200, 110))
                    .add_modifier(Modifier::BOLD),
                Style::default()
                    .fg(Color::Rgb(230, 190, 130))
                    .add_modifier(Modifier::BOLD),
            ],
            md_code_style: Style::default()
                .fg(Color::Rgb(240, 170, 120))
                .bg(Color::Rgb(36, 40, 52)),
            md_codeblock_bg: Some(Color::Rgb(28, 31, 40)),
            md_codeblock_text_style: Style::default().fg(Color::Rgb(210, 210, 215)),
            md_link_style: Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::UNDERLINED),
            md_quote_style: Style::default()
                .fg(Color::Rgb(150, 155, 170))
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::Rgb(120, 160, 255)),
            md_rule_style: Style::default().fg(Color::Rgb(70, 74, 90)),
            md_table_border_style: Style::default().fg(Color::Rgb(90, 94, 110)),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Rgb(250, 250, 252),
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(20, 60, 140)),
            assistant_prefix_style: Style::default()
                .fg(Color::Rgb(110, 60, 170))
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Rgb(30, 30, 35)),
            system_text_style: Style::default().fg(Color::Gray),

            title_style: Style::default()
                .fg(Color::Rgb(20, 20, 30))
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::Rgb(190, 192, 200)),
            focused_border_style: Style::default().fg(Color::Rgb(40, 90, 200)),
            selection_style: Style::default()
                .bg(Color::Rgb(220, 228, 245))
                .add_modifier(Modifier::BOLD),
            current_chat_style: Style::default().fg(Color::Rgb(40, 90, 200)),
            timestamp_style: Style::default().fg(Color::Rgb(120, 120, 130)),
            online_badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(30, 140, 70)),
            offline_badge_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(190, 40, 40)),
            loading_indicator_style: Style::default()
                .fg(Color::Rgb(110, 60, 170))
                .add_modifier(Modifier::ITALIC),
            error_style: Style::default()
                .fg(Color::Rgb(180, 30, 30))
                .add_modifier(Modifier::BOLD),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_placeholder_style: Style::default().fg(Color::Gray),

            md_heading_styles: [
                Style::default()
                    .fg(Color::Rgb(150, 70, 0))
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                Style::default()
                    .fg(Color::Rgb(150, 70, 0))
                    .add_modifier(Modifier::BOLD),
                Style::default()
                    .fg(Color::Rgb(130, 80, 20))
                    .add_modifier(Modifier::BOLD),
            ],
            md_code_style: Style::default()
                .fg(Color::Rgb(160, 40, 40))
                .bg(Color::Rgb(236, 236, 240)),
            md_codeblock_bg: Some(Color::Rgb(242, 242, 246)),
            md_codeblock_text_style: Style::default().fg(Color::Rgb(40, 40, 45)),
            md_link_style: Style::default()
                .fg(Color::Rgb(20, 90, 200))
                .add_modifier(Modifier::UNDERLINED),
            md_quote_style: Style::default()
                .fg(Color::Rgb(100, 100, 110))
                .add_modifier(Modifier::ITALIC),
            md_list_marker_style: Style::default().fg(Color::Rgb(40, 90, 200)),
            md_rule_style: Style::default().fg(Color::Rgb(190, 192, 200)),
            md_table_border_style: Style::default().fg(Color::Rgb(170, 172, 180)),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            // Fallback
            _ => Self::dark_default(),
        }
    }

    pub fn heading_style(&self, level: usize) -> Style {
        let idx = level.saturating_sub(1).min(self.md_heading_styles.len() - 1);
        self.md_heading_styles[idx]
    }

    pub fn md_codeblock_bg_color(&self) -> Option<Color> {
        self.md_codeblock_bg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_dark() {
        assert_eq!(
            Theme::from_name("solarized").background_color,
            Theme::dark_default().background_color
        );
        assert_eq!(
            Theme::from_name("LIGHT").background_color,
            Theme::light().background_color
        );
    }

    #[test]
    fn deep_headings_reuse_last_style() {
        let theme = Theme::dark_default();
        assert_eq!(theme.heading_style(1), theme.md_heading_styles[0]);
        assert_eq!(theme.heading_style(6), theme.md_heading_styles[2]);
        assert_eq!(theme.heading_style(0), theme.md_heading_styles[0]);
    }
}
