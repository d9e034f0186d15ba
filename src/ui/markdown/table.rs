use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::wrap::{spans_width, wrap_spans};
use crate::ui::theme::Theme;

type TableCell = Vec<Span<'static>>;

const MIN_COLUMN_WIDTH: usize = 3;

/// Collects markdown table events and lays the table out with box-drawing
/// borders, wrapping cell contents when the table is wider than the pane.
pub(crate) struct TableRenderer {
    header: Option<Vec<TableCell>>,
    rows: Vec<Vec<TableCell>>,
    current_row: Vec<TableCell>,
    current_cell: TableCell,
    in_header: bool,
}

impl TableRenderer {
    pub(crate) fn new() -> Self {
        Self {
            header: None,
            rows: Vec::new(),
            current_row: Vec::new(),
            current_cell: Vec::new(),
            in_header: false,
        }
    }

    pub(crate) fn start_header(&mut self) {
        self.in_header = true;
    }

    pub(crate) fn end_header(&mut self) {
        self.in_header = false;
        if !self.current_row.is_empty() {
            self.header = Some(std::mem::take(&mut self.current_row));
        }
    }

    pub(crate) fn end_row(&mut self) {
        if !self.current_row.is_empty() {
            self.rows.push(std::mem::take(&mut self.current_row));
        }
    }

    pub(crate) fn end_cell(&mut self) {
        self.current_row.push(std::mem::take(&mut self.current_cell));
    }

    pub(crate) fn add_span(&mut self, mut span: Span<'static>) {
        if self.in_header {
            span.style = span.style.add_modifier(Modifier::BOLD);
        }
        self.current_cell.push(span);
    }

    fn column_count(&self) -> usize {
        self.header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    fn ideal_widths(&self, columns: usize) -> Vec<usize> {
        let mut widths = vec![MIN_COLUMN_WIDTH; columns];
        for row in self.header.iter().chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(spans_width(cell));
            }
        }
        widths
    }

    /// Shrink the widest columns first until the bordered table fits `max_width`.
    fn fit_widths(mut widths: Vec<usize>, max_width: usize) -> Vec<usize> {
        // "│ " before each cell plus the closing "│".
        let chrome = widths.len() * 3 + 1;
        let budget = max_width.saturating_sub(chrome);
        while widths.iter().sum::<usize>() > budget {
            let Some((idx, widest)) = widths
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|(_, width)| *width)
            else {
                break;
            };
            if widest <= MIN_COLUMN_WIDTH {
                break;
            }
            widths[idx] = widest - 1;
        }
        widths
    }

    pub(crate) fn render(&self, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
        let columns = self.column_count();
        if columns == 0 {
            return Vec::new();
        }
        let widths = Self::fit_widths(self.ideal_widths(columns), max_width);
        let border = theme.md_table_border_style;

        let mut lines = vec![Self::border_line(&widths, ('┌', '┬', '┐'), border)];
        if let Some(header) = &self.header {
            lines.extend(Self::row_lines(header, &widths, border));
            lines.push(Self::border_line(&widths, ('├', '┼', '┤'), border));
        }
        for row in &self.rows {
            lines.extend(Self::row_lines(row, &widths, border));
        }
        lines.push(Self::border_line(&widths, ('└', '┴', '┘'), border));
        lines
    }

    fn border_line(widths: &[usize], (left, mid, right): (char, char, char), style: Style) -> Line<'static> {
        let mut text = String::new();
        text.push(left);
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                text.push(mid);
            }
            text.push_str(&"─".repeat(width + 2));
        }
        text.push(right);
        Line::from(Span::styled(text, style))
    }

    fn row_lines(row: &[TableCell], widths: &[usize], border: Style) -> Vec<Line<'static>> {
        let wrapped: Vec<Vec<Vec<Span<'static>>>> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| match row.get(i) {
                Some(cell) => wrap_spans(cell, *width),
                None => vec![Vec::new()],
            })
            .collect();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        (0..height)
            .map(|line_idx| {
                let mut spans = Vec::new();
                for (col, width) in widths.iter().enumerate() {
                    spans.push(Span::styled("│ ", border));
                    let content = wrapped[col].get(line_idx).cloned().unwrap_or_default();
                    let used = spans_width(&content);
                    spans.extend(content);
                    spans.push(Span::raw(" ".repeat(width.saturating_sub(used) + 1)));
                }
                spans.push(Span::styled("│", border));
                Line::from(spans)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn sample() -> TableRenderer {
        let mut table = TableRenderer::new();
        table.start_header();
        table.add_span(Span::raw("Name"));
        table.end_cell();
        table.add_span(Span::raw("Role"));
        table.end_cell();
        table.end_header();
        table.add_span(Span::raw("ada"));
        table.end_cell();
        table.add_span(Span::raw("assistant"));
        table.end_cell();
        table.end_row();
        table
    }

    #[test]
    fn renders_bordered_table_at_natural_width() {
        let lines: Vec<String> = sample()
            .render(&Theme::dark_default(), 80)
            .iter()
            .map(line_text)
            .collect();
        assert_eq!(
            lines,
            vec![
                "┌──────┬───────────┐",
                "│ Name │ Role      │",
                "├──────┼───────────┤",
                "│ ada  │ assistant │",
                "└──────┴───────────┘",
            ]
        );
    }

    #[test]
    fn narrow_panes_wrap_cells() {
        let lines = sample().render(&Theme::dark_default(), 16);
        assert!(lines.iter().all(|line| line.width() <= 16));
        assert!(lines.len() > 5);
    }

    #[test]
    fn header_cells_are_bold() {
        let lines = sample().render(&Theme::dark_default(), 80);
        let header = &lines[1];
        let name = header
            .spans
            .iter()
            .find(|s| s.content == "Name")
            .expect("header cell");
        assert!(name.style.add_modifier.contains(Modifier::BOLD));
    }
}
