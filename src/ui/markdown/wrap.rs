use ratatui::style::Style;
use ratatui::text::Span;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Wrap styled spans to `max_width` columns, breaking at whitespace where
/// possible and hard-breaking words that cannot fit on a line of their own.
/// Leading whitespace on continuation lines is dropped.
pub(crate) fn wrap_spans(spans: &[Span<'static>], max_width: usize) -> Vec<Vec<Span<'static>>> {
    let max_width = max_width.max(1);
    let mut wrapped: Vec<Vec<Span<'static>>> = Vec::new();
    let mut line: Vec<Span<'static>> = Vec::new();
    let mut width = 0usize;

    for span in spans {
        let style = span.style;
        for token in split_runs(&span.content) {
            let token_width = token.width();
            if token.chars().all(char::is_whitespace) {
                if width == 0 && !wrapped.is_empty() {
                    continue;
                }
                if width + token_width > max_width {
                    finish_line(&mut wrapped, &mut line);
                    width = 0;
                    continue;
                }
                push_piece(&mut line, token, style);
                width += token_width;
                continue;
            }

            if width + token_width <= max_width {
                push_piece(&mut line, token, style);
                width += token_width;
                continue;
            }
            if width > 0 {
                finish_line(&mut wrapped, &mut line);
                width = 0;
            }
            if token_width <= max_width {
                push_piece(&mut line, token, style);
                width = token_width;
                continue;
            }

            let mut chunk = String::new();
            let mut chunk_width = 0usize;
            for grapheme in token.graphemes(true) {
                let grapheme_width = grapheme.width();
                if chunk_width + grapheme_width > max_width && !chunk.is_empty() {
                    push_piece(&mut line, &chunk, style);
                    finish_line(&mut wrapped, &mut line);
                    chunk.clear();
                    chunk_width = 0;
                }
                chunk.push_str(grapheme);
                chunk_width += grapheme_width;
            }
            push_piece(&mut line, &chunk, style);
            width = chunk_width;
        }
    }

    finish_line(&mut wrapped, &mut line);
    wrapped
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if in_space.is_some_and(|prev| prev != is_space) {
            runs.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

fn push_piece(line: &mut Vec<Span<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    match line.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => line.push(Span::styled(text.to_string(), style)),
    }
}

fn finish_line(wrapped: &mut Vec<Vec<Span<'static>>>, line: &mut Vec<Span<'static>>) {
    while let Some(last) = line.last_mut() {
        let trimmed_len = last.content.trim_end().len();
        if trimmed_len == last.content.len() {
            break;
        }
        if trimmed_len == 0 {
            line.pop();
        } else {
            last.content.to_mut().truncate(trimmed_len);
            break;
        }
    }
    wrapped.push(std::mem::take(line));
}

pub(crate) fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.width()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Modifier};

    fn text_of(line: &[Span<'_>]) -> String {
        line.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn breaks_at_word_boundaries() {
        let spans = vec![Span::raw("the quick brown fox jumps")];
        let lines: Vec<String> = wrap_spans(&spans, 10).iter().map(|l| text_of(l)).collect();
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn hard_breaks_overlong_words() {
        let spans = vec![Span::raw("abcdefghij klm")];
        let lines: Vec<String> = wrap_spans(&spans, 4).iter().map(|l| text_of(l)).collect();
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "klm"]);
    }

    #[test]
    fn keeps_styles_across_breaks() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let red = Style::default().fg(Color::Red);
        let spans = vec![Span::styled("bold words ", bold), Span::styled("red", red)];
        let lines = wrap_spans(&spans, 10);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], vec![Span::styled("bold words", bold)]);
        assert_eq!(lines[1], vec![Span::styled("red", red)]);
    }

    #[test]
    fn measures_wide_characters_by_columns() {
        let spans = vec![Span::raw("你好世界")];
        let lines: Vec<String> = wrap_spans(&spans, 4).iter().map(|l| text_of(l)).collect();
        assert_eq!(lines, vec!["你好", "世界"]);
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        assert_eq!(wrap_spans(&[], 10), vec![Vec::<Span<'static>>::new()]);
    }

    #[test]
    fn split_runs_alternates() {
        assert_eq!(split_runs("a  bc d"), vec!["a", "  ", "bc", " ", "d"]);
        assert_eq!(split_runs(" x"), vec![" ", "x"]);
    }
}
