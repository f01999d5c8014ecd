//! Source pane rendering with syntax highlighting
//!
//! Shows the routine being traced, or the instrumented text when the run used
//! the source-rewrite strategy and the user toggled it on. The line holding
//! the entry routine's declaration is highlighted.
//!
//! Highlighting uses a character-by-character tokenizer rather than the real
//! lexer, so unterminated strings or odd input still render.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        if c == '/' && chars.get(i + 1).is_some_and(|&(_, n)| n == '/') {
            flush_word(&mut spans, &mut current_word, false);
            spans.push(Span::styled(
                line[offset..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        if matches!(c, '"' | '\'' | '`') {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            let end = (end + 1).min(chars.len());
            let end_offset = chars.get(end).map_or(line.len(), |&(o, _)| o);
            spans.push(Span::styled(
                line[offset..end_offset].to_string(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' && c != '$' {
            flush_word(&mut spans, &mut current_word, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_call: bool) {
    if word.is_empty() {
        return;
    }
    let color = if is_call {
        DEFAULT_THEME.function
    } else {
        DEFAULT_THEME.fg
    };
    spans.push(Span::styled(std::mem::take(word), Style::default().fg(color)));
}

fn keyword_style(word: &str) -> Option<Style> {
    match word {
        "function" | "return" | "if" | "else" | "while" | "for" | "do" | "of" | "break"
        | "continue" | "let" | "const" | "var" | "new" | "typeof" | "in" => Some(
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD),
        ),
        "true" | "false" | "null" | "undefined" | "NaN" | "Infinity" => {
            Some(Style::default().fg(DEFAULT_THEME.number))
        }
        _ if word.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            Some(Style::default().fg(DEFAULT_THEME.number))
        }
        _ => None,
    }
}

/// Scroll state for the source pane
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceScrollState {
    pub offset: usize,
}

/// Render the source pane. `marked_line` is 1-based; 0 marks nothing.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    source_code: &str,
    marked_line: usize,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let max_scroll = lines.len().saturating_sub(visible_height);
    scroll_state.offset = scroll_state.offset.min(max_scroll);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_marked = line_num == marked_line;

            let num_style = if is_marked {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content = highlight_source_code(line);
            for span in &mut content.spans {
                if let Some(style) = keyword_style(&span.content) {
                    span.style = style;
                }
                if is_marked {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_strings_and_comments_stay_whole() {
        let line = highlight_source_code("return 'a b' + x; // done");
        let parts = texts(&line);
        assert!(parts.contains(&"'a b'".to_string()));
        assert_eq!(parts.last().unwrap(), "// done");
    }

    #[test]
    fn test_call_names_are_styled_as_functions() {
        let line = highlight_source_code("fn(n - 1)");
        assert_eq!(line.spans[0].content, "fn");
        assert_eq!(line.spans[0].style.fg, Some(DEFAULT_THEME.function));
    }

    #[test]
    fn test_keywords() {
        assert!(keyword_style("function").is_some());
        assert!(keyword_style("42").is_some());
        assert!(keyword_style("fnx").is_none());
    }
}
