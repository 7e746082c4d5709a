//! Word wrapping done before rendering.
//!
//! The transcript needs to know how many rows it occupies to pin the newest
//! message to the bottom. Counting rows with one rule and letting ratatui wrap
//! with another drifts apart on long words, so lines are wrapped here and the
//! paragraph is rendered without `Wrap`.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Wraps `lines` to `width` columns at spaces, breaking words longer than a
/// row. Styles are kept per character. Empty input lines stay as one empty
/// row, and a space that lands on a row boundary is dropped.
pub fn prewrap_lines(lines: &[Line<'_>], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if width == 0 {
            let spans = line
                .spans
                .iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect::<Vec<_>>();
            out.push(Line::from(spans).style(line.style));
        } else {
            wrap_line(line, width, &mut out);
        }
    }
    out
}

#[derive(Default)]
struct Row {
    spans: Vec<Span<'static>>,
    width: usize,
}

impl Row {
    fn push(&mut self, ch: char, style: Style, ch_width: usize) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push(ch),
            _ => self.spans.push(Span::styled(ch.to_string(), style)),
        }
        self.width += ch_width;
    }

    fn finish(&mut self, line_style: Style, out: &mut Vec<Line<'static>>) {
        out.push(Line::from(std::mem::take(&mut self.spans)).style(line_style));
        self.width = 0;
    }
}

fn wrap_line(line: &Line<'_>, width: usize, out: &mut Vec<Line<'static>>) {
    let cells: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();

    let start_len = out.len();
    let mut row = Row::default();
    let mut i = 0;
    while i < cells.len() {
        let (ch, style) = cells[i];
        if ch == ' ' {
            if row.width < width {
                row.push(ch, style, 1);
            } else {
                row.finish(line.style, out);
            }
            i += 1;
            continue;
        }

        let end = cells[i..]
            .iter()
            .position(|(c, _)| *c == ' ')
            .map_or(cells.len(), |offset| i + offset);
        let word = &cells[i..end];
        let word_width: usize = word.iter().map(|(c, _)| char_width(*c)).sum();
        if row.width > 0 && row.width + word_width > width {
            row.finish(line.style, out);
        }
        for &(ch, style) in word {
            let w = char_width(ch);
            if row.width > 0 && row.width + w > width {
                row.finish(line.style, out);
            }
            row.push(ch, style, w);
        }
        i = end;
    }

    if !row.spans.is_empty() || out.len() == start_len {
        row.finish(line.style, out);
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn moves_words_that_do_not_fit_to_the_next_row() {
        let lines = [Line::from("abcdef abcdef abcdef")];
        assert_eq!(
            texts(&prewrap_lines(&lines, 12)),
            vec!["abcdef ", "abcdef ", "abcdef"]
        );
    }

    #[test]
    fn breaks_words_longer_than_a_row() {
        let lines = [Line::from("abcdefghij")];
        assert_eq!(texts(&prewrap_lines(&lines, 4)), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn drops_the_space_at_a_row_boundary() {
        let lines = [Line::from("abcd efgh")];
        assert_eq!(texts(&prewrap_lines(&lines, 4)), vec!["abcd", "efgh"]);
    }

    #[test]
    fn keeps_empty_lines_and_styles() {
        let bold = Style::default().fg(Color::Cyan);
        let lines = [
            Line::from(vec![Span::styled("You:", bold), Span::raw(" 10:00")]),
            Line::default(),
        ];
        let wrapped = prewrap_lines(&lines, 6);
        assert_eq!(texts(&wrapped), vec!["You: ", "10:00", ""]);
        assert_eq!(wrapped[0].spans[0].style, bold);
        assert_eq!(wrapped[0].spans[0].content, "You:");
    }

    #[test]
    fn wide_characters_count_two_columns() {
        let lines = [Line::from("日本語")];
        assert_eq!(texts(&prewrap_lines(&lines, 4)), vec!["日本", "語"]);
    }
}
