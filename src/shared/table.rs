//! Plain-text tables for terminal output.
//!
//! Columns are sized to their widest cell using Unicode display width. The last
//! column takes whatever space is left and is truncated with "..." to fit.

use std::io::{self, Write};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const COLUMN_GAP: usize = 2;
const MIN_LAST_COLUMN_WIDTH: usize = 10;

/// Gets the terminal width, defaulting to 100 if unavailable.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(100)
}

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty; extra cells are ignored.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map(String::as_str).unwrap_or_default()
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = (0..columns)
            .map(|c| {
                std::iter::once(self.headers[c].as_str())
                    .chain(self.rows.iter().map(|r| Self::cell(r, c)))
                    .map(UnicodeWidthStr::width)
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        if let Some((last, fixed)) = widths.split_last_mut() {
            let used: usize = fixed.iter().sum::<usize>() + COLUMN_GAP * fixed.len();
            let available = max_width.saturating_sub(used).max(MIN_LAST_COLUMN_WIDTH);
            *last = (*last).min(available);
        }
        widths
    }

    pub fn render<W: Write>(&self, writer: &mut W, max_width: usize) -> io::Result<()> {
        let widths = self.column_widths(max_width);
        let header: Vec<String> = self.headers.clone();
        for row in std::iter::once(&header).chain(self.rows.iter()) {
            let line: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(c, width)| {
                    let is_last = c + 1 == widths.len();
                    fit(Self::cell(row, c), *width, !is_last)
                })
                .collect();
            writeln!(writer, "{}", line.join(&" ".repeat(COLUMN_GAP)))?;
        }
        Ok(())
    }
}

/// Truncates a string to fit within the specified display width.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width {
            break;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

/// Fit `s` into `width` display columns, adding "..." when truncated.
/// Pads with spaces only when `pad` is set, so the last column has no trailing blanks.
fn fit(s: &str, width: usize, pad: bool) -> String {
    let display_width = s.width();
    let fitted = if display_width <= width {
        s.to_string()
    } else if width < 3 {
        truncate_to_width(s, width)
    } else {
        format!("{}...", truncate_to_width(s, width - 3))
    };

    if pad {
        let padding = width.saturating_sub(fitted.width());
        format!("{fitted}{}", " ".repeat(padding))
    } else {
        fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use rstest::rstest;

    fn render(table: &Table, width: usize) -> String {
        let mut out = Vec::new();
        table.render(&mut out, width).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest]
    #[case::ascii_short("hello", 10, "hello")]
    #[case::ascii_truncate("hello world", 5, "hello")]
    #[case::zero_width("hello", 0, "")]
    #[case::cjk_truncate("日本語", 4, "日本")]
    #[case::cjk_odd_width("日本語", 5, "日本")]
    fn test_truncate_to_width(
        #[case] input: &str,
        #[case] max_width: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(truncate_to_width(input, max_width), expected);
    }

    #[rstest]
    #[case::pad("ab", 4, true, "ab  ")]
    #[case::no_pad("ab", 4, false, "ab")]
    #[case::truncate("hello world", 8, false, "hello...")]
    #[case::too_narrow_for_ellipsis("hello", 2, false, "he")]
    #[case::cjk_pad("日本", 6, true, "日本  ")]
    fn test_fit(#[case] input: &str, #[case] width: usize, #[case] pad: bool, #[case] expected: &str) {
        assert_eq!(fit(input, width, pad), expected);
    }

    #[test]
    fn renders_aligned_columns() {
        let mut table = Table::new(["ID", "TITLE"]);
        table.row(["DEMO-CR-1", "Fix login"]);
        table.row(["CR-2", "Bump deps"]);

        assert_eq!(
            render(&table, 80),
            indoc! {"
                ID         TITLE
                DEMO-CR-1  Fix login
                CR-2       Bump deps
            "}
        );
    }

    #[test]
    fn truncates_last_column_to_width() {
        let mut table = Table::new(["ID", "TITLE"]);
        table.row(["CR-1", "A very long review title that does not fit"]);

        let output = render(&table, 20);
        assert_eq!(output.lines().nth(1), Some("CR-1  A very long..."));
    }

    #[test]
    fn missing_cells_render_empty() {
        let mut table = Table::new(["A", "B", "C"]);
        table.row(["1"]);

        assert_eq!(render(&table, 80).lines().nth(1), Some("1     "));
    }
}
