use std::{borrow::Cow, fmt::Write};

const CELL_PADDING: usize = 1;

/// Builds a boxed plain-text table for terminal output.
#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate() {
                if i < col_widths.len() {
                    col_widths[i] = col_widths[i].max(display_width(cell));
                }
            }
        }

        let separator = separator_line(&col_widths);
        let mut table = String::with_capacity(separator.len() * (self.rows.len() + 4));
        table.push_str(&separator);
        write_row(
            &mut table,
            self.headers.iter().map(|h| &**h),
            &col_widths,
            &[],
        );
        table.push_str(&separator);
        for row in &self.rows {
            write_row(
                &mut table,
                row.as_ref().iter().map(|cell| &**cell),
                &col_widths,
                &self.alignments,
            );
        }
        if !self.rows.is_empty() {
            table.push_str(&separator);
        }
        table
    }
}

fn separator_line(col_widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in col_widths {
        line.push_str(&"-".repeat(width + CELL_PADDING * 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn write_row<'c>(
    out: &mut String,
    mut cells: impl Iterator<Item = &'c str>,
    col_widths: &[usize],
    alignments: &[Alignment],
) {
    out.push('|');
    for (i, width) in col_widths.iter().enumerate() {
        let cell = cells.next().unwrap_or_default();
        let alignment = alignments.get(i).copied().unwrap_or_default();
        let gap = width.saturating_sub(display_width(cell));
        let (left, right) = match alignment {
            Alignment::Left => (0, gap),
            Alignment::Center => (gap / 2, gap - gap / 2),
            Alignment::Right => (gap, 0),
        };
        let _ = write!(
            out,
            "{pad}{lead}{cell}{trail}{pad}|",
            pad = " ".repeat(CELL_PADDING),
            lead = " ".repeat(left),
            trail = " ".repeat(right),
        );
    }
    out.push('\n');
}

/// Terminal columns taken by `text`; emoji and CJK count double.
fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

fn char_width(c: char) -> usize {
    match c {
        '\u{0300}'..='\u{036F}' | '\u{200B}'..='\u{200F}' | '\u{FE0F}' => 0,
        '\u{1100}'..='\u{115F}'
        | '\u{2E80}'..='\u{A4CF}'
        | '\u{AC00}'..='\u{D7A3}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FF60}'
        | '\u{1F300}'..='\u{1FAFF}' => 2,
        _ => 1,
    }
}

/// Stacks titled blocks with a blank line between them.
pub fn combine_sections(sections: &[(&str, &str)]) -> Option<String> {
    if sections.is_empty() {
        return None;
    }

    let capacity = sections
        .iter()
        .map(|(title, body)| title.len() + body.len() + 2)
        .sum();
    let mut combined = String::with_capacity(capacity);
    for (idx, (title, body)) in sections.iter().enumerate() {
        if idx > 0 {
            combined.push('\n');
        }
        let _ = writeln!(&mut combined, "{title}");
        combined.push_str(body);
    }
    Some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn builds_aligned_table() {
        let table = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed("Name"), Cow::Borrowed("Balance")])
            .row([Cow::Borrowed("An"), Cow::Borrowed("+100.00")])
            .row([Cow::Borrowed("Bình"), Cow::Borrowed("-5.50")])
            .build();

        let expected = "\
+------+---------+
| Name | Balance |
+------+---------+
| An   | +100.00 |
| Bình |   -5.50 |
+------+---------+
";
        assert_eq!(table, expected);
    }

    #[rstest]
    fn header_only_table_has_no_trailing_separator() {
        let table: String = TextTableBuilder::<[Cow<'_, str>; 1]>::new()
            .headers(&[Cow::Borrowed("Empty")])
            .build();

        assert_eq!(table, "+-------+\n| Empty |\n+-------+\n");
    }

    #[rstest]
    #[case::ascii("abc", 3)]
    #[case::vietnamese("Đi lại", 6)]
    #[case::emoji("🍜", 2)]
    #[case::combining_mark("e\u{0301}", 1)]
    fn measures_display_width(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(display_width(text), expected);
    }

    #[rstest]
    fn combines_sections_with_blank_line() {
        let combined = combine_sections(&[("A", "x\n"), ("B", "y\n")]).expect("sections");
        assert_eq!(combined, "A\nx\n\nB\ny\n");
    }

    #[rstest]
    fn combine_sections_empty() {
        assert!(combine_sections(&[]).is_none());
    }
}
