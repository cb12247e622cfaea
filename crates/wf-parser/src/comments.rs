use crate::escape::{EscapedText, Glyph, to_markup};

/// A line that survived comment stripping, tagged with its 1-based number in
/// the original markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub glyphs: &'a [Glyph],
}

impl SourceLine<'_> {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        is_blank(self.glyphs)
    }

    #[must_use]
    pub fn to_markup(&self) -> String {
        to_markup(self.glyphs)
    }
}

pub(crate) fn is_blank(glyphs: &[Glyph]) -> bool {
    glyphs
        .iter()
        .all(|glyph| matches!(glyph, Glyph::Char(ch) if ch.is_whitespace()))
}

/// Remove comments line by line.
///
/// Blank lines are kept since they end a flow. A line whose first `#` is in
/// column 0 is dropped entirely, so comments can sit inside a flow without
/// splitting it. Otherwise the line is cut at its first `#`.
pub(crate) fn strip_comment_lines(text: &EscapedText) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, glyphs)| {
            let number = index + 1;
            if is_blank(glyphs) {
                return Some(SourceLine { number, glyphs });
            }

            match glyphs.iter().position(|glyph| glyph.is_structural('#')) {
                Some(0) => None,
                Some(cut) => Some(SourceLine {
                    number,
                    glyphs: &glyphs[..cut],
                }),
                None => Some(SourceLine { number, glyphs }),
            }
        })
        .collect()
}

/// Cleaned markup text: every kept line followed by `\n`.
pub(crate) fn join_lines(lines: &[SourceLine<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_markup());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{join_lines, strip_comment_lines};
    use crate::escape::escape;

    fn strip(markup: &str) -> String {
        join_lines(&strip_comment_lines(&escape(markup)))
    }

    #[test]
    fn inline_comment_is_cut() {
        assert_eq!(strip("A # not shown\n"), "A \n");
    }

    #[test]
    fn full_line_comment_is_dropped() {
        assert_eq!(strip("A\n# note\nB\n"), "A\nB\n");
    }

    #[test]
    fn indented_comment_leaves_whitespace_behind() {
        assert_eq!(strip("A\n  # note\nB"), "A\n  \nB\n");
    }

    #[test]
    fn blank_lines_are_preserved_verbatim() {
        assert_eq!(strip("A\n \t\n\nB\n"), "A\n \t\n\nB\n");
    }

    #[test]
    fn escaped_hash_is_not_a_comment() {
        assert_eq!(strip("Issue \\#42 # tracker\n"), "Issue \\#42 \n");
    }

    #[test]
    fn line_numbers_skip_dropped_lines() {
        let escaped = escape("# header\nA\n\n# mid\nB\n");
        let numbers: Vec<usize> = strip_comment_lines(&escaped)
            .iter()
            .map(|line| line.number)
            .collect();
        assert_eq!(numbers, vec![2, 3, 5]);
    }

    #[test]
    fn empty_markup_stays_empty() {
        assert_eq!(strip(""), "");
    }
}
