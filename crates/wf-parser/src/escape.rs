//! Backslash escapes for the two structural characters.
//!
//! `\#` and `\|` become [`Glyph::Escaped`] values, so they can never be
//! mistaken for a comment marker or field separator, and no in-band sentinel
//! text is needed.

/// A structural character that was escaped by the author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Hash,
    Pipe,
}

impl Delimiter {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Hash => '#',
            Self::Pipe => '|',
        }
    }

    const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Self::Hash),
            '|' => Some(Self::Pipe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Ordinary source character. `#` and `|` here are structural.
    Char(char),
    /// Escaped delimiter, always literal text.
    Escaped(Delimiter),
}

impl Glyph {
    /// The character this glyph stands for in field text.
    #[must_use]
    pub const fn literal(self) -> char {
        match self {
            Self::Char(ch) => ch,
            Self::Escaped(delimiter) => delimiter.as_char(),
        }
    }

    #[must_use]
    pub const fn is_structural(self, ch: char) -> bool {
        matches!(self, Self::Char(c) if c == ch)
    }

    #[must_use]
    pub const fn is_line_break(self) -> bool {
        matches!(
            self,
            Self::Char(
                '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
                    | '\u{2029}'
            )
        )
    }

    fn push_markup(self, out: &mut String) {
        if let Self::Escaped(delimiter) = self {
            out.push('\\');
            out.push(delimiter.as_char());
        } else {
            out.push(self.literal());
        }
    }
}

/// Markup after escape resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EscapedText {
    glyphs: Vec<Glyph>,
}

impl EscapedText {
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Split into lines on every line break: `\n`, `\r\n`, a lone `\r`, and the
    /// vertical tab, form feed, file/group/record separators, NEL and the
    /// Unicode line and paragraph separators. A final break does not start an
    /// extra empty line, and no returned line contains a break.
    pub fn lines(&self) -> impl Iterator<Item = &[Glyph]> {
        let mut rest = self.glyphs.as_slice();
        std::iter::from_fn(move || {
            if rest.is_empty() {
                return None;
            }
            let Some(at) = rest.iter().position(|glyph| glyph.is_line_break()) else {
                return Some(std::mem::take(&mut rest));
            };
            let line = &rest[..at];
            let crlf = rest[at] == Glyph::Char('\r')
                && rest.get(at + 1) == Some(&Glyph::Char('\n'));
            rest = &rest[at + if crlf { 2 } else { 1 }..];
            Some(line)
        })
    }

    /// Re-serialize to source form, restoring the backslash escapes.
    #[must_use]
    pub fn to_markup(&self) -> String {
        to_markup(&self.glyphs)
    }
}

#[must_use]
pub fn escape(text: &str) -> EscapedText {
    let mut glyphs = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(delimiter) = chars.peek().copied().and_then(Delimiter::from_char) {
                chars.next();
                glyphs.push(Glyph::Escaped(delimiter));
                continue;
            }
        }
        glyphs.push(Glyph::Char(ch));
    }

    EscapedText { glyphs }
}

/// Field text: escaped delimiters become their literal character.
#[must_use]
pub fn unescape(glyphs: &[Glyph]) -> String {
    glyphs.iter().map(|glyph| glyph.literal()).collect()
}

/// Source text: escaped delimiters keep their backslash.
#[must_use]
pub fn to_markup(glyphs: &[Glyph]) -> String {
    let mut out = String::with_capacity(glyphs.len());
    for glyph in glyphs {
        glyph.push_markup(&mut out);
    }
    out
}
