// SPDX-License-Identifier: MIT
//
// Frame — what one screen of the game looks like, before any escape code.
//
// A `Frame` is a list of `Line`s, each a run of styled `Span`s. Views build
// frames; `output::draw_frame` turns them into bytes. Keeping the two apart
// means a view can be tested by comparing plain text, with no terminal.
//
// Widths are display columns (via `unicode-width`), not bytes or chars, so
// a frame can be centered correctly even if a banner uses non-ASCII glyphs.

use unicode_width::UnicodeWidthStr;

use crate::style::Style;

// ─── Span ────────────────────────────────────────────────────────────────────

/// A run of text in one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in terminal columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

// ─── Line ────────────────────────────────────────────────────────────────────

/// One screen row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    spans: Vec<Span>,
}

impl Line {
    /// An empty line.
    #[must_use]
    pub const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    /// A line of unstyled text.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::PLAIN)
    }

    /// A line that is a single styled span.
    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        let mut line = Self::new();
        line.push(text, style);
        line
    }

    /// Append a span. Empty text is dropped.
    pub fn push(&mut self, text: impl Into<String>, style: Style) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span { text, style });
        }
        self
    }

    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Display width in terminal columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// The text without styling.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// A full screen of lines, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<Line>,
}

impl Frame {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Width of the widest line.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lines.iter().map(Line::width).max().unwrap_or(0)
    }

    /// The frame as plain text, one `\n`-terminated line per row.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text());
            out.push('\n');
        }
        out
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
