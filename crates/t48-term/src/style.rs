// SPDX-License-Identifier: MIT
//
// Text style — color and attributes for a run of characters.
//
// The game board needs a small palette: tile colors from the xterm 256
// table, bold for banners, dim for a finished board. `Style` bundles the
// three so a whole span can be styled with one value, and `Style::PLAIN`
// is the terminal default that every frame line is reset to.

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter. Combine with bitwise OR:
    ///
    /// ```
    /// use t48_term::style::Attr;
    ///
    /// let banner = Attr::BOLD | Attr::INVERSE;
    /// assert!(banner.contains(Attr::BOLD));
    /// assert!(!banner.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM       = 1 << 1;
        /// SGR 4 — single underline.
        const UNDERLINE = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The terminal's own default (SGR 39 / 49).
    #[default]
    Default,
    /// An index into the xterm 256-color palette. 0–15 are the themeable
    /// ANSI colors.
    Ansi256(u8),
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background, and attributes for a span of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attr: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attr: Attr::empty(),
    };

    /// Plain style with the given foreground.
    #[must_use]
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Self::PLAIN
        }
    }

    /// Replace the background.
    #[must_use]
    pub const fn on(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Add attributes.
    #[must_use]
    pub const fn with(mut self, attr: Attr) -> Self {
        self.attr = self.attr.union(attr);
        self
    }

    /// Whether this is exactly the terminal default.
    #[inline]
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
