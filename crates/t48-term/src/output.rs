// SPDX-License-Identifier: MIT
//
// Output buffering and frame drawing.
//
//   OutputBuffer — accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall. No partial frames on screen,
//   no per-escape syscall overhead.
//
//   draw_frame — encodes a `Frame` into an `OutputBuffer`: one cursor move
//   per line, a style switch only where the style changes, and an erase of
//   whatever an older, wider frame left behind. The whole thing is wrapped
//   in synchronized output so the terminal flips to it atomically.

use std::io::{self, Write};

use crate::ansi;
use crate::frame::Frame;
use crate::style::Style;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 4096;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (4 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op. Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Frame Drawing ───────────────────────────────────────────────────────────

/// Encode `frame` with its top-left corner at `(x, y)`.
///
/// Each line is drawn from column `x`, styles are switched only between
/// spans that differ, and the rest of each row is erased. Everything below
/// the frame is erased too, so a shorter frame fully replaces a taller one.
///
/// # Errors
///
/// Writing into an `OutputBuffer` does not fail; the `Result` comes from
/// the `Write` plumbing.
pub fn draw_frame(out: &mut OutputBuffer, frame: &Frame, x: u16, y: u16) -> io::Result<()> {
    ansi::begin_sync(out)?;

    let mut row = y;
    for line in frame.lines() {
        ansi::cursor_to(out, 0, row)?;
        ansi::clear_line_tail(out)?;
        ansi::cursor_to(out, x, row)?;

        let mut current = Style::PLAIN;
        for span in line.spans() {
            if span.style != current {
                ansi::style(out, span.style)?;
                current = span.style;
            }
            out.write_all(span.text.as_bytes())?;
        }
        if !current.is_plain() {
            ansi::reset(out)?;
        }

        row = row.saturating_add(1);
    }

    ansi::cursor_to(out, 0, row)?;
    ansi::clear_below(out)?;
    ansi::end_sync(out)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
