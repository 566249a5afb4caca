// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, alternate screen, and restore on exit.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and a
// raw write(2) for the panic path have no safe std equivalent. Each unsafe
// block wraps exactly one call.
#![allow(unsafe_code)]
//
// Two layers:
//
//   RawMode  — saved termios + the raw settings derived from it. Restores
//              the saved copy when dropped. Knows nothing about the screen.
//   Terminal — RawMode plus the alternate screen and hidden cursor. This is
//              what the binary holds for the lifetime of a game.
//
// A panic while the game owns the terminal would leave the shell unechoed
// and stuck on the alternate screen. The panic hook writes a fixed restore
// sequence straight to fd 1 (the stdout lock may be held by the frame that
// panicked) and puts back the termios kept in a process-wide backup.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

/// Assumed size when stdout is not a terminal.
const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Whether a `width × height` block fits.
    #[inline]
    #[must_use]
    pub const fn fits(self, width: usize, height: usize) -> bool {
        width <= self.cols as usize && height <= self.rows as usize
    }
}

/// Current size of the terminal on stdout, or `None` if stdout is not a
/// terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    // SAFETY: winsize is plain old data; ioctl fills it or fails.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub const fn get_size() -> Option<Size> {
    None
}

/// Whether stdin is a terminal. Raw mode is only attempted when it is.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub const fn is_tty() -> bool {
    false
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Settings for unbuffered, unechoed, byte-at-a-time input.
///
/// The `cfmakeraw(3)` recipe with one choice spelled out: `ISIG` is off, so
/// Ctrl-C reaches the game as a key instead of killing it mid-frame.
/// `VMIN = 1, VTIME = 0` makes `read()` block until a byte arrives.
#[cfg(unix)]
#[must_use]
pub fn raw_termios(mut t: libc::termios) -> libc::termios {
    t.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    t.c_cflag &= !(libc::CSIZE | libc::PARENB);
    t.c_cflag |= libc::CS8;
    t.c_cc[libc::VMIN] = 1;
    t.c_cc[libc::VTIME] = 0;
    t
}

/// Termios to put back if the process panics in raw mode.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn set_saved_termios(t: Option<libc::termios>) {
    if let Ok(mut saved) = SAVED_TERMIOS.lock() {
        *saved = t;
    }
}

#[cfg(unix)]
fn tcsetattr(t: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, t) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Stdin in raw mode for as long as this value lives.
///
/// When stdin is not a terminal (pipes, tests) nothing is changed and
/// dropping is a no-op.
pub struct RawMode {
    #[cfg(unix)]
    saved: Option<libc::termios>,
}

impl RawMode {
    /// Switch stdin to raw mode.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the current settings cannot be read or the
    /// raw ones cannot be applied.
    #[cfg(unix)]
    pub fn enable() -> io::Result<Self> {
        if !is_tty() {
            return Ok(Self { saved: None });
        }

        // SAFETY: termios is plain old data; tcgetattr fills it or fails.
        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        set_saved_termios(Some(saved));
        tcsetattr(&raw_termios(saved))?;
        Ok(Self { saved: Some(saved) })
    }

    /// Raw mode is a no-op off unix.
    ///
    /// # Errors
    ///
    /// Never fails.
    #[cfg(not(unix))]
    pub const fn enable() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Put the saved settings back. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the settings cannot be applied.
    pub fn restore(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        if let Some(saved) = self.saved.take() {
            set_saved_termios(None);
            tcsetattr(&saved)?;
        }
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ─── Panic Hook ─────────────────────────────────────────────────────────────

/// End synchronized output, reset SGR, show the cursor, then leave the
/// alternate screen. Leaving comes last so the shell reappears clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[0m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

/// Chain a terminal restore in front of the existing panic hook, so the
/// panic message lands on the normal screen.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_emergency_restore();

            #[cfg(unix)]
            if let Ok(saved) = SAVED_TERMIOS.lock() {
                if let Some(t) = saved.as_ref() {
                    let _ = tcsetattr(t);
                }
            }

            previous(info);
        }));
    });
}

fn write_emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The terminal, owned by the game.
///
/// [`enter`](Self::enter) puts stdin in raw mode and switches stdout to a
/// blank alternate screen with the cursor hidden. [`leave`](Self::leave)
/// (or dropping the handle, or a panic) undoes all of it.
///
/// ```no_run
/// use t48_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // draw frames, read keys
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
}

impl Terminal {
    /// A handle on the current terminal, not yet entered. The size falls
    /// back to 80×24 when stdout is not a terminal.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` leaves room for platform setup.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            raw: None,
            size: get_size().unwrap_or(FALLBACK_SIZE),
        })
    }

    /// Size when the handle was created.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Whether the game currently owns the screen.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.raw.is_some()
    }

    /// Take over the terminal. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled or stdout fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }

        install_panic_hook();
        let raw = RawMode::enable()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        self.raw = Some(raw);
        Ok(())
    }

    /// Give the terminal back. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout fails or the saved settings cannot be
    /// applied.
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(mut raw) = self.raw.take() else {
            return Ok(());
        };

        {
            let mut out = io::stdout().lock();
            ansi::end_sync(&mut out)?;
            ansi::reset(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }

        raw.restore()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
