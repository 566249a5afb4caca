// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Blocking key reader — stdin bytes in, key events out.
//
// The game has exactly one suspension point: waiting for the next key. So
// unlike a free-running UI loop there is no background thread and no tick;
// the reader blocks in `read()` until the terminal sends something, feeds
// the bytes to the input parser, and hands back one key at a time.
//
// The single exception to "block forever" is the ESC ambiguity. When the
// parser is holding a partial sequence, the reader polls stdin for a short
// window. If nothing arrives, the pending bytes are flushed as literal keys
// (a lone ESC becomes the Escape key).

use std::collections::VecDeque;
use std::io;

use crate::input::{KeyEvent, Parser};

/// Bytes read per `read()` call. A keypress is 1-6 bytes; a burst of
/// held-down arrow keys is rarely more than a few hundred.
const READ_BUF_SIZE: usize = 1024;

/// How long to wait for the rest of an escape sequence (milliseconds).
pub const ESCAPE_TIMEOUT_MS: i32 = 25;

// ─── Byte Sources ────────────────────────────────────────────────────────────

/// Where the reader gets its bytes.
pub trait ByteSource {
    /// Block until at least one byte is available, then read. `Ok(0)`
    /// means end of input.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying source. `Interrupted` is retried
    /// by the reader.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Wait up to `timeout_ms` for input. Returns whether a read would
    /// not block.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying source.
    fn wait(&mut self, timeout_ms: i32) -> io::Result<bool>;
}

/// The process's standard input, read through the raw file descriptor.
///
/// Going around `io::stdin()` matters: its internal buffer would swallow
/// bytes that `poll()` then can't see.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdin;

#[cfg(unix)]
impl ByteSource for Stdin {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        let n = n as usize;
        Ok(n)
    }

    fn wait(&mut self, timeout_ms: i32) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            // A signal during the wait is just "nothing yet".
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        Ok(ready > 0)
    }
}

/// Non-unix fallback: plain blocking reads, no escape timeout.
#[cfg(not(unix))]
impl ByteSource for Stdin {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::Read;
        io::stdin().lock().read(buf)
    }

    fn wait(&mut self, _timeout_ms: i32) -> io::Result<bool> {
        Ok(true)
    }
}

// ─── KeyReader ───────────────────────────────────────────────────────────────

/// Blocking reader of key events.
///
/// # Example
///
/// ```no_run
/// use t48_term::reader::KeyReader;
///
/// let mut keys = KeyReader::stdin();
/// while let Some(key) = keys.next_key()? {
///     println!("{key:?}");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct KeyReader<S: ByteSource> {
    source: S,
    parser: Parser,
    /// Keys parsed but not yet handed out.
    queue: VecDeque<KeyEvent>,
    eof: bool,
}

impl KeyReader<Stdin> {
    /// A reader over the process's standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(Stdin)
    }
}

impl<S: ByteSource> KeyReader<S> {
    /// A reader over any byte source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: Parser::new(),
            queue: VecDeque::new(),
            eof: false,
        }
    }

    /// Block until the next key. Returns `None` once input has ended and
    /// every buffered key has been returned.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if let Some(key) = self.queue.pop_front() {
                return Ok(Some(key));
            }
            if self.eof {
                return Ok(None);
            }

            if self.parser.has_pending() && !self.source.wait(ESCAPE_TIMEOUT_MS)? {
                self.queue.extend(self.parser.flush());
                continue;
            }

            let n = match self.source.read_bytes(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if n == 0 {
                self.eof = true;
                self.queue.extend(self.parser.flush());
            } else {
                self.queue.extend(self.parser.advance(&buf[..n]));
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, Modifiers};
    use pretty_assertions::assert_eq;

    /// Serves pre-split chunks, one per read. `wait` reports whether
    /// another chunk is queued, so an empty queue plays the part of a
    /// timed-out poll.
    struct Chunks {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Chunks {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| Ok(c.to_vec())).collect(),
            }
        }
    }

    impl ByteSource for Chunks {
        fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }

        fn wait(&mut self, _timeout_ms: i32) -> io::Result<bool> {
            Ok(!self.chunks.is_empty())
        }
    }

    fn drain(reader: &mut KeyReader<Chunks>) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        while let Some(key) = reader.next_key().unwrap() {
            keys.push(key);
        }
        keys
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    #[test]
    fn reads_keys_in_order() {
        let mut r = KeyReader::new(Chunks::new(&[b"wa", b"\x1b[B"]));
        assert_eq!(
            drain(&mut r),
            vec![
                key(KeyCode::Char('w')),
                key(KeyCode::Char('a')),
                key(KeyCode::Down),
            ]
        );
    }

    #[test]
    fn eof_is_none_and_sticky() {
        let mut r = KeyReader::new(Chunks::new(&[]));
        assert_eq!(r.next_key().unwrap(), None);
        assert_eq!(r.next_key().unwrap(), None);
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut r = KeyReader::new(Chunks::new(&[b"\x1b", b"[1;5", b"A"]));
        assert_eq!(
            drain(&mut r),
            vec![KeyEvent::with(KeyCode::Up, Modifiers::CTRL)]
        );
    }

    #[test]
    fn lone_escape_flushes_after_timeout() {
        // Nothing follows the ESC, so the wait times out.
        let mut r = KeyReader::new(Chunks::new(&[b"\x1b"]));
        assert_eq!(r.next_key().unwrap(), Some(key(KeyCode::Escape)));
        assert_eq!(r.next_key().unwrap(), None);
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut source = Chunks::new(&[b"q"]);
        source
            .chunks
            .push_front(Err(io::Error::from(io::ErrorKind::Interrupted)));
        let mut r = KeyReader::new(source);
        assert_eq!(r.next_key().unwrap(), Some(key(KeyCode::Char('q'))));
    }

    #[test]
    fn other_errors_propagate() {
        let mut source = Chunks::new(&[]);
        source
            .chunks
            .push_back(Err(io::Error::from(io::ErrorKind::BrokenPipe)));
        let mut r = KeyReader::new(source);
        assert_eq!(
            r.next_key().unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }

    #[test]
    fn escape_timeout_is_short() {
        assert!((10..=100).contains(&ESCAPE_TIMEOUT_MS));
    }
}
