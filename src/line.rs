//! Line editor for console input
//!
//! Accumulates bytes until CR or LF and echoes what is typed.

use core::fmt::Write;

use crate::config::LINE_SIZE;

/// Outcome of feeding one byte to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// More input needed
    Pending,
    /// A line terminator was received, content available through `as_str`
    Complete,
    /// Line was discarded (Ctrl+C)
    Cancelled,
}

/// Console line input buffer
pub struct LineEditor {
    buf: [u8; LINE_SIZE],
    len: usize,
    /// Last byte was a CR: a following LF is the second half of a CRLF
    after_cr: bool,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
            after_cr: false,
        }
    }

    /// Process a single input byte, echoing it on `out`.
    /// On `Complete` the caller reads the line then calls `clear`.
    pub fn feed(&mut self, byte: u8, out: &mut dyn Write) -> LineEvent {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');
        match byte {
            b'\n' if after_cr => LineEvent::Pending,
            b'\r' | b'\n' => {
                let _ = write!(out, "\r\n");
                LineEvent::Complete
            }
            // Backspace / DEL
            0x08 | 0x7F => {
                if self.len > 0 {
                    self.len -= 1;
                    let _ = write!(out, "\x08 \x08");
                }
                LineEvent::Pending
            }
            // Ctrl+C
            0x03 => {
                let _ = write!(out, "^C\r\n");
                self.clear();
                LineEvent::Cancelled
            }
            0x20..=0x7E => {
                if self.len < LINE_SIZE {
                    self.buf[self.len] = byte;
                    self.len += 1;
                    let _ = out.write_char(byte as char);
                }
                LineEvent::Pending
            }
            _ => LineEvent::Pending,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Current content (printable ASCII only)
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}
