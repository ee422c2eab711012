//! Low-level escape-sequence emission.
//!
//! Every engine owns one `SequenceWriter` wrapped around its write
//! transport. The writer buffers until the engine ends its frame, so a
//! frame reaches the peer as one write burst rather than a byte at a time.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub struct SequenceWriter {
    out: BufWriter<File>,
    scratch: String,
}

impl SequenceWriter {
    pub fn new(transport: File) -> Self {
        Self {
            out: BufWriter::new(transport),
            scratch: String::with_capacity(32),
        }
    }

    /// Write a run of text verbatim.
    pub fn text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    /// Write raw bytes verbatim.
    pub fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    /// CSI sequence with numeric parameters and a final byte.
    pub fn csi(&mut self, params: &[u16], final_byte: char) -> io::Result<()> {
        self.scratch.clear();
        self.scratch.push_str("\x1b[");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.scratch.push(';');
            }
            // Writing an integer into a String cannot fail.
            let _ = write!(self.scratch, "{param}");
        }
        self.scratch.push(final_byte);
        self.out.write_all(self.scratch.as_bytes())
    }

    /// Select graphic rendition.
    pub fn sgr(&mut self, params: &[u16]) -> io::Result<()> {
        self.csi(params, 'm')
    }

    /// Absolute cursor position, zero-based cell coordinates.
    pub fn cursor_position(&mut self, col: u16, row: u16) -> io::Result<()> {
        // CUP parameters are one-based, row first.
        self.csi(&[row.saturating_add(1), col.saturating_add(1)], 'H')
    }

    /// Erase the whole display.
    pub fn erase_display(&mut self) -> io::Result<()> {
        self.csi(&[2], 'J')
    }

    /// DECTCEM cursor visibility.
    pub fn cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        let seq: &[u8] = if visible { b"\x1b[?25h" } else { b"\x1b[?25l" };
        self.out.write_all(seq)
    }

    /// Push buffered bytes to the peer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
