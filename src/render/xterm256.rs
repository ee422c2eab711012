//! Full-fidelity color engine.
//!
//! Emits truecolor SGR directly from the host's RGB values, so it needs no
//! color table at all.

use std::fs::File;
use std::io;

use unicode_width::UnicodeWidthStr;

use super::attrs::CellAttrs;
use super::sequences::SequenceWriter;
use super::RenderEngine;

pub struct Xterm256Engine {
    writer: SequenceWriter,
    /// Tracked peer cursor, unknown until the first explicit move.
    cursor: Option<(u16, u16)>,
    /// Last rendition emitted to the peer.
    attrs: Option<CellAttrs>,
}

impl Xterm256Engine {
    pub fn new(transport: File) -> Self {
        Self {
            writer: SequenceWriter::new(transport),
            cursor: None,
            attrs: None,
        }
    }
}

impl RenderEngine for Xterm256Engine {
    fn name(&self) -> &'static str {
        "xterm-256color"
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        if self.cursor == Some((col, row)) {
            return Ok(());
        }
        self.writer.cursor_position(col, row)?;
        self.cursor = Some((col, row));
        Ok(())
    }

    fn set_attributes(&mut self, attrs: &CellAttrs) -> io::Result<()> {
        if self.attrs.as_ref() == Some(attrs) {
            return Ok(());
        }
        let mut params = vec![0];
        params.extend(attrs.flags.sgr_params());
        if let Some(fg) = attrs.fg {
            params.extend([38, 2, fg.r as u16, fg.g as u16, fg.b as u16]);
        }
        if let Some(bg) = attrs.bg {
            params.extend([48, 2, bg.r as u16, bg.g as u16, bg.b as u16]);
        }
        self.writer.sgr(&params)?;
        self.attrs = Some(*attrs);
        Ok(())
    }

    fn paint_text(&mut self, text: &str) -> io::Result<()> {
        self.writer.text(text)?;
        if let Some((col, row)) = self.cursor {
            let advance = UnicodeWidthStr::width(text) as u16;
            self.cursor = Some((col.saturating_add(advance), row));
        }
        Ok(())
    }

    fn erase_display(&mut self) -> io::Result<()> {
        self.writer.erase_display()
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.writer.cursor_visible(visible)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::attrs::{AttrFlags, Rgb};
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vtbridge-x256-{}-{}", name, std::process::id()))
    }

    fn painted(path: &PathBuf, body: impl FnOnce(&mut Xterm256Engine)) -> Vec<u8> {
        let mut engine = Xterm256Engine::new(File::create(path).unwrap());
        body(&mut engine);
        engine.end_frame().unwrap();
        drop(engine);
        let bytes = std::fs::read(path).unwrap();
        std::fs::remove_file(path).unwrap();
        bytes
    }

    #[test]
    fn emits_truecolor_sgr() {
        let path = scratch("truecolor");
        let bytes = painted(&path, |e| {
            let attrs = CellAttrs {
                fg: Some(Rgb::new(255, 128, 0)),
                bg: Some(Rgb::new(0, 0, 0)),
                flags: AttrFlags::BOLD,
            };
            e.set_attributes(&attrs).unwrap();
            e.paint_text("hi").unwrap();
        });
        assert_eq!(bytes, b"\x1b[0;1;38;2;255;128;0;48;2;0;0;0mhi");
    }

    #[test]
    fn redundant_moves_and_attributes_are_suppressed() {
        let path = scratch("dedup");
        let bytes = painted(&path, |e| {
            e.move_cursor(2, 1).unwrap();
            e.move_cursor(2, 1).unwrap();
            e.set_attributes(&CellAttrs::default()).unwrap();
            e.set_attributes(&CellAttrs::default()).unwrap();
        });
        assert_eq!(bytes, b"\x1b[2;3H\x1b[0m");
    }

    #[test]
    fn painting_advances_the_tracked_cursor() {
        let path = scratch("advance");
        let bytes = painted(&path, |e| {
            e.move_cursor(0, 0).unwrap();
            e.paint_text("ab").unwrap();
            // The peer cursor already sits at column 2.
            e.move_cursor(2, 0).unwrap();
            e.paint_text("c").unwrap();
        });
        assert_eq!(bytes, b"\x1b[1;1Habc");
    }
}
