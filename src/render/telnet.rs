//! Telnet-negotiated VT engine.
//!
//! The lowest common denominator of the three wires: eight SGR colors with
//! brightness degraded to bold, CRLF line discipline, and none of the
//! private-mode sequences older Telnet peers choke on.

use std::fs::File;
use std::io;

use unicode_width::UnicodeWidthStr;

use super::attrs::CellAttrs;
use super::sequences::SequenceWriter;
use super::RenderEngine;
use crate::config::ColorTable;

pub struct TelnetEngine {
    writer: SequenceWriter,
    table: ColorTable,
    cursor: Option<(u16, u16)>,
    attrs: Option<CellAttrs>,
}

impl TelnetEngine {
    pub fn new(transport: File, table: ColorTable) -> Self {
        Self {
            writer: SequenceWriter::new(transport),
            table,
            cursor: None,
            attrs: None,
        }
    }
}

impl RenderEngine for TelnetEngine {
    fn name(&self) -> &'static str {
        "telnet"
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        if self.cursor == Some((col, row)) {
            return Ok(());
        }
        // A move to the start of the next line is a plain CRLF on this wire.
        if col == 0 && self.cursor.map(|(_, r)| r.saturating_add(1)) == Some(row) {
            self.writer.raw(b"\r\n")?;
        } else {
            self.writer.cursor_position(col, row)?;
        }
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
            let index = self.table.nearest(fg);
            if index >= 8 && !params.contains(&1) {
                params.push(1);
            }
            params.push(30 + (index % 8) as u16);
        }
        if let Some(bg) = attrs.bg {
            let index = self.table.nearest(bg);
            params.push(40 + (index % 8) as u16);
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

    fn set_cursor_visible(&mut self, _visible: bool) -> io::Result<()> {
        // DECTCEM is a private mode; Telnet peers do not get it.
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
