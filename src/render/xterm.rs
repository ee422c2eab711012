//! Indexed 16-color engine.
//!
//! The host paints in 24-bit RGB; this engine folds every color onto the
//! host's 16-entry table and emits classic SGR indexes, bright variants
//! through the 90/100 range.

use std::fs::File;
use std::io;

use unicode_width::UnicodeWidthStr;

use super::attrs::CellAttrs;
use super::sequences::SequenceWriter;
use super::RenderEngine;
use crate::config::ColorTable;

pub struct XtermEngine {
    writer: SequenceWriter,
    table: ColorTable,
    cursor: Option<(u16, u16)>,
    attrs: Option<CellAttrs>,
}

impl XtermEngine {
    pub fn new(transport: File, table: ColorTable) -> Self {
        Self {
            writer: SequenceWriter::new(transport),
            table,
            cursor: None,
            attrs: None,
        }
    }
}

impl RenderEngine for XtermEngine {
    fn name(&self) -> &'static str {
        "xterm"
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
            let index = self.table.nearest(fg);
            params.push(if index < 8 {
                30 + index as u16
            } else {
                90 + (index - 8) as u16
            });
        }
        if let Some(bg) = attrs.bg {
            let index = self.table.nearest(bg);
            params.push(if index < 8 {
                40 + index as u16
            } else {
                100 + (index - 8) as u16
            });
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
