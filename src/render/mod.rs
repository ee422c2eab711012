//! Output rendering.
//!
//! [`RenderEngine`] is the contract between the host's render pump and a
//! protocol-specific output engine; [`CompositeRenderer`] is the host-side
//! fan-out that drives every registered engine from one screen change.

mod attrs;
mod sequences;
mod telnet;
mod xterm;
mod xterm256;

use std::io;

use tracing::info;

pub use attrs::{AttrFlags, CellAttrs, Rgb};
pub use sequences::SequenceWriter;
pub use telnet::TelnetEngine;
pub use xterm::XtermEngine;
pub use xterm256::Xterm256Engine;

/// Protocol-specific output engine driven by the composite renderer.
///
/// An engine owns exactly one write transport. Paint calls arrive between
/// `begin_frame` and `end_frame`; nothing is guaranteed to reach the peer
/// until the frame ends.
pub trait RenderEngine: Send {
    /// Wire name, for logs.
    fn name(&self) -> &'static str;

    fn begin_frame(&mut self) -> io::Result<()>;

    /// Place the peer cursor at a zero-based cell position.
    fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()>;

    /// Select the rendition for subsequent text.
    fn set_attributes(&mut self, attrs: &CellAttrs) -> io::Result<()>;

    /// Paint a run of text at the current position.
    fn paint_text(&mut self, text: &str) -> io::Result<()>;

    /// Erase the peer's whole display.
    fn erase_display(&mut self) -> io::Result<()>;

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    /// Flush the frame to the peer.
    fn end_frame(&mut self) -> io::Result<()>;
}

/// The host's fan-out renderer.
///
/// Owns every registered engine and mirrors each paint call to all of them.
/// Registration is refused once the renderer has shut down; the rejected
/// engine is handed back so the caller keeps ownership.
#[derive(Default)]
pub struct CompositeRenderer {
    engines: Vec<Box<dyn RenderEngine>>,
    shut_down: bool,
}

impl CompositeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine; the renderer drives it on every frame from here
    /// on. Returns the engine back if the renderer is no longer accepting.
    pub fn register(
        &mut self,
        engine: Box<dyn RenderEngine>,
    ) -> Result<(), Box<dyn RenderEngine>> {
        if self.shut_down {
            return Err(engine);
        }
        info!(engine = engine.name(), "render engine registered");
        self.engines.push(engine);
        Ok(())
    }

    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Drop every engine and refuse further registration.
    pub fn shutdown(&mut self) {
        self.engines.clear();
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn begin_frame(&mut self) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.begin_frame()?;
        }
        Ok(())
    }

    pub fn move_cursor(&mut self, col: u16, row: u16) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.move_cursor(col, row)?;
        }
        Ok(())
    }

    pub fn set_attributes(&mut self, attrs: &CellAttrs) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.set_attributes(attrs)?;
        }
        Ok(())
    }

    pub fn paint_text(&mut self, text: &str) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.paint_text(text)?;
        }
        Ok(())
    }

    pub fn erase_display(&mut self) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.erase_display()?;
        }
        Ok(())
    }

    pub fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.set_cursor_visible(visible)?;
        }
        Ok(())
    }

    pub fn end_frame(&mut self) -> io::Result<()> {
        for engine in &mut self.engines {
            engine.end_frame()?;
        }
        Ok(())
    }
}
