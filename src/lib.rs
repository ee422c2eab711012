//! vtbridge: a bidirectional VT/ANSI bridge between a console host and an
//! external terminal peer.
//!
//! The host talks to the peer over two byte-stream transports that an
//! external launcher created ahead of time: the peer's output arrives on the
//! input transport as VT sequences and is decoded into host input events,
//! while the host's screen changes are rendered back to the peer on the
//! output transport in one of three wire variants.
//!
//! # Architecture
//!
//! - [`VtIo`]: the bridge coordinator. Resolves the requested mode, opens
//!   both transports, builds both agents, and starts them in one shot.
//! - [`InputAgent`]: owns the read transport and decodes peer bytes into
//!   [`InputEvent`]s on a dedicated thread.
//! - [`RenderEngine`]: the paint contract between the host's render pump
//!   and a protocol-specific output engine.
//! - [`CompositeRenderer`]: the host-side fan-out that drives every
//!   registered engine from a single screen change.
//! - [`Config`] / [`ColorTable`]: TOML configuration and the 16-entry
//!   tables the indexed-color engines map against.

pub mod bridge;
pub mod config;
pub mod error;
pub mod input;
pub mod render;

pub use bridge::mode::VtMode;
pub use bridge::VtIo;
pub use config::{ColorTable, Config};
pub use error::{Result, StartStatus, VtIoError};
pub use input::{EventSink, InputAgent, InputEvent};
pub use render::{AttrFlags, CellAttrs, CompositeRenderer, RenderEngine, Rgb};
