//! Bridge coordination.
//!
//! [`VtIo`] ties the pieces together: it resolves the requested mode, opens
//! the two transports an external launcher prepared, builds the input
//! decoder and the matching output engine, and hands both over to the host
//! in one start call. Initialization is all-or-nothing; a host that never
//! configures a bridge pays nothing for it.

pub mod mode;
pub mod transport;

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::config::ColorTable;
use crate::error::{Result, StartStatus, VtIoError};
use crate::input::{EventSink, InputAgent};
use crate::render::{CompositeRenderer, RenderEngine, TelnetEngine, Xterm256Engine, XtermEngine};
use mode::VtMode;

enum State {
    Unconfigured,
    Ready {
        mode: VtMode,
        input: InputAgent,
        engine: Box<dyn RenderEngine>,
    },
    Running {
        mode: VtMode,
        input: InputAgent,
    },
}

/// The bridge between the host's screen/input model and the terminal peer.
pub struct VtIo {
    state: State,
}

impl Default for VtIo {
    fn default() -> Self {
        Self::new()
    }
}

impl VtIo {
    pub fn new() -> Self {
        Self {
            state: State::Unconfigured,
        }
    }

    /// Resolve the mode, open both transports, and construct both agents.
    ///
    /// All-or-nothing: on any failure the bridge remains unconfigured and
    /// every handle acquired so far is released. The mode is resolved before
    /// either transport is touched. Decoded input events will be published
    /// through `sink`; the engine consumes the output transport.
    pub fn initialize(
        &mut self,
        input_name: &Path,
        output_name: &Path,
        mode_text: &str,
        colors: &ColorTable,
        sink: EventSink,
    ) -> Result<()> {
        if !matches!(self.state, State::Unconfigured) {
            return Err(VtIoError::Internal("bridge already initialized"));
        }

        let mode: VtMode = mode_text.parse()?;
        let input_transport = transport::open_input(input_name)?;
        let output_transport = transport::open_output(output_name)?;

        let input = InputAgent::new(input_transport, sink);
        let engine = build_engine(mode, output_transport, colors)?;

        info!(?mode, "VT bridge initialized");
        self.state = State::Ready {
            mode,
            input,
            engine,
        };
        Ok(())
    }

    /// Whether a bridge was configured on this host instance.
    pub fn is_using_vt(&self) -> bool {
        !matches!(self.state, State::Unconfigured)
    }

    /// The resolved mode, or the sentinel when nothing is configured.
    pub fn mode(&self) -> VtMode {
        match &self.state {
            State::Unconfigured => VtMode::Unresolved,
            State::Ready { mode, .. } | State::Running { mode, .. } => *mode,
        }
    }

    /// Whether the input decoder's read loop is alive.
    pub fn input_running(&self) -> bool {
        match &self.state {
            State::Running { input, .. } => input.is_running(),
            _ => false,
        }
    }

    /// Register the output engine with the host's renderer and start the
    /// input decoder's read loop.
    ///
    /// A host that never configured a bridge gets `NotConfigured` and no
    /// side effects. Starting twice is a sequencing error. If the renderer
    /// rejects the engine the bridge stays ready and can be started again
    /// against a healthy renderer; if the input thread cannot be spawned the
    /// bridge is torn down and a caller must re-initialize from scratch.
    pub fn start_if_needed(&mut self, renderer: &mut CompositeRenderer) -> Result<StartStatus> {
        match std::mem::replace(&mut self.state, State::Unconfigured) {
            State::Unconfigured => Ok(StartStatus::NotConfigured),
            State::Running { mode, input } => {
                self.state = State::Running { mode, input };
                Err(VtIoError::Internal("bridge already running"))
            }
            State::Ready {
                mode,
                mut input,
                engine,
            } => {
                if let Err(engine) = renderer.register(engine) {
                    self.state = State::Ready {
                        mode,
                        input,
                        engine,
                    };
                    return Err(VtIoError::Internal(
                        "composite renderer rejected registration",
                    ));
                }
                input.start()?;
                info!(?mode, "VT bridge running");
                self.state = State::Running { mode, input };
                Ok(StartStatus::Started)
            }
        }
    }
}

/// Construct the protocol engine for `mode`, consuming the output transport.
///
/// The indexed variants need the host color table for their index mapping;
/// the full-fidelity variant does not.
fn build_engine(
    mode: VtMode,
    output: File,
    colors: &ColorTable,
) -> Result<Box<dyn RenderEngine>> {
    match mode {
        VtMode::Xterm256 => Ok(Box::new(Xterm256Engine::new(output))),
        VtMode::Xterm => Ok(Box::new(XtermEngine::new(output, colors.clone()))),
        VtMode::Telnet => Ok(Box::new(TelnetEngine::new(output, colors.clone()))),
        // Unreachable after a successful resolve; kept as an invariant check.
        VtMode::Unresolved => Err(VtIoError::Internal("engine requested for unresolved mode")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vtbridge-io-{}-{}", name, std::process::id()))
    }

    fn seeded(name: &str, content: &[u8]) -> PathBuf {
        let path = scratch(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn invalid_mode_fails_before_any_transport_is_opened() {
        let mut vtio = VtIo::new();
        let (sink, _rx) = EventSink::channel();
        // Both names are bogus; resolution must fail first.
        let err = vtio
            .initialize(
                Path::new("/nonexistent/in"),
                Path::new("/nonexistent/out"),
                "vt52",
                &ColorTable::default(),
                sink,
            )
            .unwrap_err();
        assert!(matches!(err, VtIoError::InvalidArgument(_)));
        assert!(!vtio.is_using_vt());
        assert_eq!(vtio.mode(), VtMode::Unresolved);
    }

    #[test]
    fn missing_input_endpoint_fails_with_platform_code() {
        let out = seeded("miss-out", b"");
        let mut vtio = VtIo::new();
        let (sink, _rx) = EventSink::channel();
        let err = vtio
            .initialize(
                Path::new("/nonexistent/vtbridge-in"),
                &out,
                "default",
                &ColorTable::default(),
                sink,
            )
            .unwrap_err();
        assert!(matches!(err, VtIoError::IoFailure(_)));
        assert!(err.os_code().unwrap_or(0) != 0);
        assert!(!vtio.is_using_vt());
        std::fs::remove_file(&out).unwrap();
    }

    #[test]
    fn unconfigured_bridge_start_is_a_no_op() {
        let mut vtio = VtIo::new();
        let mut renderer = CompositeRenderer::new();
        assert_eq!(
            vtio.start_if_needed(&mut renderer).unwrap(),
            StartStatus::NotConfigured
        );
        assert_eq!(renderer.engine_count(), 0);
    }

    #[test]
    fn full_lifecycle_registers_one_engine_and_starts_one_decoder() {
        let input = seeded("life-in", b"\x1b[B");
        let output = seeded("life-out", b"");
        let mut vtio = VtIo::new();
        let (sink, rx) = EventSink::channel();

        vtio.initialize(&input, &output, "xterm-256color", &ColorTable::default(), sink)
            .unwrap();
        assert!(vtio.is_using_vt());
        assert_eq!(vtio.mode(), VtMode::Xterm256);

        let mut renderer = CompositeRenderer::new();
        assert_eq!(
            vtio.start_if_needed(&mut renderer).unwrap(),
            StartStatus::Started
        );
        assert_eq!(renderer.engine_count(), 1);

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            InputEvent::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE))
        );

        // Double start is a sequencing error and registers nothing new.
        assert!(matches!(
            vtio.start_if_needed(&mut renderer),
            Err(VtIoError::Internal(_))
        ));
        assert_eq!(renderer.engine_count(), 1);

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn rejected_registration_leaves_the_bridge_ready() {
        let input = seeded("rej-in", b"");
        let output = seeded("rej-out", b"");
        let mut vtio = VtIo::new();
        let (sink, _rx) = EventSink::channel();

        vtio.initialize(&input, &output, "xterm", &ColorTable::default(), sink)
            .unwrap();

        let mut dead = CompositeRenderer::new();
        dead.shutdown();
        assert!(matches!(
            vtio.start_if_needed(&mut dead),
            Err(VtIoError::Internal(_))
        ));
        assert!(vtio.is_using_vt());

        let mut healthy = CompositeRenderer::new();
        assert_eq!(
            vtio.start_if_needed(&mut healthy).unwrap(),
            StartStatus::Started
        );
        assert_eq!(healthy.engine_count(), 1);

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn reinitializing_a_configured_bridge_is_refused() {
        let input = seeded("reinit-in", b"");
        let output = seeded("reinit-out", b"");
        let mut vtio = VtIo::new();
        let (sink, _rx) = EventSink::channel();
        vtio.initialize(&input, &output, "telnet", &ColorTable::default(), sink)
            .unwrap();

        let (sink2, _rx2) = EventSink::channel();
        assert!(matches!(
            vtio.initialize(&input, &output, "telnet", &ColorTable::default(), sink2),
            Err(VtIoError::Internal(_))
        ));

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn engine_factory_refuses_the_sentinel_mode() {
        let output = seeded("factory-out", b"");
        let transport = transport::open_output(&output).unwrap();
        let err =
            build_engine(VtMode::Unresolved, transport, &ColorTable::default()).err();
        assert!(matches!(err, Some(VtIoError::Internal(_))));
        std::fs::remove_file(&output).unwrap();
    }
}
