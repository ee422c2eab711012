//! Input decoding.
//!
//! [`InputAgent`] owns the read transport, runs the decode loop on its own
//! thread, and publishes [`InputEvent`]s into the host's input queue through
//! an [`EventSink`]. The agent is handed its transport at construction and
//! started exactly once; from then on it runs until the peer closes the
//! stream.

pub mod parser;

use std::fs::File;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossterm::event::KeyEvent;
use tracing::{debug, error, info};

use crate::error::{Result, VtIoError};
use parser::InputParser;

/// Decoded input event published to the host's input queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
    FocusGained,
    FocusLost,
}

/// Producer half of the host's input queue.
///
/// Clonable and safe for concurrent producers; the host drains the matching
/// receiver on its own schedule.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<InputEvent>,
}

impl EventSink {
    /// Build a queue, returning the producer and consumer halves.
    pub fn channel() -> (EventSink, Receiver<InputEvent>) {
        let (tx, rx) = mpsc::channel();
        (EventSink { tx }, rx)
    }

    /// Publish one event. Returns false once the consumer is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Reads protocol bytes from its owned transport and publishes decoded
/// events until the stream ends.
pub struct InputAgent {
    transport: Option<File>,
    sink: EventSink,
    running: Arc<AtomicBool>,
    /// Kept so the read loop has an owner; the host never joins it.
    #[allow(dead_code)]
    thread: Option<JoinHandle<()>>,
}

impl InputAgent {
    /// Take ownership of the read transport. Nothing is read until
    /// [`start`](Self::start).
    pub fn new(transport: File, sink: EventSink) -> Self {
        Self {
            transport: Some(transport),
            sink,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Start the dedicated read loop. Single-shot: a second call fails.
    pub fn start(&mut self) -> Result<()> {
        let transport = self
            .transport
            .take()
            .ok_or(VtIoError::Internal("input agent already started"))?;
        self.running.store(true, Ordering::SeqCst);

        let running = self.running.clone();
        let sink = self.sink.clone();
        let handle = thread::Builder::new()
            .name("vt-input".to_string())
            .spawn(move || read_loop(transport, sink, running))?;
        self.thread = Some(handle);

        info!("input decoder started");
        Ok(())
    }

    /// Whether the read loop is still alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn read_loop(mut transport: File, sink: EventSink, running: Arc<AtomicBool>) {
    let mut parser = InputParser::new();
    let mut buffer = vec![0u8; 4096];

    loop {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match transport.read(&mut buffer) {
            Ok(0) => {
                debug!("input transport reached end of stream");
                break;
            }
            Ok(n) => {
                let mut disconnected = false;
                for event in parser.feed(&buffer[..n]) {
                    if !sink.send(event) {
                        disconnected = true;
                        break;
                    }
                }
                if disconnected {
                    debug!("input queue consumer is gone");
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("input transport read failed: {}", e);
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vtbridge-agent-{}-{}", name, std::process::id()))
    }

    #[test]
    fn agent_publishes_decoded_events_until_eof() {
        let path = scratch("events");
        std::fs::write(&path, b"a\x1b[A").unwrap();

        let (sink, rx) = EventSink::channel();
        let transport = crate::bridge::transport::open_input(&path).unwrap();
        let mut agent = InputAgent::new(transport, sink);
        agent.start().unwrap();

        let timeout = Duration::from_secs(2);
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            InputEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
        );
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            InputEvent::Key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE))
        );

        // EOF ends the loop shortly after the last event.
        for _ in 0..50 {
            if !agent.is_running() {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(!agent.is_running());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn double_start_is_refused() {
        let path = scratch("double");
        std::fs::write(&path, b"").unwrap();

        let (sink, _rx) = EventSink::channel();
        let transport = crate::bridge::transport::open_input(&path).unwrap();
        let mut agent = InputAgent::new(transport, sink);
        agent.start().unwrap();

        match agent.start() {
            Err(VtIoError::Internal(_)) => {}
            other => panic!("expected Internal error, got {other:?}"),
        }
        std::fs::remove_file(&path).unwrap();
    }
}
