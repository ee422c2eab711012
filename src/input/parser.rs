//! VT input sequence parser.
//!
//! Decodes the byte stream arriving from the terminal peer into input
//! events. The state machine is incremental: a multi-byte sequence may
//! arrive split across reads and still decodes correctly. Unrecognized
//! sequences are consumed and dropped so they can never corrupt the
//! decoding of what follows.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use super::InputEvent;

#[derive(Clone, Copy, Default, PartialEq)]
enum State {
    #[default]
    Ground,
    Escape,
    Csi,
    Ss3,
    Paste,
}

pub struct InputParser {
    state: State,
    params: Vec<u16>,
    current: Option<u16>,
    pending_utf8: Vec<u8>,
    paste: Vec<u8>,
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InputParser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: Vec::with_capacity(4),
            current: None,
            pending_utf8: Vec::with_capacity(4),
            paste: Vec::new(),
        }
    }

    /// Feed a chunk of bytes, returning every event it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.step(byte, &mut events);
        }
        // A chunk ending on a bare ESC is the Escape key; a peer sends the
        // rest of a real sequence in the same burst.
        if self.state == State::Escape {
            events.push(key(KeyCode::Esc, KeyModifiers::NONE));
            self.state = State::Ground;
        }
        events
    }

    fn step(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        match self.state {
            State::Ground => self.ground(byte, events),
            State::Escape => self.escape(byte, events),
            State::Csi => self.csi(byte, events),
            State::Ss3 => self.ss3(byte, events),
            State::Paste => self.paste_byte(byte, events),
        }
    }

    fn ground(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        if byte >= 0x80 || !self.pending_utf8.is_empty() {
            self.utf8(byte, events);
            return;
        }
        match byte {
            0x1B => self.state = State::Escape,
            0x0D | 0x0A => events.push(key(KeyCode::Enter, KeyModifiers::NONE)),
            0x09 => events.push(key(KeyCode::Tab, KeyModifiers::NONE)),
            0x7F => events.push(key(KeyCode::Backspace, KeyModifiers::NONE)),
            0x00 => events.push(key(KeyCode::Char(' '), KeyModifiers::CONTROL)),
            0x01..=0x1A => {
                let ch = (b'a' + byte - 1) as char;
                events.push(key(KeyCode::Char(ch), KeyModifiers::CONTROL));
            }
            0x1C..=0x1F => {
                let ch = ['\\', ']', '^', '_'][(byte - 0x1C) as usize];
                events.push(key(KeyCode::Char(ch), KeyModifiers::CONTROL));
            }
            _ => events.push(key(KeyCode::Char(byte as char), KeyModifiers::NONE)),
        }
    }

    fn utf8(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        self.pending_utf8.push(byte);
        let expected = match self.pending_utf8[0] {
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            // Stray continuation byte or invalid lead.
            _ => 1,
        };
        if self.pending_utf8.len() < expected {
            return;
        }
        if let Ok(text) = std::str::from_utf8(&self.pending_utf8) {
            for ch in text.chars() {
                events.push(key(KeyCode::Char(ch), KeyModifiers::NONE));
            }
        } else {
            trace!(bytes = ?self.pending_utf8, "dropping malformed UTF-8");
        }
        self.pending_utf8.clear();
    }

    fn escape(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        match byte {
            b'[' => {
                self.params.clear();
                self.current = None;
                self.state = State::Csi;
            }
            b'O' => self.state = State::Ss3,
            // ESC ESC: one Escape key, still waiting on the second.
            0x1B => events.push(key(KeyCode::Esc, KeyModifiers::NONE)),
            0x7F => {
                events.push(key(KeyCode::Backspace, KeyModifiers::ALT));
                self.state = State::Ground;
            }
            0x01..=0x1A if !matches!(byte, 0x09 | 0x0A | 0x0D) => {
                let ch = (b'a' + byte - 1) as char;
                events.push(key(
                    KeyCode::Char(ch),
                    KeyModifiers::CONTROL | KeyModifiers::ALT,
                ));
                self.state = State::Ground;
            }
            0x20..=0x7E => {
                events.push(key(KeyCode::Char(byte as char), KeyModifiers::ALT));
                self.state = State::Ground;
            }
            _ => {
                events.push(key(KeyCode::Esc, KeyModifiers::NONE));
                self.state = State::Ground;
                self.ground(byte, events);
            }
        }
    }

    fn csi(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        match byte {
            b'0'..=b'9' => {
                let digit = (byte - b'0') as u16;
                let value = self.current.unwrap_or(0);
                self.current = Some(value.saturating_mul(10).saturating_add(digit));
            }
            b';' | b':' => self.params.push(self.current.take().unwrap_or(0)),
            // Private markers and intermediates carry nothing we decode.
            0x20..=0x2F | b'<'..=b'?' => {}
            0x40..=0x7E => {
                if let Some(value) = self.current.take() {
                    self.params.push(value);
                }
                self.state = State::Ground;
                self.dispatch_csi(byte, events);
                self.params.clear();
            }
            _ => {
                trace!(byte, "malformed CSI input");
                self.params.clear();
                self.current = None;
                self.state = State::Ground;
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8, events: &mut Vec<InputEvent>) {
        let modifiers = self
            .params
            .get(1)
            .copied()
            .map(decode_modifiers)
            .unwrap_or(KeyModifiers::NONE);
        match final_byte {
            b'A' => events.push(key(KeyCode::Up, modifiers)),
            b'B' => events.push(key(KeyCode::Down, modifiers)),
            b'C' => events.push(key(KeyCode::Right, modifiers)),
            b'D' => events.push(key(KeyCode::Left, modifiers)),
            b'H' => events.push(key(KeyCode::Home, modifiers)),
            b'F' => events.push(key(KeyCode::End, modifiers)),
            b'Z' => events.push(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            b'I' => events.push(InputEvent::FocusGained),
            b'O' => events.push(InputEvent::FocusLost),
            b'~' => self.tilde(modifiers, events),
            _ => trace!(final_byte, "unhandled CSI input"),
        }
    }

    fn tilde(&mut self, modifiers: KeyModifiers, events: &mut Vec<InputEvent>) {
        let code = match self.params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            4 | 8 => KeyCode::End,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F((n - 10) as u8),
            n @ 17..=21 => KeyCode::F((n - 11) as u8),
            n @ 23..=24 => KeyCode::F((n - 12) as u8),
            200 => {
                self.paste.clear();
                self.state = State::Paste;
                return;
            }
            // 201 with no paste in flight, or anything else we don't speak.
            other => {
                trace!(param = other, "unhandled tilde key");
                return;
            }
        };
        events.push(key(code, modifiers));
    }

    fn ss3(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        self.state = State::Ground;
        let code = match byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P'..=b'S' => KeyCode::F(1 + byte - b'P'),
            other => {
                trace!(other, "unhandled SS3 input");
                return;
            }
        };
        events.push(key(code, KeyModifiers::NONE));
    }

    fn paste_byte(&mut self, byte: u8, events: &mut Vec<InputEvent>) {
        const END_MARK: &[u8] = b"\x1b[201~";
        self.paste.push(byte);
        if self.paste.ends_with(END_MARK) {
            self.paste.truncate(self.paste.len() - END_MARK.len());
            let text = String::from_utf8_lossy(&self.paste).into_owned();
            events.push(InputEvent::Paste(text));
            self.paste.clear();
            self.state = State::Ground;
        }
    }
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
    InputEvent::Key(KeyEvent::new(code, modifiers))
}

fn decode_modifiers(param: u16) -> KeyModifiers {
    let bits = param.saturating_sub(1);
    let mut modifiers = KeyModifiers::NONE;
    if bits & 1 != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if bits & 2 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if bits & 4 != 0 {
        modifiers |= KeyModifiers::CONTROL;
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(parser: &mut InputParser, bytes: &[u8]) -> Vec<InputEvent> {
        parser.feed(bytes)
    }

    fn k(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
        key(code, modifiers)
    }

    #[test]
    fn plain_text_decodes_per_character() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"hi"),
            vec![
                k(KeyCode::Char('h'), KeyModifiers::NONE),
                k(KeyCode::Char('i'), KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn control_characters_decode() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, &[0x03, 0x0D, 0x09, 0x7F]),
            vec![
                k(KeyCode::Char('c'), KeyModifiers::CONTROL),
                k(KeyCode::Enter, KeyModifiers::NONE),
                k(KeyCode::Tab, KeyModifiers::NONE),
                k(KeyCode::Backspace, KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn csi_arrows_with_and_without_modifiers() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[A\x1b[1;5C"),
            vec![
                k(KeyCode::Up, KeyModifiers::NONE),
                k(KeyCode::Right, KeyModifiers::CONTROL),
            ]
        );
    }

    #[test]
    fn alt_prefixed_keys_decode() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1bf"),
            vec![k(KeyCode::Char('f'), KeyModifiers::ALT)]
        );
    }

    #[test]
    fn bare_escape_is_the_escape_key() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b"),
            vec![k(KeyCode::Esc, KeyModifiers::NONE)]
        );
    }

    #[test]
    fn ss3_function_keys_decode() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1bOP\x1bOS"),
            vec![
                k(KeyCode::F(1), KeyModifiers::NONE),
                k(KeyCode::F(4), KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn tilde_keys_decode_with_modifiers() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[3~\x1b[15~\x1b[5;3~"),
            vec![
                k(KeyCode::Delete, KeyModifiers::NONE),
                k(KeyCode::F(5), KeyModifiers::NONE),
                k(KeyCode::PageUp, KeyModifiers::ALT),
            ]
        );
    }

    #[test]
    fn shift_tab_decodes_as_backtab() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[Z"),
            vec![k(KeyCode::BackTab, KeyModifiers::SHIFT)]
        );
    }

    #[test]
    fn focus_reports_decode() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[I\x1b[O"),
            vec![InputEvent::FocusGained, InputEvent::FocusLost]
        );
    }

    #[test]
    fn bracketed_paste_collects_text() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[200~two\r\nlines\x1b[201~"),
            vec![InputEvent::Paste("two\r\nlines".to_string())]
        );
    }

    #[test]
    fn paste_survives_split_reads() {
        let mut parser = InputParser::new();
        assert!(keys(&mut parser, b"\x1b[200~par").is_empty());
        assert_eq!(
            keys(&mut parser, b"tial\x1b[201~x"),
            vec![
                InputEvent::Paste("partial".to_string()),
                k(KeyCode::Char('x'), KeyModifiers::NONE),
            ]
        );
    }

    #[test]
    fn utf8_survives_split_reads() {
        let mut parser = InputParser::new();
        assert!(keys(&mut parser, &[0xC3]).is_empty());
        assert_eq!(
            keys(&mut parser, &[0xA9]),
            vec![k(KeyCode::Char('é'), KeyModifiers::NONE)]
        );
    }

    #[test]
    fn unknown_csi_does_not_corrupt_following_input() {
        let mut parser = InputParser::new();
        assert_eq!(
            keys(&mut parser, b"\x1b[38;5q!"),
            vec![k(KeyCode::Char('!'), KeyModifiers::NONE)]
        );
    }
}
