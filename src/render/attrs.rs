//! Shared paint types.
//!
//! The host's screen model hands engines colors as 24-bit RGB plus a set of
//! text attribute flags; each engine decides how much of that survives on
//! its wire.

use bitflags::bitflags;

/// 24-bit color as the host's screen model carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

bitflags! {
    /// Text rendition flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u16 {
        const BOLD          = 0b0000_0000_0001;
        const DIM           = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERLINE     = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const INVERSE       = 0b0000_0010_0000;
        const HIDDEN        = 0b0000_0100_0000;
        const STRIKETHROUGH = 0b0000_1000_0000;
    }
}

impl AttrFlags {
    /// SGR parameters for the set flags, in ascending SGR order.
    pub fn sgr_params(&self) -> Vec<u16> {
        const TABLE: [(AttrFlags, u16); 8] = [
            (AttrFlags::BOLD, 1),
            (AttrFlags::DIM, 2),
            (AttrFlags::ITALIC, 3),
            (AttrFlags::UNDERLINE, 4),
            (AttrFlags::BLINK, 5),
            (AttrFlags::INVERSE, 7),
            (AttrFlags::HIDDEN, 8),
            (AttrFlags::STRIKETHROUGH, 9),
        ];
        TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, param)| *param)
            .collect()
    }
}

/// Colors and flags for one run of text. `None` means the peer's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub flags: AttrFlags,
}

impl CellAttrs {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
