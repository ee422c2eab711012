//! Configuration and color table management.
//!
//! This module provides:
//! - TOML configuration file loading from `~/.vtbridge/config.toml`
//! - Built-in 16-entry color tables (campbell, vga, solarized-dark)
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.vtbridge/config.toml`:
//!
//! ```toml
//! # VT mode: xterm-256color, xterm, telnet, default
//! mode = "default"
//!
//! # Color table for the indexed-color modes: campbell, vga, solarized-dark
//! colors = "campbell"
//!
//! [transport]
//! input = "/run/host/vt-in"
//! output = "/run/host/vt-out"
//! ```
//!
//! Command-line flags override the file; the file overrides the built-in
//! defaults.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::Rgb;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Requested VT mode literal, handed verbatim to the resolver.
    pub mode: String,
    /// Color table name for the indexed-color engines.
    pub colors: String,
    /// Transport endpoint names.
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "default".to_string(),
            colors: "campbell".to_string(),
            transport: TransportConfig::default(),
        }
    }
}

/// Transport endpoint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub input: Option<String>,
    pub output: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::get_config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let dir = home.join(".vtbridge");
            if !dir.exists() {
                let _ = fs::create_dir_all(&dir);
            }
            return Some(dir.join("config.toml"));
        }
        None
    }

    /// Get the color table
    pub fn color_table(&self) -> ColorTable {
        ColorTable::by_name(&self.colors)
    }
}

/// Host color table: the 16 indexed colors the indexed engines map against.
#[derive(Debug, Clone)]
pub struct ColorTable {
    pub name: String,
    colors: [Rgb; 16],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::campbell()
    }
}

impl ColorTable {
    /// The Campbell table, the modern console default.
    pub fn campbell() -> Self {
        Self {
            name: "campbell".to_string(),
            colors: [
                Rgb::new(0x0C, 0x0C, 0x0C),
                Rgb::new(0xC5, 0x0F, 0x1F),
                Rgb::new(0x13, 0xA1, 0x0E),
                Rgb::new(0xC1, 0x9C, 0x00),
                Rgb::new(0x00, 0x37, 0xDA),
                Rgb::new(0x88, 0x17, 0x98),
                Rgb::new(0x3A, 0x96, 0xDD),
                Rgb::new(0xCC, 0xCC, 0xCC),
                Rgb::new(0x76, 0x76, 0x76),
                Rgb::new(0xE7, 0x48, 0x56),
                Rgb::new(0x16, 0xC6, 0x0C),
                Rgb::new(0xF9, 0xF1, 0xA5),
                Rgb::new(0x3B, 0x78, 0xFF),
                Rgb::new(0xB4, 0x00, 0x9E),
                Rgb::new(0x61, 0xD6, 0xD6),
                Rgb::new(0xF2, 0xF2, 0xF2),
            ],
        }
    }

    /// Classic VGA table.
    pub fn vga() -> Self {
        Self {
            name: "vga".to_string(),
            colors: [
                Rgb::new(0x00, 0x00, 0x00),
                Rgb::new(0xAA, 0x00, 0x00),
                Rgb::new(0x00, 0xAA, 0x00),
                Rgb::new(0xAA, 0x55, 0x00),
                Rgb::new(0x00, 0x00, 0xAA),
                Rgb::new(0xAA, 0x00, 0xAA),
                Rgb::new(0x00, 0xAA, 0xAA),
                Rgb::new(0xAA, 0xAA, 0xAA),
                Rgb::new(0x55, 0x55, 0x55),
                Rgb::new(0xFF, 0x55, 0x55),
                Rgb::new(0x55, 0xFF, 0x55),
                Rgb::new(0xFF, 0xFF, 0x55),
                Rgb::new(0x55, 0x55, 0xFF),
                Rgb::new(0xFF, 0x55, 0xFF),
                Rgb::new(0x55, 0xFF, 0xFF),
                Rgb::new(0xFF, 0xFF, 0xFF),
            ],
        }
    }

    /// Solarized Dark ANSI table.
    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark".to_string(),
            colors: [
                Rgb::new(0x07, 0x36, 0x42),
                Rgb::new(0xDC, 0x32, 0x2F),
                Rgb::new(0x85, 0x99, 0x00),
                Rgb::new(0xB5, 0x89, 0x00),
                Rgb::new(0x26, 0x8B, 0xD2),
                Rgb::new(0xD3, 0x36, 0x82),
                Rgb::new(0x2A, 0xA1, 0x98),
                Rgb::new(0xEE, 0xE8, 0xD5),
                Rgb::new(0x00, 0x2B, 0x36),
                Rgb::new(0xCB, 0x4B, 0x16),
                Rgb::new(0x58, 0x6E, 0x75),
                Rgb::new(0x65, 0x7B, 0x83),
                Rgb::new(0x83, 0x94, 0x96),
                Rgb::new(0x6C, 0x71, 0xC4),
                Rgb::new(0x93, 0xA1, 0xA1),
                Rgb::new(0xFD, 0xF6, 0xE3),
            ],
        }
    }

    /// Get table by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "vga" => Self::vga(),
            "solarized-dark" | "solarized_dark" => Self::solarized_dark(),
            _ => Self::campbell(),
        }
    }

    /// List available tables
    pub fn list() -> Vec<&'static str> {
        vec!["campbell", "vga", "solarized-dark"]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Table entry for an index; indexes wrap at the table size.
    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize % self.colors.len()]
    }

    /// Nearest table index by squared RGB distance.
    pub fn nearest(&self, rgb: Rgb) -> u8 {
        let mut best = 0u8;
        let mut best_distance = u32::MAX;
        for (index, entry) in self.colors.iter().enumerate() {
            let dr = rgb.r as i32 - entry.r as i32;
            let dg = rgb.g as i32 - entry.g as i32;
            let db = rgb.b as i32 - entry.b as i32;
            let distance = (dr * dr + dg * dg + db * db) as u32;
            if distance < best_distance {
                best_distance = distance;
                best = index as u8;
            }
        }
        best
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            mode = "xterm"

            [transport]
            input = "/tmp/vt-in"
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, "xterm");
        assert_eq!(config.colors, "campbell");
        assert_eq!(config.transport.input.as_deref(), Some("/tmp/vt-in"));
        assert_eq!(config.transport.output, None);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.mode, "default");
        assert_eq!(config.transport.input, None);
    }

    #[test]
    fn by_name_falls_back_to_campbell() {
        assert_eq!(ColorTable::by_name("vga").name, "vga");
        assert_eq!(ColorTable::by_name("no-such-table").name, "campbell");
        assert_eq!(ColorTable::by_name("SOLARIZED-DARK").name, "solarized-dark");
    }

    #[test]
    fn nearest_finds_exact_entries() {
        let table = ColorTable::vga();
        for index in 0..16u8 {
            assert_eq!(table.nearest(table.color(index)), index);
        }
    }

    #[test]
    fn nearest_maps_off_palette_colors() {
        let table = ColorTable::vga();
        // Near-black goes to black, near-white to bright white.
        assert_eq!(table.nearest(Rgb::new(10, 10, 10)), 0);
        assert_eq!(table.nearest(Rgb::new(250, 250, 250)), 15);
    }

    #[test]
    fn table_has_sixteen_entries() {
        assert_eq!(ColorTable::campbell().len(), 16);
    }
}
