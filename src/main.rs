//! vtbridge - VT/ANSI bridge between a console host and a terminal peer
//!
//! This binary is a minimal host around the bridge: it opens the two
//! transport endpoints named on the command line (or in the config file),
//! starts the bridge, and echoes every decoded input event back to the peer
//! through the composite renderer until the peer closes its stream.
//!
//! # Quick Start
//!
//! ```text
//! vtbridge --in /run/host/vt-in --out /run/host/vt-out
//! vtbridge --in IN --out OUT --mode xterm --colors vga
//! ```
//!
//! Both endpoints must already exist; vtbridge never creates them. Running
//! with no endpoints configured is legal and exits after reporting that no
//! bridge was configured.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use vtbridge::{
    CellAttrs, ColorTable, CompositeRenderer, Config, EventSink, InputEvent, StartStatus, VtIo,
};

/// Command-line arguments
#[derive(Default)]
struct Args {
    /// Input transport endpoint name
    input: Option<PathBuf>,
    /// Output transport endpoint name
    output: Option<PathBuf>,
    /// Requested VT mode literal
    mode: Option<String>,
    /// Color table name
    colors: Option<String>,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("vtbridge {}", VERSION);
}

fn print_help() {
    eprintln!(
        "vtbridge {} - VT/ANSI bridge between a console host and a terminal peer",
        VERSION
    );
    eprintln!();
    eprintln!("Usage: vtbridge [OPTIONS]");
    eprintln!();
    eprintln!("Transport options:");
    eprintln!("  -i, --in <NAME>       Input endpoint (peer -> host), must exist");
    eprintln!("  -o, --out <NAME>      Output endpoint (host -> peer), must exist");
    eprintln!();
    eprintln!("Protocol options:");
    eprintln!("  -m, --mode <MODE>     xterm-256color, xterm, telnet, default");
    eprintln!("  -t, --colors <NAME>   Color table: campbell, vga, solarized-dark");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.vtbridge/config.toml");
}

fn parse_args() -> Result<Args, String> {
    let argv: Vec<String> = env::args().collect();
    let mut args = Args::default();
    let mut i = 1;

    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-i" | "--in" => {
                i += 1;
                if i >= argv.len() {
                    return Err("Missing input endpoint argument".to_string());
                }
                args.input = Some(PathBuf::from(&argv[i]));
            }
            "-o" | "--out" => {
                i += 1;
                if i >= argv.len() {
                    return Err("Missing output endpoint argument".to_string());
                }
                args.output = Some(PathBuf::from(&argv[i]));
            }
            "-m" | "--mode" => {
                i += 1;
                if i >= argv.len() {
                    return Err("Missing mode argument".to_string());
                }
                args.mode = Some(argv[i].clone());
            }
            "-t" | "--colors" => {
                i += 1;
                if i >= argv.len() {
                    return Err("Missing color table argument".to_string());
                }
                args.colors = Some(argv[i].clone());
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(args)
}

fn init_logging() {
    let home = env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .map(PathBuf::from);

    let log_path = home
        .map(|h| h.join(".vtbridge").join("vtbridge.log"))
        .unwrap_or_else(|| PathBuf::from("vtbridge.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("vtbridge starting...");

    // Merge: command line overrides the config file.
    let config = Config::load();
    let mode = args.mode.unwrap_or_else(|| config.mode.clone());
    let colors = ColorTable::by_name(&args.colors.unwrap_or_else(|| config.colors.clone()));
    let input_name = args
        .input
        .or_else(|| config.transport.input.as_ref().map(PathBuf::from));
    let output_name = args
        .output
        .or_else(|| config.transport.output.as_ref().map(PathBuf::from));

    let (sink, events) = EventSink::channel();
    let mut renderer = CompositeRenderer::new();
    let mut vtio = VtIo::new();

    if let (Some(input_name), Some(output_name)) = (&input_name, &output_name) {
        info!(
            mode = %mode,
            input = %input_name.display(),
            output = %output_name.display(),
            "configuring bridge"
        );
        if let Err(e) = vtio.initialize(input_name, output_name, &mode, &colors, sink) {
            error!("bridge initialization failed: {}", e);
            return Err(e.into());
        }
    }

    match vtio.start_if_needed(&mut renderer)? {
        StartStatus::NotConfigured => {
            eprintln!("No transport endpoints configured; nothing to bridge.");
            return Ok(());
        }
        StartStatus::Started => {
            info!(mode = ?vtio.mode(), "bridge running");
        }
    }

    run_echo_pump(&vtio, &mut renderer, &events)?;

    renderer.shutdown();
    info!("vtbridge exiting");
    Ok(())
}

/// Paint every decoded event back to the peer, one per line.
fn run_echo_pump(
    vtio: &VtIo,
    renderer: &mut CompositeRenderer,
    events: &std::sync::mpsc::Receiver<InputEvent>,
) -> anyhow::Result<()> {
    let mut row: u16 = 0;

    loop {
        match events.recv_timeout(Duration::from_millis(250)) {
            Ok(event) => {
                let line = match &event {
                    InputEvent::Key(key) => format!("key: {:?} {:?}", key.code, key.modifiers),
                    InputEvent::Paste(text) => format!("paste: {} bytes", text.len()),
                    InputEvent::FocusGained => "focus gained".to_string(),
                    InputEvent::FocusLost => "focus lost".to_string(),
                };
                renderer.begin_frame()?;
                renderer.move_cursor(0, row)?;
                renderer.set_attributes(&CellAttrs::default())?;
                renderer.paint_text(&line)?;
                renderer.end_frame()?;
                row = row.saturating_add(1);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if !vtio.input_running() {
                    info!("peer closed the input stream");
                    break;
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
