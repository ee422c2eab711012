//! Transport acquisition.
//!
//! Opens the two byte-stream endpoints that an external launcher created and
//! connected before this process started. Nothing here creates an endpoint,
//! listens on one, or waits for one to appear: a missing name is a hard
//! failure carrying the OS error, and the caller decides what to do with it.
//!
//! Both handles are opened for exclusive, blocking access. Ownership of the
//! returned handle moves into whichever agent is constructed around it; this
//! module keeps no copy.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use tracing::debug;

/// Open the input endpoint for blocking, read-only access.
pub fn open_input(name: &Path) -> io::Result<File> {
    debug!(name = %name.display(), "opening input transport");
    let mut opts = OpenOptions::new();
    opts.read(true);
    deny_sharing(&mut opts);
    opts.open(name)
}

/// Open the output endpoint for blocking, write-only access.
pub fn open_output(name: &Path) -> io::Result<File> {
    debug!(name = %name.display(), "opening output transport");
    let mut opts = OpenOptions::new();
    opts.write(true);
    deny_sharing(&mut opts);
    opts.open(name)
}

// Share mode 0 keeps the pipe end ours alone. Unix endpoints have no share
// mode; the plain open already has the right semantics there.
#[cfg(windows)]
fn deny_sharing(opts: &mut OpenOptions) {
    use std::os::windows::fs::OpenOptionsExt;
    opts.share_mode(0);
}

#[cfg(not(windows))]
fn deny_sharing(_opts: &mut OpenOptions) {}
