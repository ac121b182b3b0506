use std::path::Path;
use std::process::{Command, Stdio};

/// Best-effort launch of the platform's default viewer for `path`.
///
/// Returns `false` when no viewer could be started; callers only log that.
pub fn open_in_viewer(path: &Path) -> bool {
    let mut command = viewer_command(path);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    match command.spawn() {
        Ok(_) => {
            tracing::debug!(path = %path.display(), "launched viewer");
            true
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not open viewer");
            false
        }
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
