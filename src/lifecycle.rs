//! Process shutdown shared by the socket, the prompt, scripts and Ctrl-C.

use crate::scripting::AppControl;
use std::path::{Path, PathBuf};

/// Exits the process after removing the control socket file.
#[derive(Debug, Clone, Default)]
pub struct ProcessControl {
    socket_path: Option<PathBuf>,
    silent: bool,
}

impl ProcessControl {
    pub fn new(socket_path: Option<PathBuf>, silent: bool) -> Self {
        Self {
            socket_path,
            silent,
        }
    }

    /// Remove the socket file so the next server start can bind again.
    pub fn release_socket(&self) {
        if let Some(path) = &self.socket_path {
            remove_socket(path);
        }
    }

    pub fn install_ctrlc_handler(&self) -> anyhow::Result<()> {
        let control = self.clone();
        ctrlc::set_handler(move || control.shutdown(0))?;
        Ok(())
    }
}

fn remove_socket(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed control socket"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(path = %path.display(), "failed to remove socket: {err}"),
    }
}

impl AppControl for ProcessControl {
    fn shutdown(&self, code: i32) {
        self.release_socket();
        if !self.silent {
            tracing::info!(code, "shutdown server");
        }
        std::process::exit(code);
    }
}
