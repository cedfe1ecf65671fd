//! Unix domain socket control endpoint and the one-shot client.

use crate::dispatch::Dispatcher;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;

const READ_CHUNK: usize = 1024;

/// A bound listening socket. The socket file is left for the lifecycle
/// handle to remove on shutdown.
#[derive(Debug)]
pub struct ControlServer {
    listener: UnixListener,
    path: PathBuf,
}

impl ControlServer {
    /// Bind `path`, refusing to reuse a file left behind by another instance.
    pub fn bind(path: &Path) -> Result<Self> {
        if path.exists() {
            bail!(
                "Unix domain socket {} already exists, remove the file first",
                path.display()
            );
        }
        let listener = UnixListener::bind(path)
            .with_context(|| format!("failed to listen on {}", path.display()))?;
        tracing::info!(path = %path.display(), "control socket listening");
        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept connections on a background thread, one handler thread each.
    pub fn spawn(self, dispatcher: Dispatcher) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("neoframe-socket".into())
            .spawn(move || self.serve(dispatcher))
    }

    pub fn serve(self, dispatcher: Dispatcher) {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::warn!("failed to accept: {err}");
                    continue;
                }
            };
            let dispatcher = dispatcher.clone();
            let spawned = thread::Builder::new()
                .name("neoframe-conn".into())
                .spawn(move || {
                    if let Err(err) = handle_connection(stream, &dispatcher) {
                        tracing::warn!("connection closed with error: {err:#}");
                    }
                });
            if let Err(err) = spawned {
                tracing::error!("failed to start connection handler: {err}");
            }
        }
    }
}

/// Dispatch each newline-terminated command in order. A final line without
/// a terminator is still run once the peer closes its write half.
fn handle_connection(stream: UnixStream, dispatcher: &Dispatcher) -> Result<()> {
    let mut writer = stream.try_clone().context("failed to clone stream")?;
    let mut reader = BufReader::with_capacity(READ_CHUNK, stream);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).context("failed to read")? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        let command = text.trim_end_matches(['\n', '\r']);
        if command.trim().is_empty() {
            continue;
        }
        let reply = dispatcher.dispatch(command);
        writer
            .write_all(format!("{}\n", reply.text).as_bytes())
            .context("failed to write")?;
        if reply.shutdown {
            writer.flush().ok();
            dispatcher.app().shutdown(0);
            return Ok(());
        }
    }
}

/// Send one command to a running server and return its trimmed reply.
pub fn send_command(path: &Path, command: &str) -> Result<String> {
    let mut stream = UnixStream::connect(path)
        .with_context(|| format!("failed to dial {}", path.display()))?;
    stream
        .write_all(format!("{command}\n").as_bytes())
        .context("failed to write")?;
    let mut buf = [0u8; READ_CHUNK];
    let n = stream.read(&mut buf).context("failed to read")?;
    Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
}
