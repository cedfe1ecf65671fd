//! Front ends feeding raw input lines into the active interpreter.
//!
//! Exactly one interpreter is active per process, chosen by
//! [`FrontEnd`](crate::settings::FrontEnd): either the drawing command
//! protocol or the embedded script runtime.

pub mod prompt;
#[cfg(unix)]
pub mod socket;

pub use prompt::{run_prompt, spawn_stdin_prompt};
#[cfg(unix)]
pub use socket::{send_command, ControlServer};

use crate::command::{CommandInterpreter, Outcome, REPLY_OK};
use crate::scripting::{AppControl, ScriptBridge};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Backend {
    Commands(CommandInterpreter),
    Script(ScriptBridge),
}

/// Text sent back to whoever delivered a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// The caller should deliver `text` and then shut the process down.
    pub shutdown: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shutdown: false,
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    backend: Backend,
    app: Arc<dyn AppControl>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn commands(interpreter: CommandInterpreter, app: Arc<dyn AppControl>) -> Self {
        Self {
            backend: Backend::Commands(interpreter),
            app,
        }
    }

    pub fn script(bridge: ScriptBridge, app: Arc<dyn AppControl>) -> Self {
        Self {
            backend: Backend::Script(bridge),
            app,
        }
    }

    pub fn app(&self) -> &Arc<dyn AppControl> {
        &self.app
    }

    /// Run one input line and produce the reply text.
    pub fn dispatch(&self, line: &str) -> Reply {
        tracing::info!("received command: {}", line.trim_end());
        match &self.backend {
            Backend::Commands(interpreter) => match interpreter.execute(line) {
                Ok(Outcome::Done) => Reply::text(REPLY_OK),
                Ok(Outcome::Shutdown) => Reply {
                    text: REPLY_OK.to_string(),
                    shutdown: true,
                },
                Err(err) => {
                    tracing::warn!("failed to run command: {err}");
                    Reply::text(err.to_string())
                }
            },
            Backend::Script(bridge) => match bridge.run(line) {
                Ok(value) if value.is_unit() => Reply::text(REPLY_OK),
                Ok(value) => Reply::text(value.to_string()),
                Err(err) => {
                    tracing::warn!("script error: {err}");
                    Reply::text(err.to_string())
                }
            },
        }
    }
}
