use crate::settings::{FrontEnd, Settings};
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "neoframe.json";

#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "neoframe",
    version,
    about = "Transparent always-on-top canvas driven over a local socket"
)]
pub struct Cli {
    /// Run the overlay and listen for commands.
    #[arg(long)]
    pub server: bool,
    /// Print the canvas size and socket path.
    #[arg(long)]
    pub info: bool,
    #[arg(long)]
    pub silent: bool,
    /// Unix domain socket path.
    #[arg(long)]
    pub uds: Option<PathBuf>,
    /// Send one command to a running server and print the reply.
    #[arg(long)]
    pub cmd: Option<String>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Script run once at startup.
    #[arg(long)]
    pub script: Option<PathBuf>,
    /// Treat socket and prompt input as script source.
    #[arg(long)]
    pub script_commands: bool,
    #[arg(long)]
    pub font: Option<PathBuf>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long = "x", allow_hyphen_values = true)]
    pub x: Option<i32>,
    #[arg(long = "y", allow_hyphen_values = true)]
    pub y: Option<i32>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub bg_color: Option<String>,
    #[arg(long)]
    pub decorated: bool,
    #[arg(long)]
    pub no_passthrough: bool,
    #[arg(long)]
    pub no_prompt: bool,
    #[arg(long)]
    pub debug: bool,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Info,
    Server,
    Client(String),
    Usage,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
    }

    /// `--info` wins over `--server`, which wins over `--cmd`.
    pub fn mode(&self) -> Mode {
        if self.info {
            Mode::Info
        } else if self.server {
            Mode::Server
        } else if let Some(cmd) = self.cmd.as_ref().filter(|c| !c.is_empty()) {
            Mode::Client(cmd.clone())
        } else {
            Mode::Usage
        }
    }

    /// Overlay explicitly given flags onto settings loaded from file.
    pub fn apply(&self, settings: &mut Settings) {
        if self.silent {
            settings.silent = true;
        }
        if self.debug {
            settings.debug_logging = true;
        }
        if let Some(path) = &self.uds {
            settings.socket_path = path.clone();
        }
        if let Some(path) = &self.log_file {
            settings.log_file = Some(path.clone());
        }
        if let Some(path) = &self.script {
            settings.startup_script = Some(path.clone());
        }
        if self.script_commands {
            settings.front_end = FrontEnd::Script;
        }
        if self.no_prompt {
            settings.prompt = false;
        }
        if let Some(path) = &self.font {
            settings.font_path = Some(path.clone());
        }

        let window = &mut settings.window;
        if self.width.is_some() {
            window.width = self.width;
        }
        if self.height.is_some() {
            window.height = self.height;
        }
        if let Some(x) = self.x {
            window.x = x;
        }
        if let Some(y) = self.y {
            window.y = y;
        }
        if let Some(title) = &self.title {
            window.title = title.clone();
        }
        if let Some(color) = &self.bg_color {
            window.background_color = color.clone();
        }
        if self.decorated {
            window.decorated = true;
        }
        if self.no_passthrough {
            window.mouse_passthrough = false;
        }
    }
}
