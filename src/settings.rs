use crate::color::{parse_color, Color};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Which interpreter receives lines from the socket and the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontEnd {
    /// The fixed drawing command protocol.
    Commands,
    /// Every line is script source for the embedded runtime.
    Script,
}

impl Default for FrontEnd {
    fn default() -> Self {
        FrontEnd::Commands
    }
}

impl std::fmt::Display for FrontEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontEnd::Commands => write!(f, "commands"),
            FrontEnd::Script => write!(f, "script"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindowSettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// Canvas width in pixels. Falls back to [`DEFAULT_WIDTH`] when unset.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub decorated: bool,
    /// `RRGGBB` or `RRGGBBAA`. A fully transparent color gives a see-through
    /// window.
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_true")]
    pub mouse_passthrough: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: None,
            height: None,
            x: 0,
            y: 0,
            decorated: false,
            background_color: default_background(),
            mouse_passthrough: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Path of the unix domain control socket.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
    /// Terse output for `--info` and warnings-only logging.
    #[serde(default)]
    pub silent: bool,
    /// When enabled the logger starts at debug level and honours `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of every log line.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub front_end: FrontEnd,
    /// Read commands from stdin while the server runs.
    #[serde(default = "default_true")]
    pub prompt: bool,
    /// Every line typed at the prompt is appended here. `null` disables it.
    #[serde(default = "default_history_file")]
    pub history_file: Option<PathBuf>,
    /// Script executed once before any front end accepts input.
    #[serde(default)]
    pub startup_script: Option<PathBuf>,
    /// TTF/OTF font for `drawText`. A system font is searched when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Delay between presenter frames.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub window: WindowSettings,
}

fn default_socket_path() -> PathBuf {
    std::env::temp_dir().join("neoframe.sock")
}

fn default_history_file() -> Option<PathBuf> {
    Some(std::env::temp_dir().join("neoframe.history"))
}

fn default_title() -> String {
    "NeoFrame".into()
}

fn default_background() -> String {
    "00000000".into()
}

fn default_true() -> bool {
    true
}

fn default_frame_interval() -> u64 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            silent: false,
            debug_logging: false,
            log_file: None,
            front_end: FrontEnd::default(),
            prompt: true,
            history_file: default_history_file(),
            startup_script: None,
            font_path: None,
            frame_interval_ms: default_frame_interval(),
            window: WindowSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("invalid settings file {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (
            self.window.width.unwrap_or(DEFAULT_WIDTH),
            self.window.height.unwrap_or(DEFAULT_HEIGHT),
        )
    }

    pub fn background(&self) -> anyhow::Result<Color> {
        parse_color(&self.window.background_color)
            .with_context(|| format!("invalid background color {}", self.window.background_color))
    }

    /// The window is only created see-through when nothing opaque is painted
    /// behind the layers.
    pub fn transparent_window(&self) -> bool {
        self.background().map(|c| c.is_transparent()).unwrap_or(true)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.background()?;
        let (width, height) = self.canvas_size();
        if width == 0 || height == 0 {
            bail!("canvas size must be non-zero, got {width}x{height}");
        }
        if self.frame_interval_ms == 0 {
            bail!("frame_interval_ms must be at least 1");
        }
        Ok(())
    }
}
