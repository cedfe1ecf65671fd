//! Line-oriented drawing command protocol.
//!
//! One command per line, tokens separated by any run of whitespace:
//!
//! ```text
//! shutdown
//! image <path>
//! image_at <path> <x> <y>
//! box <x> <y> <w> <h> <color>
//! pixel <x> <y> <color>
//! line <x1> <y1> <x2> <y2> <color>
//! grid <h-spacing> <v-spacing> <color>
//! clear | cls | clean
//! ```

use crate::assets;
use crate::canvas::{CanvasError, SharedCanvas};
use crate::color::{parse_color, Color, ColorParseError};
use std::path::PathBuf;
use std::str::FromStr;

pub const REPLY_OK: &str = "OK";
pub const LINE_THICKNESS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Shutdown,
    Image {
        path: PathBuf,
    },
    ImageAt {
        path: PathBuf,
        x: i32,
        y: i32,
    },
    Box {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    },
    Pixel {
        x: i32,
        y: i32,
        color: Color,
    },
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    },
    Grid {
        horizontal: i32,
        vertical: i32,
        color: Color,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandErrorKind {
    Arity {
        command: &'static str,
        requirement: &'static str,
    },
    InvalidNumber {
        field: &'static str,
        value: String,
    },
    Unknown {
        input: String,
    },
    MissingFile {
        path: PathBuf,
    },
    Failed {
        action: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub kind: CommandErrorKind,
}

impl CommandError {
    fn new(kind: CommandErrorKind) -> Self {
        Self { kind }
    }

    fn failed(action: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::new(CommandErrorKind::Failed {
            action: action.into(),
            reason: reason.to_string(),
        })
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CommandErrorKind::Arity {
                command,
                requirement,
            } => write!(f, "{command} command requires {requirement}"),
            CommandErrorKind::InvalidNumber { field, value } => {
                write!(f, "Invalid {field} value: {value}")
            }
            CommandErrorKind::Unknown { input } => write!(f, "Unknown command: {input}"),
            CommandErrorKind::MissingFile { path } => {
                write!(f, "File {} does not exist", path.display())
            }
            CommandErrorKind::Failed { action, reason } => {
                write!(f, "Failed to {action}: {reason}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

fn expect_args(
    args: &[&str],
    count: usize,
    command: &'static str,
    requirement: &'static str,
) -> Result<(), CommandError> {
    if args.len() != count {
        return Err(CommandError::new(CommandErrorKind::Arity {
            command,
            requirement,
        }));
    }
    Ok(())
}

fn number(field: &'static str, value: &str) -> Result<i32, CommandError> {
    value.parse::<i32>().map_err(|_| {
        CommandError::new(CommandErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
        })
    })
}

fn color_for(action: impl FnOnce() -> String, value: &str) -> Result<Color, CommandError> {
    parse_color(value).map_err(|e: ColorParseError| CommandError::failed(action(), e))
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let Some((name, args)) = tokens.split_first() else {
            return Err(unknown(input));
        };

        match *name {
            "shutdown" => Ok(Command::Shutdown),
            "clear" | "cls" | "clean" => Ok(Command::Clear),
            "image" => {
                expect_args(args, 1, "image", "a file name")?;
                Ok(Command::Image {
                    path: PathBuf::from(args[0]),
                })
            }
            "image_at" => {
                expect_args(args, 3, "image_at", "a file name, x and y")?;
                Ok(Command::ImageAt {
                    path: PathBuf::from(args[0]),
                    x: number("x", args[1])?,
                    y: number("y", args[2])?,
                })
            }
            "box" => {
                expect_args(args, 5, "box", "x, y, width, height and color")?;
                let x = number("x", args[0])?;
                let y = number("y", args[1])?;
                let width = number("width", args[2])?;
                let height = number("height", args[3])?;
                let color = color_for(|| format!("draw box at {x}, {y}"), args[4])?;
                Ok(Command::Box {
                    x,
                    y,
                    width,
                    height,
                    color,
                })
            }
            "pixel" => {
                expect_args(args, 3, "pixel", "x, y and color")?;
                let x = number("x", args[0])?;
                let y = number("y", args[1])?;
                let color = color_for(|| format!("draw pixel at {x}, {y}"), args[2])?;
                Ok(Command::Pixel { x, y, color })
            }
            "line" => {
                expect_args(args, 5, "line", "x1, y1, x2, y2 and color")?;
                let x1 = number("x1", args[0])?;
                let y1 = number("y1", args[1])?;
                let x2 = number("x2", args[2])?;
                let y2 = number("y2", args[3])?;
                let color = color_for(
                    || format!("draw line from {x1}, {y1} to {x2}, {y2}"),
                    args[4],
                )?;
                Ok(Command::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                })
            }
            "grid" => {
                expect_args(
                    args,
                    3,
                    "grid",
                    "size horizontal, size vertical and color",
                )?;
                let horizontal = number("horizontal size", args[0])?;
                let vertical = number("vertical size", args[1])?;
                let color = color_for(|| "draw grid".to_string(), args[2])?;
                Ok(Command::Grid {
                    horizontal,
                    vertical,
                    color,
                })
            }
            _ => Err(unknown(input)),
        }
    }
}

fn unknown(input: &str) -> CommandError {
    CommandError::new(CommandErrorKind::Unknown {
        input: input.trim_end_matches(['\r', '\n']).to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Shutdown,
}

/// Applies parsed commands to the shared canvas.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    canvas: SharedCanvas,
}

impl CommandInterpreter {
    pub fn new(canvas: SharedCanvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &SharedCanvas {
        &self.canvas
    }

    pub fn execute(&self, line: &str) -> Result<Outcome, CommandError> {
        let command = Command::parse(line)?;
        tracing::debug!(?command, "executing command");
        self.apply(command)
    }

    /// Run one command. On error the canvas is left untouched.
    pub fn apply(&self, command: Command) -> Result<Outcome, CommandError> {
        match command {
            Command::Shutdown => return Ok(Outcome::Shutdown),
            Command::Image { path } => {
                let image = read_image(&path, "load image")?;
                self.canvas.with(|c| c.replace_with_image(&image));
            }
            Command::ImageAt { path, x, y } => {
                let image = read_image(&path, &format!("set image at {x}, {y}"))?;
                self.canvas.with(|c| c.blit_image(&image, x, y));
            }
            Command::Box {
                x,
                y,
                width,
                height,
                color,
            } => self.canvas.with(|c| c.draw_box(x, y, width, height, color)),
            Command::Pixel { x, y, color } => self.canvas.with(|c| c.set_pixel(x, y, color)),
            Command::Line {
                x1,
                y1,
                x2,
                y2,
                color,
            } => self
                .canvas
                .with(|c| c.draw_line(x1, y1, x2, y2, LINE_THICKNESS, color)),
            Command::Grid {
                horizontal,
                vertical,
                color,
            } => self
                .canvas
                .with(|c| c.draw_grid(horizontal, vertical, color))
                .map_err(|e: CanvasError| CommandError::failed("draw grid", e))?,
            Command::Clear => self.canvas.with(|c| c.clear()),
        }
        Ok(Outcome::Done)
    }
}

/// Decode before touching the canvas so a bad file never leaves a partial
/// blit behind.
fn read_image(
    path: &std::path::Path,
    action: &str,
) -> Result<crate::canvas::PixelBuffer, CommandError> {
    if !path.exists() {
        return Err(CommandError::new(CommandErrorKind::MissingFile {
            path: path.to_path_buf(),
        }));
    }
    assets::load_image(path).map_err(|e| CommandError::failed(action, format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn interpreter() -> CommandInterpreter {
        CommandInterpreter::new(SharedCanvas::new(Canvas::new(64, 64).unwrap()))
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(
            Command::parse("  pixel\t1   2  FF0000 \r\n"),
            Ok(Command::Pixel {
                x: 1,
                y: 2,
                color: Color::RED
            })
        );
    }

    #[test]
    fn clear_aliases_are_equivalent() {
        for alias in ["clear", "cls", "clean"] {
            assert_eq!(Command::parse(alias), Ok(Command::Clear));
        }
    }

    #[test]
    fn arity_errors_name_the_requirement() {
        let err = Command::parse("box 1 2 3 FF0000").unwrap_err();
        assert_eq!(
            err.to_string(),
            "box command requires x, y, width, height and color"
        );
        let err = Command::parse("image").unwrap_err();
        assert_eq!(err.to_string(), "image command requires a file name");
    }

    #[test]
    fn numeric_errors_name_the_token() {
        let err = Command::parse("line 1 2 abc 4 FFFFFF").unwrap_err();
        assert_eq!(err.to_string(), "Invalid x2 value: abc");
        let err = Command::parse("grid 1.5 2 FFFFFF").unwrap_err();
        assert_eq!(err.to_string(), "Invalid horizontal size value: 1.5");
    }

    #[test]
    fn unknown_command_echoes_input() {
        let err = Command::parse("nonsense 1 2\n").unwrap_err();
        assert_eq!(err.to_string(), "Unknown command: nonsense 1 2");
    }

    #[test]
    fn bad_color_is_reported_and_nothing_drawn() {
        let interp = interpreter();
        let err = interp.execute("box 0 0 4 4 XYZXYZ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to draw box at 0, 0: invalid color string"));
        assert!(interp
            .canvas()
            .composite()
            .as_bytes()
            .iter()
            .all(|b| *b == 0));
    }

    #[test]
    fn missing_image_file_is_reported() {
        let err = interpreter()
            .execute("image /definitely/not/here.png")
            .unwrap_err();
        assert_eq!(err.to_string(), "File /definitely/not/here.png does not exist");
    }

    #[test]
    fn zero_grid_spacing_is_an_error() {
        let err = interpreter().execute("grid 0 10 FFFFFF").unwrap_err();
        assert!(err.to_string().starts_with("Failed to draw grid: "));
    }

    #[test]
    fn shutdown_is_reported_to_caller() {
        assert_eq!(interpreter().execute("shutdown"), Ok(Outcome::Shutdown));
    }
}
