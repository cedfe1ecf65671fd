//! Functions exposed to scripts and the capabilities behind them.

use crate::canvas::{CanvasError, GlyphRasterizer, SharedCanvas};
use crate::color::{parse_color, Color};
use crate::presenter::{PresenterLink, WindowCommand};
use crate::scripting::format::format_log;
use crate::scripting::BridgeInner;
use anyhow::{anyhow, Result};
use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, NativeCallContext};
use std::sync::{Arc, Weak};

/// Drawing and window operations scripts may perform.
///
/// The bridge only ever talks to this trait, so a headless double can stand
/// in for the real canvas and window.
pub trait FrameCapability: Send + Sync {
    fn screen_size(&self) -> (u32, u32);
    fn debug_print(&self, text: &str);
    fn draw_line(&self, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: Color);
    fn draw_text(&self, x: i32, y: i32, size: f32, text: &str, color: Color) -> Result<()>;
    fn draw_box(&self, x: i32, y: i32, w: i32, h: i32, color: Color);
    fn draw_pixel(&self, x: i32, y: i32, color: Color);
    fn draw_circle(&self, x: i32, y: i32, r: i32, thickness: i32, filled: bool, color: Color);
    fn draw_grid(&self, horizontal: i32, vertical: i32, color: Color) -> Result<(), CanvasError>;
    fn clear_layer(&self, index: usize);
    fn create_layer(&self) -> usize;
    fn select_layer(&self, index: usize);
    fn delete_layer(&self, index: usize);
    fn layer_count(&self) -> usize;
    fn current_layer(&self) -> usize;
    fn set_layer_visible(&self, index: usize, visible: bool);
    fn set_window_title(&self, title: &str);
    fn set_window_position(&self, x: i32, y: i32);
}

pub trait AppControl: Send + Sync {
    fn shutdown(&self, code: i32);
}

const DEBUG_TEXT_SIZE: f32 = 16.0;

/// [`FrameCapability`] backed by the shared canvas and the presenter window.
pub struct CanvasFrame {
    canvas: SharedCanvas,
    window: PresenterLink,
    font: Option<Arc<dyn GlyphRasterizer>>,
}

impl CanvasFrame {
    pub fn new(
        canvas: SharedCanvas,
        window: PresenterLink,
        font: Option<Arc<dyn GlyphRasterizer>>,
    ) -> Self {
        Self {
            canvas,
            window,
            font,
        }
    }

    fn font(&self) -> Result<&dyn GlyphRasterizer> {
        self.font
            .as_deref()
            .ok_or_else(|| anyhow!("no font configured"))
    }
}

impl FrameCapability for CanvasFrame {
    fn screen_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    /// White text in the top-left corner over a cleared strip.
    fn debug_print(&self, text: &str) {
        let bitmap = match self.font().and_then(|font| font.rasterize(text, DEBUG_TEXT_SIZE)) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                tracing::info!(target: "neoframe::script", "{text}");
                tracing::debug!("debug print not drawn: {err:#}");
                return;
            }
        };
        self.canvas.with(|canvas| {
            let width = canvas.width() as i32;
            canvas.draw_box(0, 0, width, bitmap.height as i32, Color::TRANSPARENT);
            canvas.draw_text_bitmap(&bitmap, 0, 0, Color::WHITE);
        });
    }

    fn draw_line(&self, x1: i32, y1: i32, x2: i32, y2: i32, thickness: i32, color: Color) {
        self.canvas
            .with(|c| c.draw_line(x1, y1, x2, y2, thickness, color));
    }

    fn draw_text(&self, x: i32, y: i32, size: f32, text: &str, color: Color) -> Result<()> {
        let font = self.font()?;
        // rasterize outside the canvas lock
        let bitmap = font.rasterize(text, size)?;
        self.canvas
            .with(|c| c.draw_text_bitmap(&bitmap, x, y, color));
        Ok(())
    }

    fn draw_box(&self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.canvas.with(|c| c.draw_box(x, y, w, h, color));
    }

    fn draw_pixel(&self, x: i32, y: i32, color: Color) {
        self.canvas.with(|c| c.set_pixel(x, y, color));
    }

    fn draw_circle(&self, x: i32, y: i32, r: i32, thickness: i32, filled: bool, color: Color) {
        self.canvas
            .with(|c| c.draw_circle(x, y, r, thickness, filled, color));
    }

    fn draw_grid(&self, horizontal: i32, vertical: i32, color: Color) -> Result<(), CanvasError> {
        self.canvas
            .with(|c| c.draw_grid(horizontal, vertical, color))
    }

    fn clear_layer(&self, index: usize) {
        self.canvas.with(|c| c.clear_layer(index));
    }

    fn create_layer(&self) -> usize {
        self.canvas.with(|c| c.create_layer())
    }

    fn select_layer(&self, index: usize) {
        self.canvas.with(|c| c.select_layer(index));
    }

    fn delete_layer(&self, index: usize) {
        self.canvas.with(|c| c.delete_layer(index));
    }

    fn layer_count(&self) -> usize {
        self.canvas.with(|c| c.layer_count())
    }

    fn current_layer(&self) -> usize {
        self.canvas.with(|c| c.current_layer())
    }

    fn set_layer_visible(&self, index: usize, visible: bool) {
        self.canvas.with(|c| c.set_layer_visible(index, visible));
    }

    fn set_window_title(&self, title: &str) {
        self.window.send(WindowCommand::SetTitle(title.to_string()));
    }

    fn set_window_position(&self, x: i32, y: i32) {
        self.window.send(WindowCommand::SetPosition { x, y });
    }
}

/// Unit on success, the error text otherwise. Scripts test the result with
/// `if result != () { ... }`.
fn outcome<E: std::fmt::Display>(result: Result<(), E>) -> Dynamic {
    match result {
        Ok(()) => Dynamic::UNIT,
        Err(err) => Dynamic::from(err.to_string()),
    }
}

fn color_arg(value: &str) -> Result<Color, String> {
    parse_color(value).map_err(|e| e.to_string())
}

/// Negative layer indices never match a layer.
fn layer_index(index: i64) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn log_line(message: &str) {
    tracing::info!(target: "neoframe::script", "{message}");
}

pub(crate) fn register_host_api(
    engine: &mut Engine,
    bridge: Weak<BridgeInner>,
    frame: Arc<dyn FrameCapability>,
    app: Arc<dyn AppControl>,
) {
    engine.on_print(|text| log_line(text));
    engine.on_debug(|text, _source, pos| {
        tracing::debug!(target: "neoframe::script", "{pos:?} {text}");
    });

    register_trigger_api(engine, bridge);
    register_system_api(engine, frame.clone(), app);
    register_draw_api(engine, frame.clone());
    register_layer_api(engine, frame);
}

fn register_trigger_api(engine: &mut Engine, bridge: Weak<BridgeInner>) {
    let b = bridge.clone();
    engine.register_fn("clearTriggers", move || {
        if let Some(inner) = b.upgrade() {
            inner.triggers.clear();
        }
    });

    let b = bridge.clone();
    engine.register_fn("rmTrigger", move |name: &str| -> bool {
        b.upgrade().is_some_and(|inner| inner.triggers.remove(name))
    });

    let b = bridge.clone();
    engine.register_fn(
        "trigger",
        move |name: &str, callback: FnPtr| -> Result<String, Box<EvalAltResult>> {
            if name.is_empty() {
                return Err("trigger name must not be empty".into());
            }
            if let Some(inner) = b.upgrade() {
                inner.triggers.register(name, callback);
            }
            Ok(name.to_string())
        },
    );

    let b = bridge.clone();
    engine.register_fn(
        "timer",
        move |name: &str, interval_ms: i64, callback: FnPtr| -> Result<String, Box<EvalAltResult>> {
            let name = if name.is_empty() { "timer" } else { name };
            let Some(inner) = b.upgrade() else {
                return Ok(name.to_string());
            };
            let generation = inner.triggers.register(name, callback);
            crate::scripting::spawn_timer(b.clone(), name, interval_ms, generation)
                .map_err(|e| format!("failed to start timer {name}: {e}"))?;
            Ok(name.to_string())
        },
    );

    let b = bridge;
    engine.register_fn(
        "runTrigger",
        move |ctx: NativeCallContext, name: &str| -> Result<bool, Box<EvalAltResult>> {
            let Some(trigger) = b.upgrade().and_then(|inner| inner.triggers.lookup(name)) else {
                return Ok(false);
            };
            trigger.callback.call_within_context::<Dynamic>(&ctx, ())?;
            Ok(true)
        },
    );
}

fn register_system_api(engine: &mut Engine, frame: Arc<dyn FrameCapability>, app: Arc<dyn AppControl>) {
    let f = frame.clone();
    engine.register_fn("getScreenSize", move || -> Array {
        let (w, h) = f.screen_size();
        vec![Dynamic::from(w as i64), Dynamic::from(h as i64)]
    });
    let f = frame.clone();
    engine.register_fn("getScreenWidth", move || -> i64 { f.screen_size().0 as i64 });
    let f = frame.clone();
    engine.register_fn("getScreenHeight", move || -> i64 { f.screen_size().1 as i64 });

    engine.register_fn("readFile", |path: &str| -> Dynamic {
        match std::fs::read_to_string(path) {
            Ok(content) => Dynamic::from(content),
            Err(err) => {
                tracing::warn!(target: "neoframe::script", "error reading file {path}: {err}");
                Dynamic::UNIT
            }
        }
    });
    engine.register_fn("fileExists", |path: &str| -> bool {
        std::path::Path::new(path).is_file()
    });
    engine.register_fn("pwd", || -> String {
        match std::env::current_dir() {
            Ok(dir) => dir.display().to_string(),
            Err(err) => {
                tracing::warn!(target: "neoframe::script", "pwd failed: {err}");
                String::new()
            }
        }
    });

    engine.register_fn("logf", |format: &str| log_line(&format_log(format, &[])));
    engine.register_fn("logf", |format: &str, a: Dynamic| {
        log_line(&format_log(format, &[a]))
    });
    engine.register_fn("logf", |format: &str, a: Dynamic, b: Dynamic| {
        log_line(&format_log(format, &[a, b]))
    });
    engine.register_fn("logf", |format: &str, a: Dynamic, b: Dynamic, c: Dynamic| {
        log_line(&format_log(format, &[a, b, c]))
    });
    engine.register_fn(
        "logf",
        |format: &str, a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| {
            log_line(&format_log(format, &[a, b, c, d]))
        },
    );

    let f = frame.clone();
    engine.register_fn("setWindowTitle", move |title: &str| f.set_window_title(title));
    let f = frame.clone();
    engine.register_fn("setWindowPosition", move |x: i64, y: i64| {
        f.set_window_position(clamp_i32(x), clamp_i32(y))
    });
    let f = frame;
    engine.register_fn("debugPrint", move |text: &str| f.debug_print(text));

    let a = app.clone();
    engine.register_fn("shutdown", move |code: i64| a.shutdown(clamp_i32(code)));
    let a = app;
    engine.register_fn("shutdown", move || a.shutdown(0));
}

fn register_draw_api(engine: &mut Engine, frame: Arc<dyn FrameCapability>) {
    let f = frame.clone();
    engine.register_fn(
        "drawLine",
        move |x1: i64, y1: i64, x2: i64, y2: i64, color: &str| -> Dynamic {
            outcome(color_arg(color).map(|color| {
                f.draw_line(
                    clamp_i32(x1),
                    clamp_i32(y1),
                    clamp_i32(x2),
                    clamp_i32(y2),
                    1,
                    color,
                )
            }))
        },
    );
    let f = frame.clone();
    engine.register_fn(
        "drawLine",
        move |x1: i64, y1: i64, x2: i64, y2: i64, thickness: i64, color: &str| -> Dynamic {
            outcome(color_arg(color).map(|color| {
                f.draw_line(
                    clamp_i32(x1),
                    clamp_i32(y1),
                    clamp_i32(x2),
                    clamp_i32(y2),
                    clamp_i32(thickness),
                    color,
                )
            }))
        },
    );

    let f = frame.clone();
    let draw_text = move |x: i64, y: i64, size: f64, text: &str, color: &str| -> Dynamic {
        let result = color_arg(color).and_then(|color| {
            f.draw_text(clamp_i32(x), clamp_i32(y), size as f32, text, color)
                .map_err(|e| format!("{e:#}"))
        });
        if let Err(err) = &result {
            tracing::warn!(target: "neoframe::script", "drawText failed: {err}");
        }
        outcome(result)
    };
    let with_int_size = draw_text.clone();
    engine.register_fn("drawText", draw_text);
    engine.register_fn(
        "drawText",
        move |x: i64, y: i64, size: i64, text: &str, color: &str| -> Dynamic {
            with_int_size(x, y, size as f64, text, color)
        },
    );

    let f = frame.clone();
    engine.register_fn(
        "drawBox",
        move |x: i64, y: i64, w: i64, h: i64, color: &str| -> Dynamic {
            outcome(color_arg(color).map(|color| {
                f.draw_box(clamp_i32(x), clamp_i32(y), clamp_i32(w), clamp_i32(h), color)
            }))
        },
    );
    let f = frame.clone();
    engine.register_fn("drawPixel", move |x: i64, y: i64, color: &str| -> Dynamic {
        outcome(color_arg(color).map(|color| f.draw_pixel(clamp_i32(x), clamp_i32(y), color)))
    });
    let f = frame.clone();
    engine.register_fn(
        "drawCircle",
        move |x: i64, y: i64, r: i64, thickness: i64, filled: bool, color: &str| -> Dynamic {
            outcome(color_arg(color).map(|color| {
                f.draw_circle(
                    clamp_i32(x),
                    clamp_i32(y),
                    clamp_i32(r),
                    clamp_i32(thickness),
                    filled,
                    color,
                )
            }))
        },
    );
    let f = frame;
    engine.register_fn("drawGrid", move |h: i64, v: i64, color: &str| -> Dynamic {
        outcome(color_arg(color).and_then(|color| {
            f.draw_grid(clamp_i32(h), clamp_i32(v), color)
                .map_err(|e| e.to_string())
        }))
    });
}

fn register_layer_api(engine: &mut Engine, frame: Arc<dyn FrameCapability>) {
    let f = frame.clone();
    engine.register_fn("clearLayer", move |index: i64| f.clear_layer(layer_index(index)));
    let f = frame.clone();
    engine.register_fn("createLayer", move || -> i64 { f.create_layer() as i64 });
    let f = frame.clone();
    engine.register_fn("selectLayer", move |index: i64| f.select_layer(layer_index(index)));
    let f = frame.clone();
    engine.register_fn("deleteLayer", move |index: i64| f.delete_layer(layer_index(index)));
    let f = frame.clone();
    engine.register_fn("layerCount", move || -> i64 { f.layer_count() as i64 });
    let f = frame.clone();
    engine.register_fn("currentLayer", move || -> i64 { f.current_layer() as i64 });
    let f = frame;
    engine.register_fn("setLayerVisible", move |index: i64, visible: bool| {
        f.set_layer_visible(layer_index(index), visible)
    });
}
